use super::storage::{KeyValueStorage, EMAIL_KEY, ROLE_KEY, TOKEN_KEY, USERNAME_KEY};
use super::{Credentials, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// token, email and role were all present; the session is authenticated.
    Restored,
    /// Nothing was persisted.
    Empty,
    /// Some but not all of the authoritative keys were present.
    Incomplete { missing: Vec<&'static str> },
}

/// Rehydrates `store` from persisted storage. Run once, before any route is
/// guarded. Never fails: unreadable or partial data leaves the store empty.
pub fn bootstrap(storage: &dyn KeyValueStorage, store: &SessionStore) -> BootstrapOutcome {
    let read = |key: &str| match storage.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            tracing::warn!("Failed to read persisted '{}': {}", key, e);
            None
        }
    };

    let token = read(TOKEN_KEY);
    let email = read(EMAIL_KEY);
    let role = read(ROLE_KEY);

    match (token, email, role) {
        (Some(token), Some(email), Some(role)) => {
            let mut credentials = Credentials::new(email, token, role);
            credentials.username = read(USERNAME_KEY);
            store.set_credentials_with(credentials);
            tracing::info!("Restored persisted session");
            BootstrapOutcome::Restored
        }
        (None, None, None) => BootstrapOutcome::Empty,
        (token, email, role) => {
            let missing = [(TOKEN_KEY, token.is_none()), (EMAIL_KEY, email.is_none()), (ROLE_KEY, role.is_none())]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect::<Vec<_>>();
            tracing::debug!(?missing, "Persisted session incomplete, starting unauthenticated");
            BootstrapOutcome::Incomplete { missing }
        }
    }
}

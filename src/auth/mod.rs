use crate::api::AuthClient;
use crate::error::ClientError;
use crate::forms::{login_form, FormState};
use crate::models::LoginResponse;
use crate::session::storage::{forget_login, persist_login};
use crate::session::{Credentials, KeyValueStorage, Session, SessionStore};

/// Authenticates against the server, then sets the session and persists it.
///
/// The session is only touched on success; on any failure it stays as it was.
pub async fn login(
    client: &dyn AuthClient,
    storage: &dyn KeyValueStorage,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<LoginResponse, ClientError> {
    let mut form = FormState::new(login_form());
    let anyone = Session::default();
    form.set("email", email, &anyone)?;
    form.set("password", password, &anyone)?;
    form.validate()?;

    let response = client.login(email.trim(), password).await?;

    let role = response
        .user
        .role
        .as_ref()
        .map(|role| role.name.clone())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ClientError::LoginFailed("Login response did not include a role".to_string()))?;

    let mut credentials = Credentials::new(response.user.email.clone(), response.token.clone(), role);
    if !response.user.username.is_empty() {
        credentials.username = Some(response.user.username.clone());
    }
    store.set_credentials_with(credentials);

    if let Err(e) = persist_login(storage, &response) {
        tracing::warn!("Failed to persist session: {}", e);
    }

    tracing::info!("Logged in as {}", response.user.email);
    Ok(response)
}

/// Ends the session. The remote logout is best effort; local state is always
/// removed.
pub async fn logout(client: &dyn AuthClient, storage: &dyn KeyValueStorage, store: &SessionStore) {
    if store.read().is_authenticated() {
        if let Err(e) = client.logout().await {
            tracing::warn!("Logout failed: {}", e);
        }
    }

    if let Err(e) = forget_login(storage) {
        tracing::warn!("Failed to remove persisted session: {}", e);
    }
    store.clear();
    tracing::info!("Logged out");
}

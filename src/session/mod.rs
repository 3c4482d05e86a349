pub mod bootstrap;
pub mod storage;

use std::sync::{Arc, RwLock};

pub use bootstrap::{bootstrap, BootstrapOutcome};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// Role name that unlocks task creation, deletion and most task fields.
pub const PM_ROLE: &str = "pm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub username: Option<String>,
}

/// Immutable snapshot of the logged-in actor.
///
/// Built only through [`Session::authenticated`] or [`Session::default`], so a
/// token never exists without an email and a role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    identity: Option<Identity>,
    role: Option<String>,
}

impl Session {
    pub fn authenticated(credentials: Credentials) -> Self {
        Self {
            token: Some(credentials.token),
            identity: Some(Identity {
                email: credentials.email,
                username: credentials.username,
            }),
            role: Some(credentials.role),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.email.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().and_then(|identity| identity.username.as_deref())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    pub fn is_pm(&self) -> bool {
        self.has_role(PM_ROLE)
    }
}

/// Everything one authentication event sets at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub token: String,
    pub role: String,
    pub username: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, token: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
            role: role.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Shared, injectable holder of the current [`Session`].
///
/// Clones share the same underlying state. Writers replace the whole snapshot,
/// so readers observe either the old or the new session and never a mix.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_credentials(
        &self,
        email: impl Into<String>,
        token: impl Into<String>,
        role: impl Into<String>,
    ) {
        self.set_credentials_with(Credentials::new(email, token, role));
    }

    pub fn set_credentials_with(&self, credentials: Credentials) {
        self.replace(Session::authenticated(credentials));
    }

    pub fn clear(&self) {
        self.replace(Session::default());
    }

    pub fn read(&self) -> Arc<Session> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    fn replace(&self, session: Session) {
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(session);
    }
}

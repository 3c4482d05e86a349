use serde::Serialize;

use crate::session::{Session, SessionStore};

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum GuardDecision {
    Allow,
    Redirect { to: &'static str },
}

/// Allows navigation iff the session is authenticated. The redirect target is
/// always the login page; the attempted destination is not remembered.
pub fn guard(session: &Session, _destination: &str) -> GuardDecision {
    if session.is_authenticated() {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect { to: LOGIN_PATH }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Dashboard,
    Tasks,
    Users,
    Login,
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trimmed.trim_end_matches('/');
        match trimmed {
            "" | "/dashboard" => Route::Dashboard,
            "/task" => Route::Tasks,
            "/user" => Route::Users,
            "/login" => Route::Login,
            _ => Route::NotFound,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Tasks | Route::Users)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::Tasks => "/task",
            Route::Users => "/user",
            Route::Login => LOGIN_PATH,
            Route::NotFound => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Navigation {
    Render { route: Route },
    Redirect { to: &'static str },
}

/// Resolves `path` against the route table, guarding private routes with the
/// store's current session.
pub fn navigate(store: &SessionStore, path: &str) -> Navigation {
    let route = Route::from_path(path);
    if !route.is_private() {
        return Navigation::Render { route };
    }

    match guard(&store.read(), path) {
        GuardDecision::Allow => Navigation::Render { route },
        GuardDecision::Redirect { to } => {
            tracing::debug!("Redirecting {} to {}", path, to);
            Navigation::Redirect { to }
        }
    }
}

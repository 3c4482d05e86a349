use std::sync::Arc;

use crate::api::HttpClient;
use crate::cli::OutputFormat;
use crate::config::{self, AppConfig};
use crate::feedback::Feedback;
use crate::mutation::{FlowObserver, MutationKind};
use crate::routes::{navigate, Navigation, Route};
use crate::session::{bootstrap, FileStorage, KeyValueStorage, SessionStore};

/// Everything a command needs: the bootstrapped session, its storage and an
/// HTTP client bound to that session.
pub struct CliContext {
    pub config: AppConfig,
    pub store: SessionStore,
    pub storage: Box<dyn KeyValueStorage>,
    pub client: Arc<HttpClient>,
    pub output: OutputFormat,
}

impl CliContext {
    /// Process config and the session file in the config dir.
    pub fn init(output: OutputFormat) -> anyhow::Result<Self> {
        let storage = FileStorage::in_config_dir()?;
        tracing::debug!(path = %storage.path().display(), "Using session file");
        Self::init_with(config::config().clone(), Box::new(storage), output)
    }

    /// Bootstraps a fresh session from `storage` and binds a client to it.
    pub fn init_with(
        config: AppConfig,
        storage: Box<dyn KeyValueStorage>,
        output: OutputFormat,
    ) -> anyhow::Result<Self> {
        let store = SessionStore::new();
        let outcome = bootstrap(storage.as_ref(), &store);
        tracing::debug!(?outcome, "Session bootstrap");

        let client = Arc::new(HttpClient::new(&config.api, store.clone())?);

        Ok(Self {
            config,
            store,
            storage,
            client,
            output,
        })
    }

    /// Applies the route guard for the screen a command stands for.
    pub fn require(&self, route: Route) -> anyhow::Result<()> {
        match navigate(&self.store, route.path()) {
            Navigation::Render { .. } => Ok(()),
            Navigation::Redirect { to } => Err(anyhow::anyhow!(
                "Not authenticated: redirected to {}. Run 'taskdesk auth login <email>' first",
                to
            )),
        }
    }

    pub fn observer(&self) -> CliObserver {
        CliObserver { output: self.output }
    }
}

/// Prints success feedback in text mode. Errors are returned from the
/// command and reported once by the binary.
pub struct CliObserver {
    output: OutputFormat,
}

impl CliObserver {
    fn banner(&self, feedback: &Feedback) -> Option<String> {
        if self.output != OutputFormat::Text || feedback.is_error() {
            return None;
        }
        Some(format!("✓ {}", feedback.message()))
    }
}

impl FlowObserver for CliObserver {
    fn dismiss_modal(&self, kind: MutationKind) {
        tracing::debug!(%kind, "Form closed");
    }

    fn show_feedback(&self, feedback: &Feedback) {
        match self.banner(feedback) {
            Some(line) => println!("{}", line),
            None => tracing::debug!(?feedback, "Feedback not printed"),
        }
    }
}

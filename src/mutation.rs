use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::{ApiResource, ResourceClient};
use crate::config::FeedbackConfig;
use crate::error::ClientError;
use crate::feedback::Feedback;
use crate::list::RefreshTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::Create => f.write_str("create"),
            MutationKind::Update => f.write_str("update"),
            MutationKind::Delete => f.write_str("delete"),
        }
    }
}

/// A confirmed create/update/delete awaiting the server. Consumed by
/// [`MutationFlow::submit`]; failed mutations are not kept or retried.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    kind: MutationKind,
    target_id: Option<String>,
    payload: Option<Value>,
}

impl PendingMutation {
    pub fn create(payload: &impl Serialize) -> Result<Self, ClientError> {
        Ok(Self {
            kind: MutationKind::Create,
            target_id: None,
            payload: Some(serde_json::to_value(payload)?),
        })
    }

    pub fn update(id: impl Into<String>, payload: &impl Serialize) -> Result<Self, ClientError> {
        Ok(Self {
            kind: MutationKind::Update,
            target_id: Some(id.into()),
            payload: Some(serde_json::to_value(payload)?),
        })
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::Delete,
            target_id: Some(id.into()),
            payload: None,
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

/// UI side of a mutation: the form modal and the transient indicator.
pub trait FlowObserver: Send + Sync {
    fn dismiss_modal(&self, kind: MutationKind);

    fn show_feedback(&self, feedback: &Feedback);

    fn clear_feedback(&self) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub resource: ApiResource,
    pub target_id: Option<String>,
}

/// Runs one create/update/delete end to end for a single form.
///
/// On success: dismiss the modal, show success for its configured duration,
/// then refresh the list once. On failure every kind (delete included) shows
/// the error for its duration and returns it; the modal stays open. A submit
/// issued while another is in flight is rejected with [`ClientError::Busy`].
pub struct MutationFlow {
    client: Arc<dyn ResourceClient>,
    resource: ApiResource,
    feedback: FeedbackConfig,
    submitting: AtomicBool,
}

struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl MutationFlow {
    pub fn new(client: Arc<dyn ResourceClient>, resource: ApiResource, feedback: FeedbackConfig) -> Self {
        Self {
            client,
            resource,
            feedback,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub async fn submit(
        &self,
        mutation: PendingMutation,
        target: &dyn RefreshTarget,
        observer: &dyn FlowObserver,
    ) -> Result<MutationOutcome, ClientError> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            tracing::debug!(resource = %self.resource, "Ignoring re-entrant submit");
            return Err(ClientError::Busy);
        }
        let _guard = SubmitGuard(&self.submitting);

        let kind = mutation.kind;
        match self.send(&mutation).await {
            Ok(()) => {
                tracing::info!(resource = %self.resource, %kind, id = ?mutation.target_id, "Mutation succeeded");
                observer.dismiss_modal(kind);
                self.flash(observer, Feedback::Success).await;
                target.refresh().await;
                Ok(MutationOutcome {
                    kind,
                    resource: self.resource,
                    target_id: mutation.target_id,
                })
            }
            Err(e) => {
                tracing::warn!(resource = %self.resource, %kind, "Mutation failed: {}", e);
                self.flash(observer, Feedback::Error(e.to_string())).await;
                Err(e)
            }
        }
    }

    async fn send(&self, mutation: &PendingMutation) -> Result<(), ClientError> {
        let empty = Value::Null;
        let payload = mutation.payload.as_ref().unwrap_or(&empty);
        match mutation.kind {
            MutationKind::Create => self.client.create(self.resource, payload).await,
            MutationKind::Update => {
                let id = required_id(mutation)?;
                self.client.update(self.resource, id, payload).await
            }
            MutationKind::Delete => {
                let id = required_id(mutation)?;
                self.client.delete(self.resource, id).await
            }
        }
    }

    async fn flash(&self, observer: &dyn FlowObserver, feedback: Feedback) {
        observer.show_feedback(&feedback);
        tokio::time::sleep(feedback.duration(&self.feedback)).await;
        observer.clear_feedback();
    }
}

fn required_id(mutation: &PendingMutation) -> Result<&str, ClientError> {
    mutation
        .target_id
        .as_deref()
        .ok_or_else(|| ClientError::validation("id", "A target id is required"))
}

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::api::{ApiResource, ResourceClient};
use crate::error::ClientError;
use crate::models::ListResponse;
use crate::mutation::MutationKind;

/// A request observed by [`FakeClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List { resource: ApiResource, page: u32 },
    Search { resource: ApiResource, keyword: String, page: u32 },
    Create { resource: ApiResource, payload: Value },
    Update { resource: ApiResource, id: String, payload: Value },
    Delete { resource: ApiResource, id: String },
}

impl Call {
    pub fn is_fetch(&self) -> bool {
        matches!(self, Call::List { .. } | Call::Search { .. })
    }
}

struct ScriptedPage {
    result: Result<ListResponse<Value>, String>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Scripted in-memory [`ResourceClient`]. Unscripted fetches return one empty
/// page and unscripted mutations succeed.
#[derive(Default)]
pub struct FakeClient {
    calls: Mutex<Vec<Call>>,
    pages: Mutex<VecDeque<ScriptedPage>>,
    mutations: Mutex<VecDeque<Result<(), String>>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, data: Vec<Value>, total_pages: u32) {
        self.push(Ok(ListResponse { data, total_pages }), None);
    }

    pub fn push_fetch_error(&self, reason: &str) {
        self.push(Err(reason.to_string()), None);
    }

    /// Scripts a page that resolves only once the returned sender fires.
    pub fn push_gated_page(&self, data: Vec<Value>, total_pages: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Ok(ListResponse { data, total_pages }), Some(rx));
        tx
    }

    pub fn push_mutation_result(&self, result: Result<(), &str>) {
        self.mutations
            .lock()
            .unwrap()
            .push_back(result.map_err(str::to_string));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls().iter().filter(|call| call.is_fetch()).count()
    }

    fn push(&self, result: Result<ListResponse<Value>, String>, gate: Option<oneshot::Receiver<()>>) {
        self.pages.lock().unwrap().push_back(ScriptedPage { result, gate });
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn next_page(&self, resource: ApiResource) -> Result<ListResponse<Value>, ClientError> {
        let scripted = self.pages.lock().unwrap().pop_front();
        let Some(scripted) = scripted else {
            return Ok(ListResponse { data: vec![], total_pages: 1 });
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted
            .result
            .map_err(|reason| ClientError::fetch_failed(resource.name(), reason))
    }

    fn next_mutation(&self, kind: MutationKind, resource: ApiResource) -> Result<(), ClientError> {
        let scripted = self.mutations.lock().unwrap().pop_front().unwrap_or(Ok(()));
        scripted.map_err(|reason| ClientError::mutation_failed(kind, resource.name(), reason))
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
    async fn list(&self, resource: ApiResource, page: u32) -> Result<ListResponse<Value>, ClientError> {
        self.record(Call::List { resource, page });
        self.next_page(resource).await
    }

    async fn search(
        &self,
        resource: ApiResource,
        keyword: &str,
        page: u32,
    ) -> Result<ListResponse<Value>, ClientError> {
        self.record(Call::Search {
            resource,
            keyword: keyword.to_string(),
            page,
        });
        self.next_page(resource).await
    }

    async fn create(&self, resource: ApiResource, payload: &Value) -> Result<(), ClientError> {
        self.record(Call::Create {
            resource,
            payload: payload.clone(),
        });
        self.next_mutation(MutationKind::Create, resource)
    }

    async fn update(&self, resource: ApiResource, id: &str, payload: &Value) -> Result<(), ClientError> {
        self.record(Call::Update {
            resource,
            id: id.to_string(),
            payload: payload.clone(),
        });
        self.next_mutation(MutationKind::Update, resource)
    }

    async fn delete(&self, resource: ApiResource, id: &str) -> Result<(), ClientError> {
        self.record(Call::Delete {
            resource,
            id: id.to_string(),
        });
        self.next_mutation(MutationKind::Delete, resource)
    }
}

/// Minimal task row in wire format.
pub fn task_json(id: u32, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "status": status,
        "contributors": "[\"alice\"]",
        "startDate": "2024-05-01",
        "endDate": "2024-05-02"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_fetch_returns_empty_page() {
        let client = FakeClient::new();
        let page = client.list(ApiResource::Task, 1).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(client.calls(), vec![Call::List { resource: ApiResource::Task, page: 1 }]);
    }

    #[tokio::test]
    async fn scripted_mutation_failure_is_reported() {
        let client = FakeClient::new();
        client.push_mutation_result(Err("HTTP 500"));
        let err = client.delete(ApiResource::User, "3").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete user: HTTP 500");
        assert!(client.delete(ApiResource::User, "3").await.is_ok());
    }
}

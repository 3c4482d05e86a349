pub mod http;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::ClientError;
use crate::models::{ListResponse, LoginResponse};

pub use http::HttpClient;

/// Remote list resources managed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiResource {
    Task,
    User,
}

impl ApiResource {
    pub fn name(&self) -> &'static str {
        match self {
            ApiResource::Task => "task",
            ApiResource::User => "user",
        }
    }

    pub fn list_path(&self) -> String {
        format!("{}/", self.name())
    }

    pub fn search_path(&self) -> String {
        format!("{}/search", self.name())
    }

    pub fn create_path(&self) -> String {
        match self {
            ApiResource::Task => "task".to_string(),
            ApiResource::User => "user/create".to_string(),
        }
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.name(), id)
    }
}

impl fmt::Display for ApiResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Authenticated CRUD over list resources.
///
/// List and search results come back undecoded; callers pick the item type.
/// Mutations only report success or failure.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list(&self, resource: ApiResource, page: u32) -> Result<ListResponse<Value>, ClientError>;

    async fn search(
        &self,
        resource: ApiResource,
        keyword: &str,
        page: u32,
    ) -> Result<ListResponse<Value>, ClientError>;

    async fn create(&self, resource: ApiResource, payload: &Value) -> Result<(), ClientError>;

    async fn update(&self, resource: ApiResource, id: &str, payload: &Value) -> Result<(), ClientError>;

    async fn delete(&self, resource: ApiResource, id: &str) -> Result<(), ClientError>;
}

#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError>;

    async fn logout(&self) -> Result<(), ClientError>;
}

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{ApiResource, AuthClient, ResourceClient};
use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::models::{Collaborator, Envelope, ListResponse, LoginRequest, LoginResponse, Role};
use crate::mutation::MutationKind;
use crate::session::SessionStore;

const LOGIN_PATH: &str = "auth/v1/login";
const LOGOUT_PATH: &str = "auth/v1/logout";
const COLLABORATORS_PATH: &str = "user/username";
const ROLES_PATH: &str = "role";

/// reqwest-backed client for the dashboard REST API.
///
/// The bearer token is read from the session store on every call, so a login
/// or logout takes effect for requests issued afterwards.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
    log_requests: bool,
}

impl HttpClient {
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: normalize_base_url(&config.base_url)?,
            session,
            log_requests: config.enable_request_logging,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Contributor candidates for the task forms.
    pub async fn collaborators(&self) -> Result<Vec<Collaborator>, ClientError> {
        self.lookup(COLLABORATORS_PATH).await
    }

    pub async fn roles(&self) -> Result<Vec<Role>, ClientError> {
        self.lookup(ROLES_PATH).await
    }

    async fn lookup<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        let response = self
            .authorized(Method::GET, self.endpoint(path)?)?
            .send()
            .await
            .map_err(|e| ClientError::fetch_failed(path, e.to_string()))?;
        let response = ensure_success(response).map_err(|reason| ClientError::fetch_failed(path, reason))?;

        let envelope: Envelope<Vec<T>> = response.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
        match envelope.status {
            Some(status) if status != 200 => Err(ClientError::fetch_failed(path, format!("status {status}"))),
            _ => Ok(envelope.data),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        if self.log_requests {
            tracing::debug!("{} {}", method, url);
        }
        self.http.request(method, url)
    }

    fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder, ClientError> {
        let session = self.session.read();
        let token = session.token().ok_or(ClientError::Unauthenticated)?;
        Ok(self.request(method, url).bearer_auth(token))
    }

    async fn fetch_page(&self, resource: ApiResource, url: Url) -> Result<ListResponse<Value>, ClientError> {
        let response = self
            .authorized(Method::GET, url)?
            .send()
            .await
            .map_err(|e| ClientError::fetch_failed(resource.name(), e.to_string()))?;
        let response =
            ensure_success(response).map_err(|reason| ClientError::fetch_failed(resource.name(), reason))?;

        response.json().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn mutate(
        &self,
        kind: MutationKind,
        resource: ApiResource,
        method: Method,
        url: Url,
        payload: Option<&Value>,
    ) -> Result<(), ClientError> {
        let mut request = self.authorized(method, url)?;
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::mutation_failed(kind, resource.name(), e.to_string()))?;
        ensure_success(response).map_err(|reason| ClientError::mutation_failed(kind, resource.name(), reason))?;
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for HttpClient {
    async fn list(&self, resource: ApiResource, page: u32) -> Result<ListResponse<Value>, ClientError> {
        let mut url = self.endpoint(&resource.list_path())?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        self.fetch_page(resource, url).await
    }

    async fn search(
        &self,
        resource: ApiResource,
        keyword: &str,
        page: u32,
    ) -> Result<ListResponse<Value>, ClientError> {
        let mut url = self.endpoint(&resource.search_path())?;
        url.query_pairs_mut()
            .append_pair("keyword", keyword)
            .append_pair("page", &page.to_string());
        self.fetch_page(resource, url).await
    }

    async fn create(&self, resource: ApiResource, payload: &Value) -> Result<(), ClientError> {
        let url = self.endpoint(&resource.create_path())?;
        self.mutate(MutationKind::Create, resource, Method::POST, url, Some(payload))
            .await
    }

    async fn update(&self, resource: ApiResource, id: &str, payload: &Value) -> Result<(), ClientError> {
        let url = self.endpoint(&resource.item_path(id))?;
        self.mutate(MutationKind::Update, resource, Method::PUT, url, Some(payload))
            .await
    }

    async fn delete(&self, resource: ApiResource, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&resource.item_path(id))?;
        self.mutate(MutationKind::Delete, resource, Method::DELETE, url, None)
            .await
    }
}

#[async_trait]
impl AuthClient for HttpClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let url = self.endpoint(LOGIN_PATH)?;
        let response = self
            .request(Method::POST, url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Login error: {}", e);
                ClientError::LoginFailed("An error occurred during login".to_string())
            })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("Login failed");
            return Err(ClientError::LoginFailed(message.to_string()));
        }

        let data = body.get("data").cloned().unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| {
            tracing::error!("Unexpected login payload: {}", e);
            ClientError::LoginFailed("An error occurred during login".to_string())
        })
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let url = self.endpoint(LOGOUT_PATH)?;
        let response = self.authorized(Method::POST, url)?.send().await?;
        ensure_success(response).map_err(|reason| ClientError::fetch_failed("logout", reason))?;
        Ok(())
    }
}

/// Relative joins need a trailing slash on the base path.
fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn ensure_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(format!("HTTP {}", status.as_u16()))
    }
}

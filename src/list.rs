use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{ApiResource, ResourceClient};
use crate::error::ClientError;
use crate::models::ListResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListState {
    Idle,
    Fetching,
    Loaded,
    FetchFailed,
}

/// One fetched page. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page_number: 1,
            total_pages: 1,
        }
    }
}

/// Row number shown to the user: 1-based and continuous across pages.
pub fn global_index(local_index: usize, page_number: u32, page_size: usize) -> usize {
    local_index + 1 + (page_number.max(1) as usize - 1) * page_size
}

#[derive(Debug, Clone, Serialize)]
pub struct ListSnapshot<T> {
    pub page: ListPage<T>,
    pub state: ListState,
    pub keyword: Option<String>,
    pub requested_page: u32,
}

struct ListInner<T> {
    page: ListPage<T>,
    state: ListState,
    keyword: Option<String>,
    requested_page: u32,
    /// Page count from the latest response, used for clamping. Can run ahead
    /// of `page.total_pages` when a shrink was seen but its re-fetch failed.
    known_total_pages: u32,
}

/// Keeps one [`ListPage`] in sync with the selected page number and search
/// keyword.
///
/// Overlapping fetches are not cancelled. Each fetch is tagged with a sequence
/// number when issued and its result is applied only if no newer fetch has been
/// issued since, so a slow early response never overwrites a newer one.
pub struct PaginatedList<T> {
    client: Arc<dyn ResourceClient>,
    resource: ApiResource,
    page_size: usize,
    issued: AtomicU64,
    inner: Mutex<ListInner<T>>,
}

impl<T> PaginatedList<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    pub fn new(client: Arc<dyn ResourceClient>, resource: ApiResource, page_size: usize) -> Self {
        Self {
            client,
            resource,
            page_size,
            issued: AtomicU64::new(0),
            inner: Mutex::new(ListInner {
                page: ListPage::default(),
                state: ListState::Idle,
                keyword: None,
                requested_page: 1,
                known_total_pages: 1,
            }),
        }
    }

    pub fn resource(&self) -> ApiResource {
        self.resource
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> ListState {
        self.lock().state
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().page.items.clone()
    }

    /// The page the user selected; may be ahead of the loaded page while
    /// fetching or after a failure.
    pub fn page_number(&self) -> u32 {
        self.lock().requested_page
    }

    pub fn total_pages(&self) -> u32 {
        self.lock().page.total_pages
    }

    pub fn keyword(&self) -> Option<String> {
        self.lock().keyword.clone()
    }

    pub fn page(&self) -> ListPage<T> {
        self.lock().page.clone()
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        let inner = self.lock();
        ListSnapshot {
            page: inner.page.clone(),
            state: inner.state,
            keyword: inner.keyword.clone(),
            requested_page: inner.requested_page,
        }
    }

    /// Loaded items paired with their displayed row numbers.
    pub fn numbered_items(&self) -> Vec<(usize, T)> {
        let inner = self.lock();
        inner
            .page
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (global_index(i, inner.page.page_number, self.page_size), item.clone()))
            .collect()
    }

    /// Initial fetch on mount.
    pub async fn load(&self) -> ListState {
        self.fetch().await
    }

    /// Selects page `n`, clamped to `1..=total_pages`, and fetches it.
    pub async fn request_page(&self, page: u32) -> ListState {
        {
            let mut inner = self.lock();
            inner.requested_page = page.clamp(1, inner.known_total_pages.max(1));
        }
        self.fetch().await
    }

    pub async fn next_page(&self) -> ListState {
        let next = self.page_number().saturating_add(1);
        self.request_page(next).await
    }

    pub async fn previous_page(&self) -> ListState {
        let previous = self.page_number().saturating_sub(1);
        self.request_page(previous).await
    }

    /// Submits a keyword search. A blank keyword returns to the plain listing.
    /// The selected page is kept, as the dashboard does.
    pub async fn request_search(&self, keyword: &str) -> ListState {
        {
            let keyword = keyword.trim();
            let mut inner = self.lock();
            inner.keyword = (!keyword.is_empty()).then(|| keyword.to_string());
        }
        self.fetch().await
    }

    pub async fn clear_search(&self) -> ListState {
        self.request_search("").await
    }

    /// Re-fetches the current page after a mutation elsewhere.
    pub async fn notify_mutated(&self) -> ListState {
        self.fetch().await
    }

    async fn fetch(&self) -> ListState {
        loop {
            let (seq, page, keyword) = {
                let mut inner = self.lock();
                let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
                inner.state = ListState::Fetching;
                (seq, inner.requested_page, inner.keyword.clone())
            };

            tracing::debug!(resource = %self.resource, page, ?keyword, seq, "Fetching list page");
            let result = match keyword.as_deref() {
                Some(keyword) => self.client.search(self.resource, keyword, page).await,
                None => self.client.list(self.resource, page).await,
            }
            .and_then(decode_page::<T>);

            if let Some(state) = self.apply(seq, page, result) {
                return state;
            }
        }
    }

    /// Applies a finished fetch. `None` asks for a re-fetch of the adjusted page.
    fn apply(&self, seq: u64, page: u32, result: Result<ListResponse<T>, ClientError>) -> Option<ListState> {
        let mut inner = self.lock();
        if seq != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(resource = %self.resource, seq, "Discarding stale list response");
            return Some(inner.state);
        }

        match result {
            Ok(response) => {
                let total_pages = response.total_pages.max(1);
                inner.known_total_pages = total_pages;
                // The page vanished (e.g. its last row was deleted): land on the new last page.
                // The loaded page stays as it was until that fetch lands.
                if page > total_pages {
                    inner.requested_page = total_pages;
                    return None;
                }
                inner.page = ListPage {
                    items: response.data,
                    page_number: page,
                    total_pages,
                };
                inner.state = ListState::Loaded;
            }
            Err(e) => {
                tracing::warn!(resource = %self.resource, page, "Error fetching list: {}", e);
                inner.state = ListState::FetchFailed;
            }
        }
        Some(inner.state)
    }

    fn lock(&self) -> MutexGuard<'_, ListInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn decode_page<T: DeserializeOwned>(response: ListResponse<Value>) -> Result<ListResponse<T>, ClientError> {
    let data = response
        .data
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(ListResponse {
        data,
        total_pages: response.total_pages,
    })
}

/// Anything a completed mutation should refresh.
#[async_trait]
pub trait RefreshTarget: Send + Sync {
    async fn refresh(&self);
}

#[async_trait]
impl<T> RefreshTarget for PaginatedList<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    async fn refresh(&self) {
        self.notify_mutated().await;
    }
}

pub mod auth;
pub mod board;
pub mod lookup;
pub mod open;
pub mod task;
pub mod user;

use serde::de::DeserializeOwned;

use crate::api::ApiResource;
use crate::cli::CliContext;
use crate::list::PaginatedList;
use crate::mutation::{MutationFlow, PendingMutation};

/// Builds a list for `resource` and runs its initial fetch.
pub(crate) async fn mount_list<T>(ctx: &CliContext, resource: ApiResource) -> PaginatedList<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    let list = PaginatedList::new(ctx.client.clone(), resource, ctx.config.list.page_size);
    list.load().await;
    list
}

/// Selects `page` unless it is already the current one.
pub(crate) async fn goto_page<T>(list: &PaginatedList<T>, page: u32)
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    if page != list.page_number() {
        list.request_page(page).await;
    }
}

/// Runs one mutation through the refresh flow against `list`.
pub(crate) async fn submit<T>(
    ctx: &CliContext,
    list: &PaginatedList<T>,
    mutation: PendingMutation,
) -> anyhow::Result<()>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    let flow = MutationFlow::new(ctx.client.clone(), list.resource(), ctx.config.feedback.clone());
    flow.submit(mutation, list, &ctx.observer()).await?;
    Ok(())
}

use serde::Serialize;

use crate::api::{ApiResource, ResourceClient};
use crate::error::ClientError;
use crate::models::{Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// The dashboard's three status columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
}

impl Board {
    pub fn column(&self, status: TaskStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|column| column.status == status)
    }
}

/// Searches each status concurrently. The keyword search also matches titles,
/// so rows are filtered to the column's status. Any failed search fails the
/// whole board.
pub async fn load_board(client: &dyn ResourceClient) -> Result<Board, ClientError> {
    let (todo, on_progress, done) = futures::try_join!(
        column(client, TaskStatus::Todo),
        column(client, TaskStatus::OnProgress),
        column(client, TaskStatus::Done),
    )?;

    Ok(Board {
        columns: vec![todo, on_progress, done],
    })
}

async fn column(client: &dyn ResourceClient, status: TaskStatus) -> Result<BoardColumn, ClientError> {
    let response = client.search(ApiResource::Task, status.as_str(), 1).await?;
    let tasks = response
        .data
        .into_iter()
        .map(serde_json::from_value::<Task>)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|task| task.status == status)
        .collect();

    Ok(BoardColumn { status, tasks })
}

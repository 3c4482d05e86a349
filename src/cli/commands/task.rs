use clap::{Args, Subcommand};
use serde_json::json;

use crate::api::ApiResource;
use super::{goto_page, mount_list, submit};
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::forms::{task_create_form, task_draft, task_update_state, Access, FormState};
use crate::list::{ListState, PaginatedList};
use crate::models::Task;
use crate::mutation::PendingMutation;
use crate::routes::Route;
use crate::session::{Session, PM_ROLE};

const DELETE_ACCESS: Access = Access::RoleIs(PM_ROLE);

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "List tasks, optionally filtered by keyword")]
    List {
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Search keyword")]
        search: Option<String>,
    },

    #[command(about = "Create a task (PM only)")]
    Create {
        #[command(flatten)]
        fields: TaskFields,
    },

    #[command(about = "Update a task shown on the given page")]
    Update {
        #[arg(help = "Task ID")]
        id: String,
        #[arg(long, default_value_t = 1, help = "Page the task is listed on")]
        page: u32,
        #[command(flatten)]
        fields: TaskFields,
    },

    #[command(about = "Delete a task (PM only)")]
    Delete {
        #[arg(help = "Task ID")]
        id: String,
        #[arg(long, default_value_t = 1, help = "Page to show afterwards")]
        page: u32,
    },
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, help = "todo, on progress or done")]
    pub status: Option<String>,
    #[arg(long, help = "Comma-separated usernames")]
    pub contributors: Option<String>,
    #[arg(long, help = "Start date (yyyy-mm-dd or dd-mm-yyyy)")]
    pub start: Option<String>,
    #[arg(long, help = "End date (yyyy-mm-dd or dd-mm-yyyy)")]
    pub end: Option<String>,
}

impl TaskFields {
    fn apply(&self, form: &mut FormState, session: &Session) -> anyhow::Result<()> {
        let fields = [
            ("title", &self.title),
            ("description", &self.description),
            ("status", &self.status),
            ("contributors", &self.contributors),
            ("startDate", &self.start),
            ("endDate", &self.end),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                form.set(name, value.as_str(), session)?;
            }
        }
        Ok(())
    }
}

pub async fn handle(cmd: TaskCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require(Route::Tasks)?;
    let session = ctx.store.read();
    let list: PaginatedList<Task> = mount_list(ctx, ApiResource::Task).await;

    match cmd {
        TaskCommands::List { page, search } => {
            if let Some(keyword) = search {
                list.request_search(&keyword).await;
            }
            goto_page(&list, page).await;
            print_tasks(ctx, &list)
        }
        TaskCommands::Create { fields } => {
            let mut form = FormState::new(task_create_form());
            if !form.can_open(&session) {
                anyhow::bail!("Only a PM can create tasks");
            }
            if fields.status.is_none() {
                form.set("status", "todo", &session)?;
            }
            fields.apply(&mut form, &session)?;
            let draft = task_draft(&form)?;

            submit(ctx, &list, PendingMutation::create(&draft)?).await?;
            output_success(&ctx.output, &format!("Task '{}' created", draft.title), None)?;
            print_tasks(ctx, &list)
        }
        TaskCommands::Update { id, page, fields } => {
            goto_page(&list, page).await;
            let task = list
                .items()
                .into_iter()
                .find(|task| task.id == id)
                .ok_or_else(|| anyhow::anyhow!("Task '{}' not found on page {}", id, list.page_number()))?;

            let mut form = task_update_state(&task);
            fields.apply(&mut form, &session)?;
            let draft = task_draft(&form)?;

            submit(ctx, &list, PendingMutation::update(&id, &draft)?).await?;
            output_success(&ctx.output, &format!("Task '{}' updated", id), Some(json!({ "id": id })))?;
            print_tasks(ctx, &list)
        }
        TaskCommands::Delete { id, page } => {
            if !DELETE_ACCESS.allows(&session) {
                anyhow::bail!("Only a PM can delete tasks");
            }
            goto_page(&list, page).await;

            submit(ctx, &list, PendingMutation::delete(&id)).await?;
            output_success(&ctx.output, &format!("Task '{}' deleted", id), Some(json!({ "id": id })))?;
            print_tasks(ctx, &list)
        }
    }
}

fn print_tasks(ctx: &CliContext, list: &PaginatedList<Task>) -> anyhow::Result<()> {
    let snapshot = list.snapshot();
    if snapshot.state == ListState::FetchFailed {
        tracing::warn!("Showing last loaded tasks; the latest fetch failed");
    }

    let rows = list.numbered_items();
    match ctx.output {
        OutputFormat::Json => output_json(&json!({
            "tasks": rows.iter().map(|(no, task)| json!({ "no": no, "task": task })).collect::<Vec<_>>(),
            "page": snapshot.page.page_number,
            "total_pages": snapshot.page.total_pages,
            "keyword": snapshot.keyword,
            "state": snapshot.state,
        })),
        OutputFormat::Text => {
            if rows.is_empty() {
                output_empty_collection(&ctx.output, "tasks", "No tasks found")?;
            } else {
                let cells: Vec<Vec<String>> = rows
                    .iter()
                    .map(|(no, task)| {
                        vec![
                            no.to_string(),
                            task.id.clone(),
                            task.title.clone(),
                            task.status.to_string(),
                            task.date_range().unwrap_or_default(),
                            task.contributors.join(", "),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    render_table(&["NO", "ID", "TITLE", "STATUS", "DATES", "CONTRIBUTORS"], &cells)
                );
            }
            println!("{}", page_footer(snapshot.page.page_number, snapshot.page.total_pages));
            Ok(())
        }
    }
}

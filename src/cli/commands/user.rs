use clap::{Args, Subcommand};
use serde_json::json;

use super::{goto_page, mount_list, submit};
use crate::api::ApiResource;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::forms::{user_create_form, user_draft, user_update_state, FormState};
use crate::list::{ListState, PaginatedList};
use crate::models::User;
use crate::mutation::PendingMutation;
use crate::routes::Route;
use crate::session::Session;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users, optionally filtered by keyword")]
    List {
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: u32,
        #[arg(long, help = "Search keyword")]
        search: Option<String>,
    },

    #[command(about = "Create a user")]
    Create {
        #[command(flatten)]
        fields: UserFields,
    },

    #[command(about = "Update a user shown on the given page")]
    Update {
        #[arg(help = "User ID")]
        id: String,
        #[arg(long, default_value_t = 1, help = "Page the user is listed on")]
        page: u32,
        #[command(flatten)]
        fields: UserFields,
    },

    #[command(about = "Delete a user")]
    Delete {
        #[arg(help = "User ID")]
        id: String,
        #[arg(long, default_value_t = 1, help = "Page to show afterwards")]
        page: u32,
    },
}

#[derive(Args, Debug, Default)]
pub struct UserFields {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long, help = "Leave out on update to keep the current password")]
    pub password: Option<String>,
    #[arg(long, help = "Role ID (see 'taskdesk roles')")]
    pub role_id: Option<String>,
}

impl UserFields {
    fn apply(&self, form: &mut FormState, session: &Session) -> anyhow::Result<()> {
        let fields = [
            ("email", &self.email),
            ("username", &self.username),
            ("password", &self.password),
            ("roleId", &self.role_id),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                form.set(name, value.as_str(), session)?;
            }
        }
        Ok(())
    }
}

pub async fn handle(cmd: UserCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require(Route::Users)?;
    let session = ctx.store.read();
    let list: PaginatedList<User> = mount_list(ctx, ApiResource::User).await;

    match cmd {
        UserCommands::List { page, search } => {
            if let Some(keyword) = search {
                list.request_search(&keyword).await;
            }
            goto_page(&list, page).await;
            print_users(ctx, &list)
        }
        UserCommands::Create { fields } => {
            let mut form = FormState::new(user_create_form());
            fields.apply(&mut form, &session)?;
            let draft = user_draft(&form)?;

            submit(ctx, &list, PendingMutation::create(&draft)?).await?;
            output_success(&ctx.output, &format!("User '{}' created", draft.username), None)?;
            print_users(ctx, &list)
        }
        UserCommands::Update { id, page, fields } => {
            goto_page(&list, page).await;
            let user = list
                .items()
                .into_iter()
                .find(|user| user.id == id)
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found on page {}", id, list.page_number()))?;

            let mut form = user_update_state(&user);
            fields.apply(&mut form, &session)?;
            let draft = user_draft(&form)?;

            submit(ctx, &list, PendingMutation::update(&id, &draft)?).await?;
            output_success(&ctx.output, &format!("User '{}' updated", id), Some(json!({ "id": id })))?;
            print_users(ctx, &list)
        }
        UserCommands::Delete { id, page } => {
            goto_page(&list, page).await;

            submit(ctx, &list, PendingMutation::delete(&id)).await?;
            output_success(&ctx.output, &format!("User '{}' deleted", id), Some(json!({ "id": id })))?;
            print_users(ctx, &list)
        }
    }
}

fn print_users(ctx: &CliContext, list: &PaginatedList<User>) -> anyhow::Result<()> {
    let snapshot = list.snapshot();
    if snapshot.state == ListState::FetchFailed {
        tracing::warn!("Showing last loaded users; the latest fetch failed");
    }

    let rows = list.numbered_items();
    match ctx.output {
        OutputFormat::Json => output_json(&json!({
            "users": rows.iter().map(|(no, user)| json!({ "no": no, "user": user })).collect::<Vec<_>>(),
            "page": snapshot.page.page_number,
            "total_pages": snapshot.page.total_pages,
            "keyword": snapshot.keyword,
            "state": snapshot.state,
        })),
        OutputFormat::Text => {
            if rows.is_empty() {
                output_empty_collection(&ctx.output, "users", "No users found")?;
            } else {
                let cells: Vec<Vec<String>> = rows
                    .iter()
                    .map(|(no, user)| {
                        vec![
                            no.to_string(),
                            user.id.clone(),
                            user.username.clone(),
                            user.email.clone(),
                            user.role_id.map(|id| id.to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", render_table(&["NO", "ID", "USERNAME", "EMAIL", "ROLE"], &cells));
            }
            println!("{}", page_footer(snapshot.page.page_number, snapshot.page.total_pages));
            Ok(())
        }
    }
}

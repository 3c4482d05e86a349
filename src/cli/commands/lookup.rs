use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::routes::Route;

pub async fn roles(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require(Route::Users)?;
    let roles = ctx.client.roles().await?;

    if roles.is_empty() {
        return output_empty_collection(&ctx.output, "roles", "No roles found");
    }
    match ctx.output {
        OutputFormat::Json => output_json(&json!({ "roles": roles })),
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = roles.iter().map(|r| vec![r.id.to_string(), r.name.clone()]).collect();
            println!("{}", render_table(&["ID", "NAME"], &rows));
            Ok(())
        }
    }
}

/// Usernames offered as task contributors.
pub async fn collaborators(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require(Route::Tasks)?;
    let collaborators = ctx.client.collaborators().await?;

    if collaborators.is_empty() {
        return output_empty_collection(&ctx.output, "collaborators", "No collaborators found");
    }
    match ctx.output {
        OutputFormat::Json => output_json(&json!({ "collaborators": collaborators })),
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = collaborators
                .iter()
                .map(|c| vec![c.username.clone(), c.role_id.map(|id| id.to_string()).unwrap_or_default()])
                .collect();
            println!("{}", render_table(&["USERNAME", "ROLE"], &rows));
            Ok(())
        }
    }
}

use serde_json::json;

use crate::board::load_board;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::routes::Route;

pub async fn handle(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require(Route::Dashboard)?;
    let board = load_board(ctx.client.as_ref()).await?;

    match ctx.output {
        OutputFormat::Json => output_json(&json!({ "columns": board.columns })),
        OutputFormat::Text => {
            for column in &board.columns {
                println!("{} ({})", column.status.as_str().to_uppercase(), column.tasks.len());
                for task in &column.tasks {
                    match task.date_range() {
                        Some(range) => println!("  {}  {}  [{}]", task.id, task.title, range),
                        None => println!("  {}  {}", task.id, task.title),
                    }
                }
                println!();
            }
            Ok(())
        }
    }
}

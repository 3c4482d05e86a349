use serde_json::json;

use crate::cli::utils::output_json;
use crate::cli::{CliContext, OutputFormat};
use crate::routes::{navigate, Navigation, Route};

pub fn handle(path: &str, ctx: &CliContext) -> anyhow::Result<()> {
    let navigation = navigate(&ctx.store, path);

    match ctx.output {
        OutputFormat::Json => output_json(&json!({ "path": path, "navigation": navigation })),
        OutputFormat::Text => {
            match navigation {
                Navigation::Render { route: Route::NotFound } => println!("{}: no such page", path),
                Navigation::Render { route } => println!("{} -> {}", path, route.path()),
                Navigation::Redirect { to } => println!("{} -> redirect {}", path, to),
            }
            Ok(())
        }
    }
}

use clap::Parser;
use taskdesk::cli::utils::output_error;
use taskdesk::cli::{Cli, OutputFormat};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let default_filter = if taskdesk::is_development!() { "taskdesk=info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = OutputFormat::from_cli(&cli);

    if let Err(e) = taskdesk::cli::run(cli).await {
        output_error(&output, &e);
        std::process::exit(1);
    }

    Ok(())
}

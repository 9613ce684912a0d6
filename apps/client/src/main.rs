use anyhow::Result;
use civicflow_client::cli;
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    cli::init_logging(args.log_level.as_deref())?;

    if let Err(err) = cli::dispatch(args).await {
        error!("{:#}", err);
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}

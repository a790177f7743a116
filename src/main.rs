use gantt_sync::cli::{Args, ConfigDiscovery, ExecutionMode, RunConfig};
use gantt_sync::SyncSystem;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match args.mode() {
        ExecutionMode::Sync(config) => {
            let exit_code = run_sync(config).await?;
            std::process::exit(exit_code);
        }
        ExecutionMode::ShowConfig { config_override } => {
            if let Err(e) = ConfigDiscovery::show_discovery_info(config_override.as_deref()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn run_sync(run: RunConfig) -> anyhow::Result<i32> {
    info!("Starting ClickUp -> Confluence Gantt sync");

    let config = match ConfigDiscovery::discover_config(run.config_override.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Error: {}", e);
            return Ok(1);
        }
    };

    let system = SyncSystem::new(config)?;
    let summary = system.run(&run.run_options()).await;
    summary.print();

    Ok(summary.exit_code())
}

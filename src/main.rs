use anyhow::Context;
use clap::Parser;
use pollen_api::core::ConfigProvider;
use pollen_api::utils::logger;
use pollen_api::utils::validation::Validate;
use pollen_api::{CliConfig, PollenError, PollenService, TomlConfig};
use tokio_util::sync::CancellationToken;

fn exit_with(e: &PollenError) -> ! {
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let (config, log_format, verbose) = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(file_config) => {
                let format = file_config.logging.format;
                let verbose = cli.verbose || file_config.logging.verbose;
                (Box::new(file_config) as Box<dyn ConfigProvider>, format, verbose)
            }
            Err(e) => {
                eprintln!("Failed to load config file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => (
            Box::new(cli.clone()) as Box<dyn ConfigProvider>,
            cli.log_format,
            cli.verbose,
        ),
    };

    logger::init_logger(log_format, verbose);
    tracing::info!("Starting pollen-api");
    tracing::debug!(
        listen_addr = config.listen_addr(),
        source_url = config.source_url(),
        refresh_interval_secs = config.refresh_interval().as_secs(),
        policy = ?config.failure_policy(),
        "Configuration loaded"
    );

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let service = PollenService::from_config(config.as_ref()).context("Failed to build service")?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                shutdown.cancel();
            }
        }
    });

    if let Err(e) = service.run(shutdown).await {
        tracing::error!("Service stopped: {}", e);
        exit_with(&e);
    }

    Ok(())
}

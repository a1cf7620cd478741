//! DocOne server: documents shared through gated links, with viewing
//! analytics.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use docone_core::config::AppConfig;
use docone_core::config::logging::{LogFormat, LoggingConfig};
use docone_core::result::AppResult;
use docone_database::Storage;

#[tokio::main]
async fn main() -> ExitCode {
    let env = std::env::var("DOCONE_ENV").unwrap_or_else(|_| "development".into());

    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("docone: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);
    info!(%env, version = env!("CARGO_PKG_VERSION"), "Starting DocOne");

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "DocOne exited with an error");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = fmt().with_env_filter(filter).with_target(true);

    match logging.format {
        LogFormat::Json => builder.json().with_current_span(false).init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn serve(config: AppConfig) -> AppResult<()> {
    let storage = Storage::from_config(&config.database).await?;
    docone_api::run_server(config, storage).await
}

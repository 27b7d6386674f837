//! Subjects Admin Main Entry Point
//!
//! Runs one administrative command (schema setup, reset, import, inspection)
//! against the backend selected by `SUBJECTS_BACKEND`.

use anyhow::Result;
use dotenv::dotenv;
use std::env;
use subjects_admin::{AdminConfig, Command, Dependencies, execute};
use subjects_repository::OperationContext;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("subjects_admin=info,subjects_repository=info"));

    let json_output = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .init();
    }

    info!(
        service_name = "subjects-admin",
        service_version = env!("CARGO_PKG_VERSION"),
        json_output,
        "Tracing initialized"
    );
}

/// Cancellation signal flipped on Ctrl-C.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling the running command");
            let _ = tx.send(true);
        }
    });
    rx
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args)?;
    let config = AdminConfig::from_env()?;

    let deps = match Dependencies::new(config).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e.into());
        }
    };

    let ctx = OperationContext::new().with_cancellation(cancel_on_ctrl_c());
    match execute(&deps.service, &ctx, &command, deps.scope.as_ref()).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            info!(command = ?command, "Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(command = ?command, error = %e, "Command failed");
            Err(e.into())
        }
    }
}

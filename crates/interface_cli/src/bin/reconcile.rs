//! Billing Reconcile - CLI Binary
//!
//! Reconciles subscription invoices in the billing snapshot document.
//!
//! # Usage
//!
//! ```bash
//! # Reconcile as of now and save changes
//! billing-reconcile
//!
//! # Preview the state as of a past date without writing
//! billing-reconcile --as-of 2024-06-01 --dry-run
//!
//! # Use another document and timezone
//! BILLING_TIMEZONE=Europe/Berlin billing-reconcile --data-file /srv/console/billing.json
//! ```
//!
//! See [`interface_cli::config`] for the environment variables.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use interface_cli::{run, Args, CliConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = CliConfig::from_env().context("failed to read BILLING_* configuration")?;

    init_tracing(&config.log_level, config.log_format);

    match run(&args, &config).await {
        Ok(summary) => {
            println!("{summary}");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Reconciliation failed");
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// Initializes the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

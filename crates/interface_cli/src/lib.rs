//! Billing Reconcile CLI
//!
//! Loads the billing snapshot document, reconciles subscription invoices as
//! of a chosen instant and writes the document back when it changed.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_cli::{run, Args, CliConfig};
//!
//! let args = Args::parse();
//! let summary = run(&args, &CliConfig::from_env()?).await?;
//! println!("{summary}");
//! ```

pub mod config;
pub mod error;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use tracing::{info, instrument};

use billing_store::BillingStore;
use core_kernel::{FixedClock, ProjectId};
use infra_store::JsonFileStore;

pub use crate::config::{CliConfig, LogFormat};
pub use crate::error::CliError;

/// Command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "billing-reconcile")]
#[command(about = "Reconcile subscription invoices in a billing snapshot")]
#[command(version)]
pub struct Args {
    /// Reconcile as of the end of this day (YYYY-MM-DD) instead of now
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Report what would change without writing the snapshot
    #[arg(long)]
    pub dry_run: bool,

    /// Snapshot document, overriding BILLING_DATA_FILE
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub data_file: PathBuf,
    /// Instant reconciled at
    pub now: DateTime<Utc>,
    /// True when the invoice collection changed
    pub changed: bool,
    /// True when the document was rewritten
    pub saved: bool,
    pub invoices: usize,
    pub subscription_invoices: usize,
    pub unresolved_plans: Vec<ProjectId>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match (self.changed, self.saved) {
            (false, _) => "up to date",
            (true, true) => "updated",
            (true, false) => "would change (dry run)",
        };
        write!(
            f,
            "{}: {} as of {} ({} invoices, {} from subscriptions)",
            self.data_file.display(),
            state,
            self.now.to_rfc3339(),
            self.invoices,
            self.subscription_invoices
        )?;
        if !self.unresolved_plans.is_empty() {
            let ids: Vec<&str> = self.unresolved_plans.iter().map(ProjectId::as_str).collect();
            write!(f, "; unresolved plans on {}", ids.join(", "))?;
        }
        Ok(())
    }
}

/// Runs one reconciliation over the configured snapshot document
#[instrument(skip_all, fields(dry_run = args.dry_run))]
pub async fn run(args: &Args, config: &CliConfig) -> Result<RunSummary, CliError> {
    let timezone = config.timezone()?;
    let now = match args.as_of {
        Some(date) => timezone.end_of_day(date),
        None => Utc::now(),
    };
    let data_file = args
        .data_file
        .clone()
        .unwrap_or_else(|| config.data_file.clone());
    let port = Arc::new(JsonFileStore::new(&data_file));

    let builder = BillingStore::builder()
        .timezone(timezone)
        .clock(Arc::new(FixedClock::new(now)));
    let store = if args.dry_run {
        // Load through the adapter, then reconcile without a port attached.
        let saved = port.read().await?;
        builder.snapshot(saved.unwrap_or_default()).build()
    } else {
        builder.port(port).load().await?
    };

    let report = store.reconcile_at(now).await?;
    let snapshot = store.snapshot();

    let summary = RunSummary {
        data_file,
        now,
        changed: report.changed,
        saved: report.changed && !args.dry_run,
        invoices: snapshot.invoices.len(),
        subscription_invoices: report.subscription_invoices,
        unresolved_plans: report.unresolved_plans,
    };
    info!(
        changed = summary.changed,
        saved = summary.saved,
        subscription_invoices = summary.subscription_invoices,
        "Reconciliation finished"
    );
    Ok(summary)
}

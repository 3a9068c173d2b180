//! Tests for the reconcile command
//!
//! Each run works on its own document under the system temp dir.

use std::path::PathBuf;

use clap::Parser;

use billing_store::BillingSnapshot;
use domain_billing::InvoiceStatus;
use interface_cli::{run, Args, CliConfig, CliError};
use test_utils::{date, ClientFixtures, PlanFixtures, ProjectFixtures};

struct Document {
    path: PathBuf,
}

impl Document {
    fn with(snapshot: &BillingSnapshot) -> Self {
        let path = std::env::temp_dir().join(format!("billing-cli-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, serde_json::to_vec(snapshot).unwrap()).unwrap();
        Self { path }
    }

    fn read(&self) -> BillingSnapshot {
        serde_json::from_slice(&std::fs::read(&self.path).unwrap()).unwrap()
    }

    fn args(&self, extra: &[&str]) -> Args {
        let mut argv = vec!["billing-reconcile", "--data-file", self.path.to_str().unwrap()];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn seeded() -> BillingSnapshot {
    BillingSnapshot {
        clients: vec![ClientFixtures::acme()],
        projects: vec![ProjectFixtures::subscribed(), ProjectFixtures::dangling_plan()],
        payment_plans: vec![PlanFixtures::pro()],
        invoices: Vec::new(),
    }
}

mod args {
    use super::*;

    #[test]
    fn test_parses_flags() {
        let args =
            Args::try_parse_from(["billing-reconcile", "--as-of", "2024-06-01", "--dry-run"]).unwrap();
        assert_eq!(args.as_of, Some(date(2024, 6, 1)));
        assert!(args.dry_run);
        assert!(args.data_file.is_none());
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Args::try_parse_from(["billing-reconcile", "--as-of", "06/01/2024"]).is_err());
    }
}

mod runs {
    use super::*;

    #[tokio::test]
    async fn test_run_writes_generated_invoices() {
        let doc = Document::with(&seeded());

        let summary = run(&doc.args(&["--as-of", "2024-06-01"]), &CliConfig::default())
            .await
            .unwrap();

        assert!(summary.changed);
        assert!(summary.saved);
        assert_eq!(summary.subscription_invoices, 3);
        assert_eq!(summary.unresolved_plans.len(), 1);
        assert_eq!(summary.unresolved_plans[0].as_str(), "p3");
        assert_eq!(doc.read().invoices.len(), 3);
        assert!(summary.to_string().contains("unresolved plans on p3"));
    }

    #[tokio::test]
    async fn test_second_run_is_up_to_date() {
        let doc = Document::with(&seeded());
        let args = doc.args(&["--as-of", "2024-06-01"]);
        run(&args, &CliConfig::default()).await.unwrap();

        let summary = run(&args, &CliConfig::default()).await.unwrap();

        assert!(!summary.changed);
        assert!(!summary.saved);
        assert!(summary.to_string().contains("up to date"));
    }

    #[tokio::test]
    async fn test_dry_run_leaves_document_alone() {
        let doc = Document::with(&seeded());

        let summary = run(&doc.args(&["--as-of", "2024-06-01", "--dry-run"]), &CliConfig::default())
            .await
            .unwrap();

        assert!(summary.changed);
        assert!(!summary.saved);
        assert_eq!(doc.read(), seeded());
    }

    #[tokio::test]
    async fn test_as_of_covers_the_whole_day() {
        let doc = Document::with(&seeded());

        // Third period is due 2024-01-25; by the end of that day it has begun.
        run(&doc.args(&["--as-of", "2024-01-25"]), &CliConfig::default())
            .await
            .unwrap();

        let snapshot = doc.read();
        assert!(snapshot
            .subscription_invoices()
            .all(|i| i.status == InvoiceStatus::Overdue));
    }

    #[tokio::test]
    async fn test_before_due_date_is_pending() {
        let doc = Document::with(&seeded());

        run(&doc.args(&["--as-of", "2024-01-24"]), &CliConfig::default())
            .await
            .unwrap();

        let snapshot = doc.read();
        let latest = snapshot
            .subscription_invoices()
            .max_by_key(|i| i.issue_date)
            .unwrap();
        assert_eq!(latest.status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_invalid_timezone_fails_before_touching_the_document() {
        let doc = Document::with(&seeded());
        let config = CliConfig {
            timezone: "Nowhere/Special".into(),
            ..Default::default()
        };

        let err = run(&doc.args(&[]), &config).await.unwrap_err();

        assert!(matches!(err, CliError::Core(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(doc.read(), seeded());
    }

    #[tokio::test]
    async fn test_malformed_document_is_reported() {
        let doc = Document::with(&seeded());
        std::fs::write(&doc.path, "not json").unwrap();

        let err = run(&doc.args(&["--dry-run"]), &CliConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Store(_)));
        assert_eq!(err.exit_code(), 1);
    }
}

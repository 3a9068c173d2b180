//! Tests for the snapshot adapters
//!
//! File tests work in unique directories under the system temp dir and
//! remove them afterwards.

use std::path::PathBuf;
use std::sync::Arc;

use rust_decimal_macros::dec;
use uuid::Uuid;

use billing_store::{BillingSnapshot, BillingStore, SnapshotPort};
use core_kernel::{Currency, FixedClock, PlanId, PortError, ProjectId};
use domain_billing::{InvoiceKind, InvoiceStatus};
use infra_store::{JsonFileStore, MemoryStore};
use test_utils::{date, ClientFixtures, DateFixtures, PlanFixtures, ProjectFixtures};

/// Unique scratch directory removed on drop
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("billing-store-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn seeded() -> BillingSnapshot {
    BillingSnapshot {
        clients: vec![ClientFixtures::acme()],
        projects: vec![ProjectFixtures::subscribed(), ProjectFixtures::unbilled()],
        payment_plans: vec![PlanFixtures::pro()],
        invoices: Vec::new(),
    }
}

// ============================================================================
// JSON file adapter
// ============================================================================

mod json_file {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let scratch = Scratch::new();
        let store = JsonFileStore::new(scratch.file("absent.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_file_loads_nothing() {
        let scratch = Scratch::new();
        let path = scratch.file("blank.json");
        std::fs::write(&path, "\n  \n").unwrap();

        assert!(JsonFileStore::new(path).load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_transformation_error() {
        let scratch = Scratch::new();
        let path = scratch.file("broken.json");
        std::fs::write(&path, "{\"clients\": [").unwrap();

        let err = JsonFileStore::new(path).load().await.unwrap_err();

        assert!(matches!(err, PortError::Transformation { .. }));
    }

    #[tokio::test]
    async fn test_saved_snapshot_loads_back() {
        let scratch = Scratch::new();
        let store = JsonFileStore::new(scratch.file("billing.json"));
        let snapshot = seeded();

        store.save(&snapshot).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(snapshot));
        assert!(!scratch.file("billing.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let scratch = Scratch::new();
        let path = scratch.file("nested/deeper/billing.json");

        JsonFileStore::new(&path).save(&seeded()).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_saved_document_uses_console_field_names() {
        let scratch = Scratch::new();
        let path = scratch.file("billing.json");
        JsonFileStore::new(&path).save(&seeded()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert!(raw.get("paymentPlans").is_some());
        assert_eq!(raw["projects"][0]["clientId"], "c1");
        assert_eq!(raw["projects"][0]["startDate"], "2022-01-10");
        assert_eq!(raw["paymentPlans"][0]["price"], 1200);
        assert!(raw["projects"][1].get("planId").is_none());
    }

    #[tokio::test]
    async fn test_loads_console_export() {
        let scratch = Scratch::new();
        let path = scratch.file("export.json");
        std::fs::write(
            &path,
            r#"{
                "clients": [{"id": "c1", "name": "Acme"}],
                "projects": [
                    {"id": "p1", "clientId": "c1", "planId": "pl1", "startDate": "2022-01-10T00:00:00.000Z"},
                    {"id": "p2", "clientId": "c1", "planId": "", "startDate": ""}
                ],
                "paymentPlans": [{"id": "pl1", "name": "Pro", "price": "1200", "currency": "eur"}],
                "invoices": [{
                    "id": "inv-p1-2022-01-10",
                    "invoiceNumber": "SUB-P1-202201",
                    "clientId": "c1",
                    "projectId": "p1",
                    "issueDate": "2022-01-10",
                    "dueDate": "2022-01-25",
                    "items": [{"description": "Pro Plan (Annual)", "quantity": 1, "price": 1200}],
                    "status": "Paid",
                    "type": "subscription",
                    "currency": "EUR"
                }]
            }"#,
        )
        .unwrap();

        let snapshot = JsonFileStore::new(path).load().await.unwrap().unwrap();

        let project = snapshot.project(&ProjectId::new("p1")).unwrap();
        assert_eq!(project.start_date, Some(date(2022, 1, 10)));
        assert_eq!(snapshot.plan(&PlanId::new("pl1")).unwrap().price, dec!(1200));
        assert_eq!(snapshot.payment_plans[0].currency.code(), "eur");
        assert_eq!(snapshot.invoices[0].currency, Currency::EUR);
        assert_eq!(snapshot.invoices[0].kind, InvoiceKind::Subscription);
        assert_eq!(snapshot.invoices[0].status, InvoiceStatus::Paid);
    }
}

// ============================================================================
// Memory adapter
// ============================================================================

mod memory {
    use super::*;

    #[tokio::test]
    async fn test_empty_until_saved() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&seeded()).await.unwrap();

        assert_eq!(store.current().await, Some(seeded()));
        assert_eq!(store.save_count(), 1);
    }
}

// ============================================================================
// Store over adapters
// ============================================================================

mod with_store {
    use super::*;

    #[tokio::test]
    async fn test_store_round_trips_through_file() {
        let scratch = Scratch::new();
        let path = scratch.file("billing.json");
        let clock = Arc::new(FixedClock::new(DateFixtures::reconcile_instant()));

        let store = BillingStore::builder()
            .port(Arc::new(JsonFileStore::new(&path)))
            .snapshot(seeded())
            .clock(clock.clone())
            .load()
            .await
            .unwrap();
        let report = store.reconcile().await.unwrap();
        assert!(report.changed);
        assert_eq!(report.subscription_invoices, 3);

        let reopened = BillingStore::builder()
            .port(Arc::new(JsonFileStore::new(&path)))
            .clock(clock)
            .load()
            .await
            .unwrap();

        assert_eq!(reopened.snapshot(), store.snapshot());
        assert!(!reopened.reconcile().await.unwrap().changed);
    }

    #[tokio::test]
    async fn test_unchanged_reconcile_does_not_save() {
        let port = Arc::new(MemoryStore::with_snapshot(seeded()));
        let store = BillingStore::builder()
            .port(port.clone())
            .clock(Arc::new(FixedClock::new(DateFixtures::reconcile_instant())))
            .load()
            .await
            .unwrap();

        store.reconcile().await.unwrap();
        store.reconcile().await.unwrap();

        assert_eq!(port.save_count(), 1);
    }
}

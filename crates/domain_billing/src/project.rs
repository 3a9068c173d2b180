//! Projects - the subjects of subscription billing
//!
//! A project becomes billable once it is bound to a payment plan and has a
//! start date. Either field may be absent while a project is being set up.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, PlanId, ProjectId};

/// A client project, optionally bound to a recurring payment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,
    /// Owning client
    pub client_id: ClientId,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Payment plan reference; absent for non-billable projects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<PlanId>,
    /// Date the subscription began; absent for non-billable projects
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "core_kernel::temporal::calendar_date::option"
    )]
    pub start_date: Option<NaiveDate>,
}

impl Project {
    pub fn new(id: ProjectId, client_id: ClientId) -> Self {
        Self {
            id,
            client_id,
            name: None,
            plan_id: None,
            start_date: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Binds the project to a plan starting on `start_date`
    pub fn subscribed(mut self, plan_id: PlanId, start_date: NaiveDate) -> Self {
        self.plan_id = Some(plan_id);
        self.start_date = Some(start_date);
        self
    }

    /// Returns the plan and start date when both are set
    ///
    /// Whether the plan actually resolves is decided by the reconciler.
    pub fn subscription(&self) -> Option<(&PlanId, NaiveDate)> {
        match (&self.plan_id, self.start_date) {
            (Some(plan_id), Some(start)) => Some((plan_id, start)),
            _ => None,
        }
    }

    /// Returns true if the project carries both a plan and a start date
    pub fn is_active(&self) -> bool {
        self.subscription().is_some()
    }
}

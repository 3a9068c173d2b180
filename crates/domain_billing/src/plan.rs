//! Payment plans
//!
//! Plans are priced per annual billing period. Prices come from the console
//! either as numbers or numeric strings and are held as exact decimals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, PlanId};

use crate::error::BillingError;

/// A recurring payment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    /// Unique identifier
    pub id: PlanId,
    /// Plan name, used in invoice line descriptions
    pub name: String,
    /// Price per billing period
    #[serde(with = "core_kernel::money::amount")]
    pub price: Decimal,
    /// Currency copied onto generated invoices
    pub currency: Currency,
}

impl PaymentPlan {
    pub fn new(id: PlanId, name: impl Into<String>, price: Decimal, currency: Currency) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            currency,
        }
    }

    /// Returns the price as Money in the plan currency
    pub fn price_money(&self) -> Money {
        Money::new(self.price, self.currency)
    }

    /// Description used on the generated subscription line item
    pub fn line_description(&self) -> String {
        format!("{} Plan (Annual)", self.name)
    }

    /// Checks the plan invariants enforced on writes
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(BillingError::InvalidPrice {
                plan_id: self.id.to_string(),
                price: self.price,
            });
        }
        Ok(())
    }
}

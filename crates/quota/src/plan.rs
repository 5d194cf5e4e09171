//! Subscription-plan features.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::ResourceKind;

/// Sentinel for "no limit" on a plan feature.
pub const UNLIMITED: i64 = -1;

/// Limits attached to a subscription plan.
///
/// A company references at most one active plan at a time. `-1` means
/// unlimited for any numeric limit. `modules` flags plan-level module
/// availability by key; modules absent from the map are available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeatures {
    pub max_users: i64,
    pub max_invoices: i64,
    pub max_customers: i64,
    pub max_products: i64,
    pub max_deals: i64,
    pub max_quotes: i64,
    pub max_storage_mb: i64,
    #[serde(default)]
    pub modules: BTreeMap<String, bool>,
}

impl PlanFeatures {
    /// A plan with every limit set to unlimited.
    pub fn unlimited() -> Self {
        Self {
            max_users: UNLIMITED,
            max_invoices: UNLIMITED,
            max_customers: UNLIMITED,
            max_products: UNLIMITED,
            max_deals: UNLIMITED,
            max_quotes: UNLIMITED,
            max_storage_mb: UNLIMITED,
            modules: BTreeMap::new(),
        }
    }

    pub fn limit(&self, resource: ResourceKind) -> i64 {
        match resource {
            ResourceKind::Users => self.max_users,
            ResourceKind::Invoices => self.max_invoices,
            ResourceKind::Customers => self.max_customers,
            ResourceKind::Products => self.max_products,
            ResourceKind::Deals => self.max_deals,
            ResourceKind::Quotes => self.max_quotes,
        }
    }

    pub fn with_limit(mut self, resource: ResourceKind, value: i64) -> Self {
        match resource {
            ResourceKind::Users => self.max_users = value,
            ResourceKind::Invoices => self.max_invoices = value,
            ResourceKind::Customers => self.max_customers = value,
            ResourceKind::Products => self.max_products = value,
            ResourceKind::Deals => self.max_deals = value,
            ResourceKind::Quotes => self.max_quotes = value,
        }
        self
    }

    /// Plan-level module availability. Absent keys default to available.
    pub fn module_enabled(&self, key: &str) -> bool {
        self.modules.get(key).copied().unwrap_or(true)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Usage counts.

use serde::{Deserialize, Serialize};

use crate::action::ResourceKind;

/// Current resource counts for a company.
///
/// Ephemeral — recomputed per fetch by counting rows scoped to the company.
/// The six counts are independent queries upstream and may reflect slightly
/// different instants; acceptable for a soft quota.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub users: u64,
    pub invoices: u64,
    pub customers: u64,
    pub products: u64,
    pub deals: u64,
    pub quotes: u64,
}

impl UsageStats {
    pub fn count(&self, resource: ResourceKind) -> u64 {
        match resource {
            ResourceKind::Users => self.users,
            ResourceKind::Invoices => self.invoices,
            ResourceKind::Customers => self.customers,
            ResourceKind::Products => self.products,
            ResourceKind::Deals => self.deals,
            ResourceKind::Quotes => self.quotes,
        }
    }

    pub fn with_count(mut self, resource: ResourceKind, value: u64) -> Self {
        match resource {
            ResourceKind::Users => self.users = value,
            ResourceKind::Invoices => self.invoices = value,
            ResourceKind::Customers => self.customers = value,
            ResourceKind::Products => self.products = value,
            ResourceKind::Deals => self.deals = value,
            ResourceKind::Quotes => self.quotes = value,
        }
        self
    }
}

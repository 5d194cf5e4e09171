//! Quota-gated actions and the resources they consume.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use gatewise_core::DomainError;

/// A countable, plan-limited resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Users,
    Invoices,
    Customers,
    Products,
    Deals,
    Quotes,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Users,
        ResourceKind::Invoices,
        ResourceKind::Customers,
        ResourceKind::Products,
        ResourceKind::Deals,
        ResourceKind::Quotes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Invoices => "invoices",
            ResourceKind::Customers => "customers",
            ResourceKind::Products => "products",
            ResourceKind::Deals => "deals",
            ResourceKind::Quotes => "quotes",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutating action gated by quota.
///
/// Maps 1:1 onto the resource it would consume.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    AddUser,
    CreateInvoice,
    AddCustomer,
    AddProduct,
    AddDeal,
    AddQuote,
}

impl ActionType {
    pub fn resource(&self) -> ResourceKind {
        match self {
            ActionType::AddUser => ResourceKind::Users,
            ActionType::CreateInvoice => ResourceKind::Invoices,
            ActionType::AddCustomer => ResourceKind::Customers,
            ActionType::AddProduct => ResourceKind::Products,
            ActionType::AddDeal => ResourceKind::Deals,
            ActionType::AddQuote => ResourceKind::Quotes,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::AddUser => "ADD_USER",
            ActionType::CreateInvoice => "CREATE_INVOICE",
            ActionType::AddCustomer => "ADD_CUSTOMER",
            ActionType::AddProduct => "ADD_PRODUCT",
            ActionType::AddDeal => "ADD_DEAL",
            ActionType::AddQuote => "ADD_QUOTE",
        }
    }
}

impl core::fmt::Display for ActionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD_USER" => Ok(ActionType::AddUser),
            "CREATE_INVOICE" => Ok(ActionType::CreateInvoice),
            "ADD_CUSTOMER" => Ok(ActionType::AddCustomer),
            "ADD_PRODUCT" => Ok(ActionType::AddProduct),
            "ADD_DEAL" => Ok(ActionType::AddDeal),
            "ADD_QUOTE" => Ok(ActionType::AddQuote),
            other => Err(DomainError::validation(format!("unknown action type: {other}"))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_maps_to_a_distinct_resource() {
        let actions = [
            ActionType::AddUser,
            ActionType::CreateInvoice,
            ActionType::AddCustomer,
            ActionType::AddProduct,
            ActionType::AddDeal,
            ActionType::AddQuote,
        ];
        let mut resources: Vec<_> = actions.iter().map(|a| a.resource()).collect();
        resources.sort();
        resources.dedup();
        assert_eq!(resources.len(), actions.len());
    }

    #[test]
    fn action_round_trips_through_str() {
        for action in [
            ActionType::AddUser,
            ActionType::CreateInvoice,
            ActionType::AddCustomer,
            ActionType::AddProduct,
            ActionType::AddDeal,
            ActionType::AddQuote,
        ] {
            assert_eq!(action.as_str().parse::<ActionType>().unwrap(), action);
        }
    }

    #[test]
    fn unknown_action_is_rejected_with_error() {
        let err = "DELETE_EVERYTHING".parse::<ActionType>().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("unknown action type: DELETE_EVERYTHING")
        );
    }
}

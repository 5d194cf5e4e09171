//! Module registry: the closed set of permissionable application areas.
//!
//! The set of valid module keys is fixed at deploy time. Override rows read
//! back from the store may reference keys that are no longer (or not yet)
//! registered; those are treated as unknown and silently dropped wherever
//! they appear.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use gatewise_core::DomainError;

/// A permissionable module of the application.
///
/// Declaration order is the registry order used for display and for the
/// full-replace write path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKey {
    Dashboard,
    Finance,
    Customers,
    Invoices,
    Quotes,
    Products,
    Deals,
    Activities,
    Accounts,
    Settings,
}

impl ModuleKey {
    /// All registered modules, in registry order.
    pub const ALL: [ModuleKey; 10] = [
        ModuleKey::Dashboard,
        ModuleKey::Finance,
        ModuleKey::Customers,
        ModuleKey::Invoices,
        ModuleKey::Quotes,
        ModuleKey::Products,
        ModuleKey::Deals,
        ModuleKey::Activities,
        ModuleKey::Accounts,
        ModuleKey::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKey::Dashboard => "dashboard",
            ModuleKey::Finance => "finance",
            ModuleKey::Customers => "customers",
            ModuleKey::Invoices => "invoices",
            ModuleKey::Quotes => "quotes",
            ModuleKey::Products => "products",
            ModuleKey::Deals => "deals",
            ModuleKey::Activities => "activities",
            ModuleKey::Accounts => "accounts",
            ModuleKey::Settings => "settings",
        }
    }

    /// Parse a stored module key.
    ///
    /// Returns `None` for unregistered keys — callers drop those rows rather
    /// than failing (forward compatibility with schema drift).
    pub fn parse_key(key: &str) -> Option<ModuleKey> {
        ModuleKey::ALL.iter().copied().find(|m| m.as_str() == key)
    }

    /// Route path guarded by this module.
    pub fn route(&self) -> &'static str {
        match self {
            ModuleKey::Dashboard => "/dashboard",
            ModuleKey::Finance => "/finance",
            ModuleKey::Customers => "/customers",
            ModuleKey::Invoices => "/invoices",
            ModuleKey::Quotes => "/quotes",
            ModuleKey::Products => "/products",
            ModuleKey::Deals => "/deals",
            ModuleKey::Activities => "/activities",
            ModuleKey::Accounts => "/accounts",
            ModuleKey::Settings => "/settings",
        }
    }

    /// Which module guards the given route path (for route guards).
    ///
    /// Matches the route itself or any sub-path beneath it.
    pub fn from_route(path: &str) -> Option<ModuleKey> {
        ModuleKey::ALL.iter().copied().find(|m| {
            let route = m.route();
            path == route
                || (path.starts_with(route) && path[route.len()..].starts_with('/'))
        })
    }

    /// Translation key for the module's display label.
    pub fn label_key(&self) -> &'static str {
        match self {
            ModuleKey::Dashboard => "modules.dashboard",
            ModuleKey::Finance => "modules.finance",
            ModuleKey::Customers => "modules.customers",
            ModuleKey::Invoices => "modules.invoices",
            ModuleKey::Quotes => "modules.quotes",
            ModuleKey::Products => "modules.products",
            ModuleKey::Deals => "modules.deals",
            ModuleKey::Activities => "modules.activities",
            ModuleKey::Accounts => "modules.accounts",
            ModuleKey::Settings => "modules.settings",
        }
    }
}

impl core::fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleKey::parse_key(s)
            .ok_or_else(|| DomainError::validation(format!("unknown module key: {s}")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_keys_round_trip() {
        for module in ModuleKey::ALL {
            assert_eq!(ModuleKey::parse_key(module.as_str()), Some(module));
        }
    }

    #[test]
    fn unknown_key_is_none() {
        assert_eq!(ModuleKey::parse_key("nonexistent"), None);
        assert_eq!(ModuleKey::parse_key(""), None);
        // Keys are case-sensitive as stored.
        assert_eq!(ModuleKey::parse_key("Invoices"), None);
    }

    #[test]
    fn from_str_rejects_unknown_key_with_error() {
        let err = "nonexistent".parse::<ModuleKey>().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("unknown module key: nonexistent")
        );
        assert_eq!("invoices".parse::<ModuleKey>().unwrap(), ModuleKey::Invoices);
    }

    #[test]
    fn route_lookup_matches_subpaths() {
        assert_eq!(ModuleKey::from_route("/invoices"), Some(ModuleKey::Invoices));
        assert_eq!(
            ModuleKey::from_route("/invoices/123/edit"),
            Some(ModuleKey::Invoices)
        );
        assert_eq!(ModuleKey::from_route("/invoicesx"), None);
        assert_eq!(ModuleKey::from_route("/unknown"), None);
    }

    #[test]
    fn registry_is_ten_modules() {
        assert_eq!(ModuleKey::ALL.len(), 10);
    }
}

//! Tenant-resolution input.

use serde::{Deserialize, Serialize};

use crate::{CompanyId, Role};

/// Snapshot of the external tenant resolver's state for the current session.
///
/// The permission and quota services treat this as a pure input: they never
/// mutate it, and they re-evaluate whenever the caller reports a change via
/// `on_tenant_changed`.
///
/// `loading = true` means the resolver has not settled yet; services must not
/// resolve against a possibly stale `(company_id, role)` pair in that state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub company_id: Option<CompanyId>,
    pub role: Option<Role>,
    pub loading: bool,
}

impl TenantContext {
    /// A settled context for a company member.
    pub fn resolved(company_id: CompanyId, role: Role) -> Self {
        Self {
            company_id: Some(company_id),
            role: Some(role),
            loading: false,
        }
    }

    /// A settled context with no tenant membership (e.g. a user not yet
    /// assigned to any company).
    pub fn unassigned() -> Self {
        Self {
            company_id: None,
            role: None,
            loading: false,
        }
    }

    /// The resolver is still in flight.
    pub fn pending() -> Self {
        Self {
            company_id: None,
            role: None,
            loading: true,
        }
    }

    /// A role without a company attachment (role-based defaults apply,
    /// no override fetch is possible).
    pub fn role_only(role: Role) -> Self {
        Self {
            company_id: None,
            role: Some(role),
            loading: false,
        }
    }
}

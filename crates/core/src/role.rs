//! Role model for the permission system.
//!
//! The role set is closed: `superadmin` (system operator, always full access),
//! `admin` (company administrator) and `user` (company member). A session with
//! no resolved tenant membership has no role at all, modeled as `Option<Role>`
//! at the call sites rather than a fourth variant.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Role of the current session within its company.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System operator. Full access by construction; never subject to
    /// company-level overrides.
    Superadmin,
    /// Company administrator. Full access by default, restrictable per module.
    Admin,
    /// Company member. View-only by default, grantable per module.
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Roles that can carry override rows. Superadmin is excluded by design.
    pub fn as_override_role(&self) -> Option<OverrideRole> {
        match self {
            Role::Superadmin => None,
            Role::Admin => Some(OverrideRole::Admin),
            Role::User => Some(OverrideRole::User),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(DomainError::unknown_role(other)),
        }
    }
}

/// Role name as persisted on an override row.
///
/// Only `admin` and `user` rows exist; superadmin access is unconditional and
/// never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideRole {
    Admin,
    User,
}

impl OverrideRole {
    pub const ALL: [OverrideRole; 2] = [OverrideRole::Admin, OverrideRole::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideRole::Admin => "admin",
            OverrideRole::User => "user",
        }
    }
}

impl core::fmt::Display for OverrideRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Override-row store boundary.
//!
//! The row store is remote (a hosted backend); this crate only sees it
//! through [`OverrideStore`]. Implementations live elsewhere — the infra
//! crate ships an in-memory one for tests/dev.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatewise_core::{CompanyId, OverrideRole};

/// Persisted permission override: one row per (company, role, module).
///
/// `module_key` stays a raw string here: stored data may reference modules
/// the registry no longer (or not yet) knows, and those rows must be dropped
/// on read, not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverrideRow {
    pub company_id: CompanyId,
    pub role_name: OverrideRole,
    pub module_key: String,
    pub can_view: bool,
    pub can_edit: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of a full-replace write, as sent by the matrix editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideWrite {
    pub role_name: OverrideRole,
    pub module_key: String,
    pub can_view: bool,
    pub can_edit: bool,
}

/// Store operation error.
///
/// These are infrastructure failures (network, backend). The permission
/// context recovers from fetch failures by falling back to role defaults;
/// write failures surface to the editor.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("permission store unavailable: {0}")]
    Unavailable(String),
}

/// Remote override-row store.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Fetch all override rows for a company.
    ///
    /// Returns an empty vec (not an error) when the company has no overrides.
    async fn fetch_overrides(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<PermissionOverrideRow>, StoreError>;

    /// Replace the company's override rows with the given set.
    ///
    /// Full-replace semantics: the caller sends every (role, module) row on
    /// every save, and rows absent from `rows` cease to exist.
    async fn write_overrides(
        &self,
        company_id: CompanyId,
        rows: Vec<OverrideWrite>,
    ) -> Result<(), StoreError>;
}

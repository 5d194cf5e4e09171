//! Usage and plan fetch boundaries.

use async_trait::async_trait;
use thiserror::Error;

use gatewise_core::CompanyId;

use crate::plan::PlanFeatures;
use crate::usage::UsageStats;

/// Fetch failure at the usage/plan boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("quota source unavailable: {0}")]
    Unavailable(String),
}

/// Remote usage counter: six company-scoped row counts per fetch.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn fetch_usage(&self, company_id: CompanyId) -> Result<UsageStats, SourceError>;
}

/// Remote plan lookup.
///
/// `Ok(None)` means the company has no plan assigned — a legitimate state,
/// not an error.
#[async_trait]
pub trait PlanSource: Send + Sync {
    async fn fetch_plan(&self, company_id: CompanyId)
    -> Result<Option<PlanFeatures>, SourceError>;
}

//! `gatewise-quota` — subscription-plan quota gating for mutating actions.
//!
//! Soft quotas: counts are fetched on a cache window and checks are advisory
//! UI gates, not transactional reservations. The backing counts and plan
//! lookup sit behind [`UsageSource`] and [`PlanSource`].

pub mod action;
pub mod guard;
pub mod plan;
pub mod source;
pub mod usage;

pub use action::{ActionType, ResourceKind};
pub use guard::{DenyReason, QuotaCheckResult, QuotaGuard};
pub use plan::{PlanFeatures, UNLIMITED};
pub use source::{PlanSource, SourceError, UsageSource};
pub use usage::UsageStats;

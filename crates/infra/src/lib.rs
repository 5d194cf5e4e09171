//! `gatewise-infra` — in-memory implementations of the remote boundaries.
//!
//! The production row store is a hosted backend; these implementations are
//! for tests and development. Each carries a failure toggle so callers can
//! exercise the degraded paths (fallback to role defaults, stale quota
//! snapshots).

pub mod in_memory;


pub use in_memory::{InMemoryOverrideStore, InMemoryPlanSource, InMemoryUsageSource};

//! `gatewise-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the role model, and the tenant-resolution input
//! consumed by the permission and quota services.

pub mod error;
pub mod id;
pub mod role;
pub mod tenant;

pub use error::{DomainError, DomainResult};
pub use id::CompanyId;
pub use role::{OverrideRole, Role};
pub use tenant::TenantContext;

//! `gatewise-permissions` — per-module view/edit authorization for tenants.
//!
//! This crate is intentionally decoupled from HTTP and storage: the override
//! row store sits behind [`OverrideStore`], and the tenant resolver supplies a
//! plain [`gatewise_core::TenantContext`] value. Everything in between —
//! registry, role defaults, overlay resolution, session context — is pure
//! logic.

pub mod context;
pub mod matrix;
pub mod registry;
pub mod resolve;
pub mod store;

pub use context::PermissionService;
pub use matrix::{ModulePermissions, PermissionEntry, PermissionMatrix, RoleMatrix};
pub use registry::ModuleKey;
pub use resolve::resolve;
pub use store::{OverrideStore, OverrideWrite, PermissionOverrideRow, StoreError};

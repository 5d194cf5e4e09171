//! Overlay resolution: merge stored override rows onto role defaults.

use gatewise_core::Role;

use crate::matrix::{PermissionEntry, RoleMatrix};
use crate::registry::ModuleKey;
use crate::store::PermissionOverrideRow;

/// Resolve the effective matrix for a session role from its override rows.
///
/// - No role: defaults (all deny); rows are meaningless without a membership.
/// - Superadmin: defaults (all allow); overrides are never consulted.
/// - Admin/user: start from role defaults, then apply each row whose
///   `role_name` matches and whose `module_key` is registered. An applied
///   entry is `{view: can_view, edit: can_view && can_edit}` — edit is forced
///   false whenever view is false, regardless of what was stored.
///
/// Rows for the other role and rows with unknown module keys are skipped
/// silently. Deterministic: same rows + role, same matrix; at most one row
/// should exist per (role, module) upstream, but if duplicates appear the
/// last one wins.
///
/// - No IO
/// - No panics
pub fn resolve(rows: &[PermissionOverrideRow], role: Option<Role>) -> RoleMatrix {
    let mut matrix = RoleMatrix::defaults(role);

    let Some(override_role) = role.and_then(|r| r.as_override_role()) else {
        return matrix;
    };

    for row in rows {
        if row.role_name != override_role {
            continue;
        }
        let Some(module) = ModuleKey::parse_key(&row.module_key) else {
            continue;
        };
        matrix.set(module, PermissionEntry::new(row.can_view, row.can_edit));
    }

    matrix
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

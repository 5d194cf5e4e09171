//! Permission entries and matrices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gatewise_core::{OverrideRole, Role};

use crate::registry::ModuleKey;
use crate::store::{OverrideWrite, PermissionOverrideRow};

// ─────────────────────────────────────────────────────────────────────────────
// Permission entry
// ─────────────────────────────────────────────────────────────────────────────

/// View/edit access for one (module, role) pair.
///
/// # Invariant
/// `edit == true` implies `view == true`. Construction through [`new`] or
/// [`normalized`] enforces this: view gates edit, never the reverse, so an
/// inconsistent stored pair only ever narrows to `edit = false`.
///
/// [`new`]: PermissionEntry::new
/// [`normalized`]: PermissionEntry::normalized
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub view: bool,
    pub edit: bool,
}

impl PermissionEntry {
    pub const ALLOW_ALL: PermissionEntry = PermissionEntry {
        view: true,
        edit: true,
    };

    pub const VIEW_ONLY: PermissionEntry = PermissionEntry {
        view: true,
        edit: false,
    };

    pub const DENY_ALL: PermissionEntry = PermissionEntry {
        view: false,
        edit: false,
    };

    /// Build an entry, forcing `edit` false whenever `view` is false.
    pub fn new(view: bool, edit: bool) -> Self {
        PermissionEntry {
            view,
            edit: view && edit,
        }
    }

    /// Re-establish the edit-implies-view invariant on an arbitrary pair.
    pub fn normalized(self) -> Self {
        Self::new(self.view, self.edit)
    }
}

impl Default for PermissionEntry {
    fn default() -> Self {
        Self::DENY_ALL
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role matrix (the session's resolved view)
// ─────────────────────────────────────────────────────────────────────────────

/// Effective permissions for one session role, total over the registry.
///
/// Always carries an entry for every registered module — lookups never need a
/// null check beyond the module key itself. Absent entries (which cannot occur
/// through this type's constructors) read as deny.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMatrix {
    entries: BTreeMap<ModuleKey, PermissionEntry>,
}

impl RoleMatrix {
    /// Matrix with the same entry for every registered module.
    pub fn uniform(entry: PermissionEntry) -> Self {
        let entries = ModuleKey::ALL.iter().map(|&m| (m, entry)).collect();
        Self { entries }
    }

    /// Baseline matrix for a role, before any overrides.
    ///
    /// - no role: deny everything (no tenant, no access)
    /// - superadmin: allow everything, unconditionally
    /// - admin: allow everything (overrides may later restrict)
    /// - user: view-only everywhere (overrides may later grant edit)
    pub fn defaults(role: Option<Role>) -> Self {
        match role {
            None => Self::uniform(PermissionEntry::DENY_ALL),
            Some(Role::Superadmin) => Self::uniform(PermissionEntry::ALLOW_ALL),
            Some(Role::Admin) => Self::uniform(PermissionEntry::ALLOW_ALL),
            Some(Role::User) => Self::uniform(PermissionEntry::VIEW_ONLY),
        }
    }

    pub fn entry(&self, module: ModuleKey) -> PermissionEntry {
        self.entries.get(&module).copied().unwrap_or_default()
    }

    pub fn can_view(&self, module: ModuleKey) -> bool {
        self.entry(module).view
    }

    pub fn can_edit(&self, module: ModuleKey) -> bool {
        self.entry(module).edit
    }

    /// Replace a module's entry (normalized on the way in).
    pub fn set(&mut self, module: ModuleKey, entry: PermissionEntry) {
        self.entries.insert(module, entry.normalized());
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleKey, PermissionEntry)> + '_ {
        self.entries.iter().map(|(&m, &e)| (m, e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permission matrix (the editor's two-column view)
// ─────────────────────────────────────────────────────────────────────────────

/// Admin and user entries for one module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermissions {
    pub admin: PermissionEntry,
    pub user: PermissionEntry,
}

/// Per-company permission matrix as edited by an administrator:
/// every registered module crossed with both override roles.
///
/// This is the write-path shape. Saving always emits the full
/// (role × module) row set — one row per pair, changed or not — which keeps
/// the remote full-replace write idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMatrix {
    entries: BTreeMap<ModuleKey, ModulePermissions>,
}

impl PermissionMatrix {
    /// Role-default matrix: admin full access, user view-only.
    pub fn defaults() -> Self {
        let entries = ModuleKey::ALL
            .iter()
            .map(|&m| {
                (
                    m,
                    ModulePermissions {
                        admin: PermissionEntry::ALLOW_ALL,
                        user: PermissionEntry::VIEW_ONLY,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Build the editor matrix from stored rows.
    ///
    /// Starts from [`defaults`] so the matrix stays total when rows are
    /// missing; unknown module keys are dropped; entries are normalized.
    ///
    /// [`defaults`]: PermissionMatrix::defaults
    pub fn from_rows(rows: &[PermissionOverrideRow]) -> Self {
        let mut matrix = Self::defaults();
        for row in rows {
            let Some(module) = ModuleKey::parse_key(&row.module_key) else {
                continue;
            };
            matrix.set(
                module,
                row.role_name,
                PermissionEntry::new(row.can_view, row.can_edit),
            );
        }
        matrix
    }

    pub fn entry(&self, module: ModuleKey) -> ModulePermissions {
        self.entries.get(&module).copied().unwrap_or(ModulePermissions {
            admin: PermissionEntry::DENY_ALL,
            user: PermissionEntry::DENY_ALL,
        })
    }

    pub fn set(&mut self, module: ModuleKey, role: OverrideRole, entry: PermissionEntry) {
        let slot = self.entries.entry(module).or_insert(ModulePermissions {
            admin: PermissionEntry::DENY_ALL,
            user: PermissionEntry::DENY_ALL,
        });
        match role {
            OverrideRole::Admin => slot.admin = entry.normalized(),
            OverrideRole::User => slot.user = entry.normalized(),
        }
    }

    /// The full-replace row set for a save: one write per
    /// (role ∈ {admin, user}) × registered module, in registry order.
    pub fn to_writes(&self) -> Vec<OverrideWrite> {
        let mut writes = Vec::with_capacity(ModuleKey::ALL.len() * OverrideRole::ALL.len());
        for module in ModuleKey::ALL {
            let entry = self.entry(module);
            for role in OverrideRole::ALL {
                let e = match role {
                    OverrideRole::Admin => entry.admin,
                    OverrideRole::User => entry.user,
                };
                writes.push(OverrideWrite {
                    role_name: role,
                    module_key: module.as_str().to_string(),
                    can_view: e.view,
                    can_edit: e.edit,
                });
            }
        }
        writes
    }
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        Self::defaults()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatewise_core::CompanyId;

    fn row(role: OverrideRole, key: &str, view: bool, edit: bool) -> PermissionOverrideRow {
        PermissionOverrideRow {
            company_id: CompanyId::new(),
            role_name: role,
            module_key: key.to_string(),
            can_view: view,
            can_edit: edit,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn entry_normalization_narrows_only() {
        let inconsistent = PermissionEntry {
            view: false,
            edit: true,
        };
        assert_eq!(inconsistent.normalized(), PermissionEntry::DENY_ALL);
        assert_eq!(PermissionEntry::ALLOW_ALL.normalized(), PermissionEntry::ALLOW_ALL);
    }

    #[test]
    fn defaults_cover_every_module() {
        for role in [None, Some(Role::Superadmin), Some(Role::Admin), Some(Role::User)] {
            let matrix = RoleMatrix::defaults(role);
            assert_eq!(matrix.iter().count(), ModuleKey::ALL.len());
        }
    }

    #[test]
    fn user_defaults_are_view_only() {
        let matrix = RoleMatrix::defaults(Some(Role::User));
        for module in ModuleKey::ALL {
            assert!(matrix.can_view(module));
            assert!(!matrix.can_edit(module));
        }
    }

    #[test]
    fn null_role_defaults_deny() {
        let matrix = RoleMatrix::defaults(None);
        for module in ModuleKey::ALL {
            assert!(!matrix.can_view(module));
            assert!(!matrix.can_edit(module));
        }
    }

    #[test]
    fn editor_matrix_emits_full_row_set() {
        let writes = PermissionMatrix::defaults().to_writes();
        assert_eq!(writes.len(), 20);

        // Every (role, module) pair appears exactly once.
        for module in ModuleKey::ALL {
            for role in OverrideRole::ALL {
                let count = writes
                    .iter()
                    .filter(|w| w.role_name == role && w.module_key == module.as_str())
                    .count();
                assert_eq!(count, 1, "{role} × {module}");
            }
        }
    }

    #[test]
    fn editor_matrix_from_rows_applies_overrides() {
        let rows = vec![
            row(OverrideRole::User, "invoices", true, true),
            row(OverrideRole::Admin, "finance", false, false),
            row(OverrideRole::User, "nonexistent", true, true),
        ];
        let matrix = PermissionMatrix::from_rows(&rows);

        assert_eq!(matrix.entry(ModuleKey::Invoices).user, PermissionEntry::ALLOW_ALL);
        assert_eq!(matrix.entry(ModuleKey::Finance).admin, PermissionEntry::DENY_ALL);
        // Untouched cells keep role defaults.
        assert_eq!(matrix.entry(ModuleKey::Deals).admin, PermissionEntry::ALLOW_ALL);
        assert_eq!(matrix.entry(ModuleKey::Deals).user, PermissionEntry::VIEW_ONLY);
    }

    #[test]
    fn editor_matrix_normalizes_stored_inconsistency() {
        let rows = vec![row(OverrideRole::User, "quotes", false, true)];
        let matrix = PermissionMatrix::from_rows(&rows);
        assert_eq!(matrix.entry(ModuleKey::Quotes).user, PermissionEntry::DENY_ALL);
    }
}

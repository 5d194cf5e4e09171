//! Permission context: the resolved matrix for the active session.
//!
//! [`PermissionService`] is an explicit service object — collaborators are
//! injected at construction and recomputation happens on an explicit
//! [`on_tenant_changed`] call, not through ambient framework state.
//!
//! [`on_tenant_changed`]: PermissionService::on_tenant_changed

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use gatewise_core::{CompanyId, Role, TenantContext};

use crate::matrix::{PermissionMatrix, RoleMatrix};
use crate::registry::ModuleKey;
use crate::resolve::resolve;
use crate::store::{OverrideStore, StoreError};

#[derive(Debug)]
struct State {
    matrix: RoleMatrix,
    loading: bool,
}

/// Session-scoped permission context.
///
/// Owns the currently-resolved [`RoleMatrix`] for the active tenant. Starts
/// all-deny with `loading = true`; callers re-resolve by reporting tenant
/// changes. Queries are cheap synchronous reads over the cached matrix.
///
/// ## Failure semantics
///
/// A failed override fetch falls back to role defaults (fail-open for an
/// authenticated tenant — a transient backend error must not lock a user out
/// of modules their role entitles them to), while a missing tenant stays
/// all-deny (fail-closed). This asymmetry is deliberate.
///
/// ## Concurrency
///
/// Resolutions may overlap (rapid tenant changes). Each resolution takes a
/// generation number up front and only installs its result if no newer
/// resolution has started since, so a slow stale response never clobbers
/// fresher data. No cancellation is attempted.
pub struct PermissionService {
    store: Arc<dyn OverrideStore>,
    state: RwLock<State>,
    generation: AtomicU64,
}

impl PermissionService {
    pub fn new(store: Arc<dyn OverrideStore>) -> Self {
        Self {
            store,
            state: RwLock::new(State {
                matrix: RoleMatrix::defaults(None),
                loading: true,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Re-resolve for a changed tenant context.
    ///
    /// Resolution order:
    /// 1. tenant still loading → do nothing (never resolve a stale role)
    /// 2. no role → all-deny
    /// 3. superadmin → all-allow, no fetch (never blocked by a slow store)
    /// 4. role without company → role defaults, no fetch
    /// 5. otherwise fetch overrides; on failure fall back to role defaults
    pub async fn on_tenant_changed(&self, tenant: &TenantContext) {
        if tenant.loading {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match (tenant.role, tenant.company_id) {
            (None, _) => self.install(generation, RoleMatrix::defaults(None)),
            (Some(Role::Superadmin), _) => {
                self.install(generation, RoleMatrix::defaults(Some(Role::Superadmin)));
            }
            (Some(role), None) => self.install(generation, RoleMatrix::defaults(Some(role))),
            (Some(role), Some(company_id)) => {
                self.mark_loading(generation);
                let matrix = match self.store.fetch_overrides(company_id).await {
                    Ok(rows) => resolve(&rows, Some(role)),
                    Err(err) => {
                        warn!(
                            %company_id,
                            role = %role,
                            error = %err,
                            "override fetch failed, falling back to role defaults"
                        );
                        RoleMatrix::defaults(Some(role))
                    }
                };
                self.install(generation, matrix);
            }
        }
    }

    /// On-demand re-resolution (e.g. after the matrix editor saves).
    pub async fn refresh(&self, tenant: &TenantContext) {
        self.on_tenant_changed(tenant).await;
    }

    pub fn can_view(&self, module: ModuleKey) -> bool {
        self.read(|s| s.matrix.can_view(module))
    }

    pub fn can_edit(&self, module: ModuleKey) -> bool {
        self.read(|s| s.matrix.can_edit(module))
    }

    /// True while no resolution has settled yet (or one is in flight for a
    /// company-scoped tenant). UI gating must not render access-denied state
    /// while this is set.
    pub fn is_loading(&self) -> bool {
        self.read(|s| s.loading)
    }

    /// Snapshot of the current matrix.
    pub fn matrix(&self) -> RoleMatrix {
        self.read(|s| s.matrix.clone())
    }

    // ── Matrix editor surface ────────────────────────────────────────────────

    /// Load the two-column editor matrix for a company.
    pub async fn load_matrix(
        &self,
        company_id: CompanyId,
    ) -> Result<PermissionMatrix, StoreError> {
        let rows = self.store.fetch_overrides(company_id).await?;
        Ok(PermissionMatrix::from_rows(&rows))
    }

    /// Save the editor matrix: always writes the full (role × module) row
    /// set, replacing whatever the company had before.
    pub async fn save_matrix(
        &self,
        company_id: CompanyId,
        matrix: &PermissionMatrix,
    ) -> Result<(), StoreError> {
        self.store
            .write_overrides(company_id, matrix.to_writes())
            .await
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        // A poisoned lock only means a panicking reader elsewhere; the state
        // itself is a plain value and still usable.
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn mark_loading(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        guard.loading = true;
    }

    fn install(&self, generation: u64, matrix: RoleMatrix) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded permission resolution");
            return;
        }
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        guard.matrix = matrix;
        guard.loading = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    use gatewise_core::OverrideRole;
    use crate::store::{OverrideWrite, PermissionOverrideRow};

    /// Test double: rows behind a lock, a failure toggle, and an optional
    /// gate that holds fetches open until released.
    #[derive(Default)]
    struct TestStore {
        rows: RwLock<Vec<PermissionOverrideRow>>,
        fail: AtomicBool,
        gate: Option<Arc<Notify>>,
    }

    impl TestStore {
        fn with_rows(rows: Vec<PermissionOverrideRow>) -> Self {
            Self {
                rows: RwLock::new(rows),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl OverrideStore for TestStore {
        async fn fetch_overrides(
            &self,
            _company_id: CompanyId,
        ) -> Result<Vec<PermissionOverrideRow>, StoreError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("injected".to_string()));
            }
            Ok(self.rows.read().unwrap().clone())
        }

        async fn write_overrides(
            &self,
            company_id: CompanyId,
            rows: Vec<OverrideWrite>,
        ) -> Result<(), StoreError> {
            let now = Utc::now();
            *self.rows.write().unwrap() = rows
                .into_iter()
                .map(|w| PermissionOverrideRow {
                    company_id,
                    role_name: w.role_name,
                    module_key: w.module_key,
                    can_view: w.can_view,
                    can_edit: w.can_edit,
                    created_at: now,
                    updated_at: now,
                })
                .collect();
            Ok(())
        }
    }

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
    fn initial_state_is_deny_and_loading() {
        let service = PermissionService::new(Arc::new(TestStore::default()));
        assert!(service.is_loading());
        assert!(!service.can_view(ModuleKey::Dashboard));
        assert!(!service.can_edit(ModuleKey::Dashboard));
    }

    #[tokio::test]
    async fn tenant_still_loading_is_a_no_op() {
        let service = PermissionService::new(Arc::new(TestStore::default()));
        service.on_tenant_changed(&TenantContext::pending()).await;
        assert!(service.is_loading());
    }

    #[tokio::test]
    async fn null_role_settles_to_deny() {
        let service = PermissionService::new(Arc::new(TestStore::default()));
        service.on_tenant_changed(&TenantContext::unassigned()).await;

        assert!(!service.is_loading());
        assert!(!service.can_view(ModuleKey::Invoices));
    }

    #[tokio::test]
    async fn superadmin_skips_fetch_even_when_store_fails() {
        let store = TestStore::default();
        store.fail.store(true, Ordering::SeqCst);
        let service = PermissionService::new(Arc::new(store));

        service
            .on_tenant_changed(&TenantContext::resolved(CompanyId::new(), Role::Superadmin))
            .await;

        assert!(!service.is_loading());
        for module in ModuleKey::ALL {
            assert!(service.can_edit(module));
        }
    }

    #[tokio::test]
    async fn role_without_company_gets_role_defaults() {
        let service = PermissionService::new(Arc::new(TestStore::default()));
        service
            .on_tenant_changed(&TenantContext::role_only(Role::User))
            .await;

        assert!(service.can_view(ModuleKey::Invoices));
        assert!(!service.can_edit(ModuleKey::Invoices));
    }

    #[tokio::test]
    async fn overrides_apply_for_company_member() {
        let store = TestStore::with_rows(vec![row(OverrideRole::User, "invoices", true, true)]);
        let service = PermissionService::new(Arc::new(store));

        service
            .on_tenant_changed(&TenantContext::resolved(CompanyId::new(), Role::User))
            .await;

        assert!(service.can_edit(ModuleKey::Invoices));
        assert!(!service.can_edit(ModuleKey::Customers));
    }

    #[tokio::test]
    async fn fetch_failure_falls_back_to_role_defaults() {
        let store = TestStore::default();
        store.fail.store(true, Ordering::SeqCst);
        let service = PermissionService::new(Arc::new(store));

        service
            .on_tenant_changed(&TenantContext::resolved(CompanyId::new(), Role::User))
            .await;

        // Fail-open to role defaults, not all-deny.
        assert!(!service.is_loading());
        assert!(service.can_view(ModuleKey::Invoices));
        assert!(!service.can_edit(ModuleKey::Invoices));
    }

    #[tokio::test]
    async fn stale_resolution_does_not_clobber_newer_state() {
        let gate = Arc::new(Notify::new());
        let store = Arc::new(TestStore {
            rows: RwLock::new(vec![row(OverrideRole::User, "invoices", true, true)]),
            fail: AtomicBool::new(false),
            gate: Some(gate.clone()),
        });
        let service = Arc::new(PermissionService::new(store));

        // Slow resolution for a company member: parks on the gate.
        let slow = {
            let service = service.clone();
            let tenant = TenantContext::resolved(CompanyId::new(), Role::User);
            tokio::spawn(async move { service.on_tenant_changed(&tenant).await })
        };
        tokio::task::yield_now().await;

        // Newer resolution: the tenant signed out.
        service.on_tenant_changed(&TenantContext::unassigned()).await;
        assert!(!service.can_view(ModuleKey::Invoices));

        // Release the slow fetch; its result must be discarded.
        gate.notify_one();
        slow.await.unwrap();

        assert!(!service.can_view(ModuleKey::Invoices));
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn editor_round_trip_changes_resolution() {
        let store = Arc::new(TestStore::default());
        let service = PermissionService::new(store);
        let company_id = CompanyId::new();

        let mut matrix = service.load_matrix(company_id).await.unwrap();
        matrix.set(
            ModuleKey::Invoices,
            OverrideRole::User,
            crate::matrix::PermissionEntry::ALLOW_ALL,
        );
        service.save_matrix(company_id, &matrix).await.unwrap();

        service
            .on_tenant_changed(&TenantContext::resolved(company_id, Role::User))
            .await;
        assert!(service.can_edit(ModuleKey::Invoices));
    }
}

//! In-memory boundary implementations.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use gatewise_core::CompanyId;
use gatewise_permissions::store::{
    OverrideStore, OverrideWrite, PermissionOverrideRow, StoreError,
};
use gatewise_quota::{PlanFeatures, PlanSource, SourceError, UsageSource, UsageStats};

fn poison_free<'a, T>(
    lock: &'a RwLock<T>,
) -> std::sync::RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn poison_free_mut<'a, T>(
    lock: &'a RwLock<T>,
) -> std::sync::RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

// ─────────────────────────────────────────────────────────────────────────────
// Override store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory override-row store with full-replace write semantics.
#[derive(Debug, Default)]
pub struct InMemoryOverrideStore {
    rows: RwLock<HashMap<CompanyId, Vec<PermissionOverrideRow>>>,
    fail: AtomicBool,
}

impl InMemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (exercises the fallback paths).
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Seed rows directly, bypassing the write path.
    pub fn seed(&self, company_id: CompanyId, rows: Vec<PermissionOverrideRow>) {
        poison_free_mut(&self.rows).insert(company_id, rows);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store failing".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OverrideStore for InMemoryOverrideStore {
    async fn fetch_overrides(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<PermissionOverrideRow>, StoreError> {
        self.check()?;
        // No overrides is an empty set, never an error.
        Ok(poison_free(&self.rows)
            .get(&company_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn write_overrides(
        &self,
        company_id: CompanyId,
        rows: Vec<OverrideWrite>,
    ) -> Result<(), StoreError> {
        self.check()?;
        let now = Utc::now();
        let mut map = poison_free_mut(&self.rows);
        let existing = map.entry(company_id).or_default();

        // Full replace, but keep created_at where the (role, module) pair
        // already existed.
        let replacement: Vec<PermissionOverrideRow> = rows
            .into_iter()
            .map(|w| {
                let created_at = existing
                    .iter()
                    .find(|r| r.role_name == w.role_name && r.module_key == w.module_key)
                    .map(|r| r.created_at)
                    .unwrap_or(now);
                PermissionOverrideRow {
                    company_id,
                    role_name: w.role_name,
                    module_key: w.module_key,
                    can_view: w.can_view,
                    can_edit: w.can_edit,
                    created_at,
                    updated_at: now,
                }
            })
            .collect();
        *existing = replacement;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Usage / plan sources
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory usage counts per company.
#[derive(Debug, Default)]
pub struct InMemoryUsageSource {
    usage: RwLock<HashMap<CompanyId, UsageStats>>,
    fail: AtomicBool,
}

impl InMemoryUsageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn set_usage(&self, company_id: CompanyId, stats: UsageStats) {
        poison_free_mut(&self.usage).insert(company_id, stats);
    }
}

#[async_trait]
impl UsageSource for InMemoryUsageSource {
    async fn fetch_usage(&self, company_id: CompanyId) -> Result<UsageStats, SourceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("in-memory source failing".to_string()));
        }
        Ok(poison_free(&self.usage)
            .get(&company_id)
            .copied()
            .unwrap_or_default())
    }
}

/// In-memory plan assignment per company. Companies absent from the map have
/// no plan.
#[derive(Debug, Default)]
pub struct InMemoryPlanSource {
    plans: RwLock<HashMap<CompanyId, PlanFeatures>>,
    fail: AtomicBool,
}

impl InMemoryPlanSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn assign_plan(&self, company_id: CompanyId, plan: PlanFeatures) {
        poison_free_mut(&self.plans).insert(company_id, plan);
    }

    pub fn clear_plan(&self, company_id: CompanyId) {
        poison_free_mut(&self.plans).remove(&company_id);
    }
}

#[async_trait]
impl PlanSource for InMemoryPlanSource {
    async fn fetch_plan(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<PlanFeatures>, SourceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("in-memory source failing".to_string()));
        }
        Ok(poison_free(&self.plans).get(&company_id).cloned())
    }
}

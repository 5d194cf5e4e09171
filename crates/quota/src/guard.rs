//! Quota guard: gates mutating actions against plan limits.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::warn;

use gatewise_core::{CompanyId, TenantContext};

use crate::action::{ActionType, ResourceKind};
use crate::plan::{PlanFeatures, UNLIMITED};
use crate::source::{PlanSource, UsageSource};
use crate::usage::UsageStats;

/// How long a fetched usage/plan snapshot stays fresh.
///
/// Exactness is not safety-critical: worst case a slightly stale count lets
/// one extra record through before the next fetch. Soft quota, no
/// reservation.
const DEFAULT_CACHE_WINDOW: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────────────────────────────────────
// Check result
// ─────────────────────────────────────────────────────────────────────────────

/// Why a quota check denied an action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No company is resolvable for the session.
    CompanyNotFound,
    /// The company has no active plan assigned.
    NoPlan,
    /// The resource count has reached the plan limit.
    QuotaExceeded,
}

/// Outcome of a quota check. Transient — recomputed per check, never stored.
///
/// Denials here are user-visible, actionable states (pick a plan, upgrade),
/// not errors: the caller blocks the one action and keeps the page alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaCheckResult {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
    pub message: Option<String>,
    pub current: Option<u64>,
    pub limit: Option<i64>,
    pub remaining: Option<u64>,
    pub unlimited: bool,
}

impl QuotaCheckResult {
    fn allowed_bare() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
            current: None,
            limit: None,
            remaining: None,
            unlimited: false,
        }
    }

    fn allowed_unlimited(current: u64) -> Self {
        Self {
            current: Some(current),
            unlimited: true,
            ..Self::allowed_bare()
        }
    }

    fn allowed_within(current: u64, limit: i64, remaining: u64) -> Self {
        Self {
            current: Some(current),
            limit: Some(limit),
            remaining: Some(remaining),
            ..Self::allowed_bare()
        }
    }

    fn denied(reason: DenyReason, message: Option<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            message,
            current: None,
            limit: None,
            remaining: None,
            unlimited: false,
        }
    }

    fn quota_exceeded(resource: ResourceKind, current: u64, limit: i64) -> Self {
        Self {
            current: Some(current),
            limit: Some(limit),
            remaining: Some(0),
            ..Self::denied(
                DenyReason::QuotaExceeded,
                Some(format!(
                    "{resource} limit reached ({current}/{limit}); upgrade the plan to add more"
                )),
            )
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

#[derive(Debug)]
struct State {
    company_id: Option<CompanyId>,
    usage: Option<Cached<UsageStats>>,
    // Outer Option: fetched yet? Inner: does the company have a plan?
    plan: Option<Cached<Option<PlanFeatures>>>,
    usage_loading: bool,
    plan_loading: bool,
}

/// Session-scoped quota guard.
///
/// Pulls usage counts and plan features for the active company through the
/// injected sources, caches them for a short window, and answers
/// [`can_perform`] checks synchronously from the cached snapshot.
///
/// While either fetch is still pending the guard fails open — the UI should
/// not pre-emptively disable controls on a spinner; the mutating call itself
/// may still be rejected server-side.
///
/// [`can_perform`]: QuotaGuard::can_perform
pub struct QuotaGuard {
    usage_source: Arc<dyn UsageSource>,
    plan_source: Arc<dyn PlanSource>,
    cache_window: Duration,
    state: RwLock<State>,
}

impl QuotaGuard {
    pub fn new(usage_source: Arc<dyn UsageSource>, plan_source: Arc<dyn PlanSource>) -> Self {
        Self {
            usage_source,
            plan_source,
            cache_window: DEFAULT_CACHE_WINDOW,
            state: RwLock::new(State {
                company_id: None,
                usage: None,
                plan: None,
                usage_loading: false,
                plan_loading: false,
            }),
        }
    }

    /// Override the cache window (tests, aggressive UIs).
    pub fn with_cache_window(mut self, window: Duration) -> Self {
        self.cache_window = window;
        self
    }

    /// Point the guard at a (possibly) different tenant and refresh.
    ///
    /// A company change drops the previous company's cached snapshot
    /// immediately so checks never mix tenants.
    pub async fn on_tenant_changed(&self, tenant: &TenantContext) {
        if tenant.loading {
            return;
        }
        {
            let mut state = self.write();
            if state.company_id != tenant.company_id {
                state.company_id = tenant.company_id;
                state.usage = None;
                state.plan = None;
                // Any fetch still in flight belongs to the previous company
                // and will be discarded on install; settle its flags now so
                // `is_loading` cannot stick when no refetch follows.
                state.usage_loading = false;
                state.plan_loading = false;
            }
        }
        self.refresh().await;
    }

    /// Re-fetch usage and plan for the active company if the cached snapshot
    /// is missing or older than the cache window. No-op without a company.
    pub async fn refresh(&self) {
        let (company_id, fetch_usage, fetch_plan) = {
            let mut state = self.write();
            let Some(company_id) = state.company_id else {
                return;
            };
            let stale = |fetched_at: Instant| fetched_at.elapsed() >= self.cache_window;
            let fetch_usage = state.usage.as_ref().is_none_or(|c| stale(c.fetched_at));
            let fetch_plan = state.plan.as_ref().is_none_or(|c| stale(c.fetched_at));
            state.usage_loading = fetch_usage;
            state.plan_loading = fetch_plan;
            (company_id, fetch_usage, fetch_plan)
        };

        if fetch_usage {
            match self.usage_source.fetch_usage(company_id).await {
                Ok(stats) => self.install_usage(company_id, Some(stats)),
                Err(err) => {
                    warn!(%company_id, error = %err, "usage fetch failed, keeping cached counts");
                    self.install_usage(company_id, None);
                }
            }
        }

        if fetch_plan {
            match self.plan_source.fetch_plan(company_id).await {
                Ok(plan) => self.install_plan(company_id, Some(plan)),
                Err(err) => {
                    warn!(%company_id, error = %err, "plan fetch failed, keeping cached plan");
                    self.install_plan(company_id, None);
                }
            }
        }
    }

    /// Evaluate whether a mutating action is currently permitted.
    ///
    /// Short-circuits, in order: no company → denied; data still loading →
    /// allowed (fail-open); no plan → denied; unlimited sentinel → allowed;
    /// at/over the limit → denied with current/limit; else allowed with the
    /// remaining headroom.
    pub fn can_perform(&self, action: ActionType) -> QuotaCheckResult {
        let state = self.read();

        if state.company_id.is_none() {
            return QuotaCheckResult::denied(DenyReason::CompanyNotFound, None);
        }

        let settled = !state.usage_loading && !state.plan_loading;
        let (Some(usage), Some(plan), true) = (&state.usage, &state.plan, settled) else {
            // Still loading: do not block the UI on a spinner.
            return QuotaCheckResult::allowed_bare();
        };

        let Some(plan) = &plan.value else {
            return QuotaCheckResult::denied(
                DenyReason::NoPlan,
                Some("no active plan for this company; select a plan to continue".to_string()),
            );
        };

        let resource = action.resource();
        let current = usage.value.count(resource);
        let limit = plan.limit(resource);

        if limit == UNLIMITED {
            return QuotaCheckResult::allowed_unlimited(current);
        }

        // Any other negative limit is malformed plan data; read it as zero.
        let ceiling = u64::try_from(limit).unwrap_or(0);
        if current >= ceiling {
            return QuotaCheckResult::quota_exceeded(resource, current, limit);
        }

        QuotaCheckResult::allowed_within(current, limit, ceiling - current)
    }

    /// Usage as a percentage of the plan limit.
    ///
    /// `0` when usage or plan data is missing, `0` for unlimited limits,
    /// `100` when the limit is zero, else `round(current / limit * 100)`
    /// (which exceeds 100 once over quota).
    pub fn usage_percentage(&self, resource: ResourceKind) -> u32 {
        let state = self.read();

        let (Some(usage), Some(plan)) = (&state.usage, &state.plan) else {
            return 0;
        };
        let Some(plan) = &plan.value else {
            return 0;
        };

        let limit = plan.limit(resource);
        if limit == UNLIMITED {
            return 0;
        }
        if limit == 0 {
            return 100;
        }

        let current = usage.value.count(resource);
        ((current as f64 / limit as f64) * 100.0).round() as u32
    }

    /// True while a usage or plan fetch is pending.
    pub fn is_loading(&self) -> bool {
        let state = self.read();
        state.usage_loading || state.plan_loading
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn install_usage(&self, company_id: CompanyId, stats: Option<UsageStats>) {
        let mut state = self.write();
        // The tenant may have changed while the fetch was in flight.
        if state.company_id != Some(company_id) {
            return;
        }
        if let Some(stats) = stats {
            state.usage = Some(Cached {
                value: stats,
                fetched_at: Instant::now(),
            });
        }
        state.usage_loading = false;
    }

    fn install_plan(&self, company_id: CompanyId, plan: Option<Option<PlanFeatures>>) {
        let mut state = self.write();
        if state.company_id != Some(company_id) {
            return;
        }
        if let Some(plan) = plan {
            state.plan = Some(Cached {
                value: plan,
                fetched_at: Instant::now(),
            });
        }
        state.plan_loading = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

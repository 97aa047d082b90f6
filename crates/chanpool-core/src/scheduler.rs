// ── Per-group reconciliation loops ──
//
// One task per parent group, each on its own interval. A tick runs to
// completion inside its task before the next tick is awaited, so ticks for
// one group never overlap; missed ticks are skipped rather than bunched.
// Groups share nothing but the API handle, so a slow or failing group
// never holds up another.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::ChannelApi;
use crate::error::CoreError;
use crate::execute::{self, ActionOutcome};
use crate::model::GroupConfig;
use crate::reconcile::{Plan, PoolReconciler, PoolState};
use crate::snapshot::ChannelSnapshot;

/// Default period between ticks of one group.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Summary of one completed tick.
#[derive(Debug)]
pub struct TickReport {
    pub group: String,
    pub state: PoolState,
    pub channels: usize,
    pub empty: usize,
    pub outcomes: Vec<ActionOutcome>,
}

impl TickReport {
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(ActionOutcome::is_ok)
    }
}

/// Drives one reconciliation loop per configured group.
///
/// Cheaply cloneable. [`start`](Self::start) spawns the loops;
/// [`shutdown`](Self::shutdown) cancels and joins them.
#[derive(Clone)]
pub struct GroupScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    api: Arc<dyn ChannelApi>,
    interval: Duration,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl GroupScheduler {
    pub fn new(api: Arc<dyn ChannelApi>, interval: Duration) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                api,
                interval,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Token that stops every loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Spawn one loop per group.
    pub async fn start(&self, groups: Vec<GroupConfig>) {
        let mut handles = self.inner.task_handles.lock().await;
        for group in groups {
            info!(
                group = %group.label,
                parent = %group.parent,
                interval_ms = u64::try_from(self.inner.interval.as_millis()).unwrap_or(u64::MAX),
                "starting group loop"
            );
            let scheduler = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(group_task(scheduler, group, cancel)));
        }
    }

    /// Cancel all loops and wait for in-flight ticks to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "group loop ended abnormally");
            }
        }
        debug!("scheduler stopped");
    }

    /// Snapshot and plan without touching the server.
    pub async fn plan(&self, group: &GroupConfig) -> Result<(ChannelSnapshot, Plan), CoreError> {
        let snapshot = ChannelSnapshot::fetch(self.inner.api.as_ref(), group).await?;
        let plan = PoolReconciler::plan(group, &snapshot);
        Ok((snapshot, plan))
    }

    /// One full tick: snapshot, plan, execute.
    pub async fn tick(&self, group: &GroupConfig) -> Result<TickReport, CoreError> {
        let (snapshot, plan) = self.plan(group).await?;
        let state = plan.state;
        let outcomes = execute::execute(self.inner.api.as_ref(), &group.label, plan).await;

        Ok(TickReport {
            group: group.label.clone(),
            state,
            channels: snapshot.len(),
            empty: snapshot.empty_count(),
            outcomes,
        })
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Tick `group` on the scheduler's interval until cancelled.
async fn group_task(scheduler: GroupScheduler, group: GroupConfig, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(scheduler.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match scheduler.tick(&group).await {
                    Ok(report) if report.outcomes.is_empty() => {
                        debug!(group = %group.label, state = %report.state, "tick: nothing to do");
                    }
                    Ok(report) => {
                        let failed = report.failures().count();
                        info!(
                            group = %group.label,
                            state = %report.state,
                            actions = report.outcomes.len(),
                            failed,
                            "tick complete"
                        );
                    }
                    Err(e) => warn!(group = %group.label, error = %e, "tick aborted"),
                }
            }
        }
    }

    debug!(group = %group.label, "group loop stopped");
}

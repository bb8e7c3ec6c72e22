//! Timed word-by-word reveal scheduler
//!
//! Takes a complete reply and produces an incrementing visible prefix, one
//! whitespace-delimited token per cadence tick. At most one job is active
//! system-wide; starting a new job tears down the previous one before the new
//! timer is armed, so two jobs can never write into the ledger concurrently.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Tick period: one additional word becomes visible per tick.
pub const REVEAL_CADENCE: Duration = Duration::from_millis(100);

/// Identifies a reveal job. Updates from a superseded job are discarded by
/// comparing ids, so a stale tick can never touch the current reply.
pub type JobId = u64;

/// Progress report from a running job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealUpdate {
    pub job: JobId,
    pub kind: RevealUpdateKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealUpdateKind {
    /// Cumulative prefix of the reply: tokens revealed so far joined by
    /// single spaces.
    Progress { prefix: String },
    /// The final token is visible; no further ticks occur for this job.
    Done,
}

/// The cumulative prefixes a reveal of `text` will emit, in order.
///
/// Empty text yields a single empty prefix (a zero-token job still reports
/// once before completing).
pub fn prefixes(text: &str) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return vec![String::new()];
    }
    (1..=tokens.len()).map(|n| tokens[..n].join(" ")).collect()
}

struct ActiveJob {
    job: JobId,
    token: CancellationToken,
}

/// Owns the single reveal timer.
pub struct RevealScheduler {
    update_tx: mpsc::Sender<RevealUpdate>,
    active: Option<ActiveJob>,
    next_job: JobId,
    cadence: Duration,
}

impl RevealScheduler {
    pub fn new(update_tx: mpsc::Sender<RevealUpdate>) -> Self {
        Self {
            update_tx,
            active: None,
            next_job: 1,
            cadence: REVEAL_CADENCE,
        }
    }

    /// Override the tick period (short cadences keep tests fast).
    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Start revealing `text`, tearing down any active job first.
    ///
    /// The previous job's token is cancelled before the new task is armed;
    /// the ordering matters, a stale tick must not fire after the new job
    /// has been installed.
    pub fn begin(&mut self, text: &str) -> JobId {
        self.cancel();
        let job = self.next_job;
        self.next_job += 1;
        let token = CancellationToken::new();
        self.active = Some(ActiveJob {
            job,
            token: token.clone(),
        });
        tokio::spawn(run_job(
            job,
            prefixes(text),
            self.cadence,
            self.update_tx.clone(),
            token,
        ));
        job
    }

    /// Stop the active job without a completion update. Idempotent: calling
    /// it with no active job, or after the job completed, is a no-op.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            active.token.cancel();
        }
    }

    /// Whether `job` is the currently active job.
    pub fn is_active(&self, job: JobId) -> bool {
        self.active.as_ref().is_some_and(|a| a.job == job)
    }

    /// Record that the active job reported completion.
    pub fn mark_done(&mut self, job: JobId) {
        if self.is_active(job) {
            self.active = None;
        }
    }
}

async fn run_job(
    job: JobId,
    steps: Vec<String>,
    cadence: Duration,
    tx: mpsc::Sender<RevealUpdate>,
    token: CancellationToken,
) {
    for prefix in steps {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            () = tokio::time::sleep(cadence) => {}
        }
        if token.is_cancelled() {
            return;
        }
        let update = RevealUpdate {
            job,
            kind: RevealUpdateKind::Progress { prefix },
        };
        if tx.send(update).await.is_err() {
            return;
        }
    }
    let _ = tx
        .send(RevealUpdate {
            job,
            kind: RevealUpdateKind::Done,
        })
        .await;
}

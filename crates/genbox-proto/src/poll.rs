//! Generation flow — submit a request, then poll the result endpoint until
//! a terminal state.
//!
//! Each submission runs as its own tokio task and reports progress through
//! an mpsc channel; the task owns no shared state, so any number of kinds
//! can be in flight at once without touching each other.  [`JobRegistry`]
//! keeps at most one live task per media kind: replacing a kind aborts the
//! previous task before the new one starts, so resubmitting never leaks a
//! poller.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::catalog::MediaKind;
use crate::config::PollingConfig;
use crate::job::{GenerationRequest, Submission};

/// Timing knobs for the poll loop, from `[polling]` in config.toml.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl From<&PollingConfig> for PollSettings {
    fn from(cfg: &PollingConfig) -> Self {
        Self {
            interval: cfg.interval(),
            timeout: cfg.timeout(),
        }
    }
}

/// Progress reports emitted by a generation task.  Exactly one of the
/// terminal variants (`Done`, `TimedOut`, `Failed`) ends every task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobUpdate {
    /// The backend queued the job; the poll loop has started.
    Queued { job_id: String },
    /// Still waiting: elapsed time and whatever status string the backend
    /// reported on the last poll.
    Waiting {
        elapsed_secs: u64,
        status: String,
        url: Option<String>,
    },
    /// Terminal: the result url is available.
    Done { url: String },
    /// Terminal: the configured timeout elapsed; polling stopped.
    TimedOut,
    /// Terminal: the submit or a poll failed.
    Failed { message: String },
}

/// Spawn the submit→poll task for one generation request.
///
/// The returned handle aborts the task; dropping it detaches the task, which
/// keeps running until a terminal update.
pub fn spawn_generation(
    api: ApiClient,
    kind: MediaKind,
    request: GenerationRequest,
    settings: PollSettings,
    tx: mpsc::Sender<(MediaKind, JobUpdate)>,
) -> AbortHandle {
    let task = tokio::spawn(async move {
        if let Err(e) = run_generation(&api, kind, &request, settings, &tx).await {
            warn!("{}: generation failed: {}", kind.slug(), e);
            let _ = tx
                .send((
                    kind,
                    JobUpdate::Failed {
                        message: e.to_string(),
                    },
                ))
                .await;
        }
    });
    task.abort_handle()
}

/// The submit → poll state machine.  Errors bubble up to `spawn_generation`,
/// which converts them to a `Failed` update — the flow-boundary catch.
async fn run_generation(
    api: &ApiClient,
    kind: MediaKind,
    request: &GenerationRequest,
    settings: PollSettings,
    tx: &mpsc::Sender<(MediaKind, JobUpdate)>,
) -> Result<(), ApiError> {
    let response = api.submit(kind, request).await?;

    let job_id = match Submission::try_from(response) {
        Ok(Submission::Ready { url }) => {
            // Terminal on submit — the poll loop is never entered.
            info!("{}: result ready on submit", kind.slug());
            let _ = tx.send((kind, JobUpdate::Done { url })).await;
            return Ok(());
        }
        Ok(Submission::Queued { job_id }) => job_id,
        Err(e) => {
            let _ = tx
                .send((
                    kind,
                    JobUpdate::Failed {
                        message: e.to_string(),
                    },
                ))
                .await;
            return Ok(());
        }
    };

    info!("{}: job {} queued, polling", kind.slug(), job_id);
    let started = Instant::now();
    let _ = tx
        .send((
            kind,
            JobUpdate::Queued {
                job_id: job_id.clone(),
            },
        ))
        .await;

    loop {
        tokio::time::sleep(settings.interval).await;

        // Checked before the request so a timed-out job issues no further
        // result calls.
        if started.elapsed() > settings.timeout {
            warn!(
                "{}: job {} timed out after {}s",
                kind.slug(),
                job_id,
                started.elapsed().as_secs()
            );
            let _ = tx.send((kind, JobUpdate::TimedOut)).await;
            return Ok(());
        }

        let result = api.result(kind, &job_id).await?;
        if let Some(url) = result.finished_url() {
            info!("{}: job {} done", kind.slug(), job_id);
            let _ = tx
                .send((
                    kind,
                    JobUpdate::Done {
                        url: url.to_string(),
                    },
                ))
                .await;
            return Ok(());
        }

        let _ = tx
            .send((
                kind,
                JobUpdate::Waiting {
                    elapsed_secs: started.elapsed().as_secs(),
                    status: result.status,
                    url: result.url,
                },
            ))
            .await;
    }
}

/// At most one live generation task per media kind.
#[derive(Default)]
pub struct JobRegistry {
    handles: HashMap<MediaKind, AbortHandle>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` for `kind`, aborting whatever was running there.
    pub fn replace(&mut self, kind: MediaKind, handle: AbortHandle) {
        if let Some(prev) = self.handles.insert(kind, handle) {
            if !prev.is_finished() {
                info!("{}: cancelling previous job task", kind.slug());
            }
            prev.abort();
        }
    }

    /// True while the kind's task has not reached a terminal state.
    pub fn is_running(&self, kind: MediaKind) -> bool {
        self.handles
            .get(&kind)
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Abort everything — used on shutdown.
    pub fn abort_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

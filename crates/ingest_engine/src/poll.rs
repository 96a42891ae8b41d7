use std::sync::Arc;

use ingest_core::{JobHandle, JobStatus, PollSchedule, RunId};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink, JobClient};

/// How a polling loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A `done` or `error` snapshot was emitted.
    Terminal(JobStatus),
    /// A status read failed; a `PollFailed` event was emitted.
    Failed,
    /// The token was cancelled; nothing further was emitted.
    Cancelled,
}

/// Drives repeated status reads for one job until it reaches a terminal
/// status, a read fails, or the run is cancelled.
#[derive(Clone)]
pub struct PollScheduler {
    client: Arc<dyn JobClient>,
    schedule: PollSchedule,
}

impl PollScheduler {
    pub fn new(client: Arc<dyn JobClient>, schedule: PollSchedule) -> Self {
        Self { client, schedule }
    }

    pub fn schedule(&self) -> PollSchedule {
        self.schedule
    }

    /// Every emitted event carries `run_id` and `handle`. Once `cancel` fires
    /// no further event is emitted, including for a read already in flight.
    pub async fn run(
        &self,
        run_id: RunId,
        handle: JobHandle,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> PollOutcome {
        let mut attempt: u32 = 0;
        loop {
            let wait = self.schedule.delay_for(attempt);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(run_id, &handle),
                _ = tokio::time::sleep(wait) => {}
            }

            ingest_debug!(
                "Polling run_id={} job={} attempt={} after {:?}",
                run_id,
                handle,
                attempt,
                wait
            );
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(run_id, &handle),
                result = self.client.fetch_status(&handle) => result,
            };
            if cancel.is_cancelled() {
                return cancelled(run_id, &handle);
            }

            match result {
                Err(error) => {
                    ingest_warn!(
                        "Status read failed run_id={} job={}: {}",
                        run_id,
                        handle,
                        error
                    );
                    sink.emit(EngineEvent::PollFailed {
                        run_id,
                        handle,
                        error,
                    });
                    return PollOutcome::Failed;
                }
                Ok(snapshot) => {
                    let status = snapshot.status;
                    sink.emit(EngineEvent::Snapshot {
                        run_id,
                        handle: handle.clone(),
                        snapshot,
                    });
                    if status.is_terminal() {
                        ingest_info!(
                            "Job finished run_id={} job={} status={:?}",
                            run_id,
                            handle,
                            status
                        );
                        return PollOutcome::Terminal(status);
                    }
                }
            }
            attempt = attempt.saturating_add(1);
        }
    }
}

fn cancelled(run_id: RunId, handle: &JobHandle) -> PollOutcome {
    ingest_info!("Polling cancelled run_id={} job={}", run_id, handle);
    PollOutcome::Cancelled
}

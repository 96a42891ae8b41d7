use ingest_core::{JobHandle, JobSnapshot, RunId, TransportError};
use thiserror::Error;

/// Everything the engine reports back to the platform layer. Each event is
/// tagged with the run (and job) it belongs to so stale ones can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Accepted {
        run_id: RunId,
        handle: JobHandle,
    },
    SyncCompleted {
        run_id: RunId,
        snapshot: JobSnapshot,
    },
    SubmitFailed {
        run_id: RunId,
        error: TransportError,
    },
    Snapshot {
        run_id: RunId,
        handle: JobHandle,
        snapshot: JobSnapshot,
    },
    PollFailed {
        run_id: RunId,
        handle: JobHandle,
        error: TransportError,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The engine thread has exited and can no longer take commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("engine is not running")]
pub struct EngineStopped;

use crate::{FileCandidate, JobHandle, JobSnapshot, RunId, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked or dropped files.
    FilesAdded(Vec<FileCandidate>),
    /// User removed a staged file.
    FileRemoved { index: usize },
    /// User removed every staged file.
    BatchCleared,
    /// User clicked Run Extraction.
    SubmitClicked,
    /// Backend accepted an asynchronous submission.
    AsyncAccepted { run_id: RunId, handle: JobHandle },
    /// Backend answered a synchronous submission.
    SyncResponded { run_id: RunId, snapshot: JobSnapshot },
    /// Submission request failed at the transport layer.
    SubmitFailed { run_id: RunId, error: TransportError },
    /// One status read completed.
    StatusFetched {
        run_id: RunId,
        handle: JobHandle,
        snapshot: JobSnapshot,
    },
    /// One status read failed at the transport layer.
    StatusFetchFailed {
        run_id: RunId,
        handle: JobHandle,
        error: TransportError,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

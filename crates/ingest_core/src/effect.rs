use crate::{FileCandidate, JobHandle, RunId, SubmitMode};

/// Side effects requested by [`crate::update`]; executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the batch to the backend in the configured mode.
    Submit {
        run_id: RunId,
        mode: SubmitMode,
        files: Vec<FileCandidate>,
    },
    /// Start the status polling loop for an accepted job.
    StartPolling { run_id: RunId, handle: JobHandle },
    /// Cancel any in-flight submission follow-up or polling loop.
    CancelPolling,
}

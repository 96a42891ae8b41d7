//! Ingest core: pure orchestration state machine and view-model helpers.
mod batch;
mod effect;
mod error;
mod msg;
mod poll;
mod result_store;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use batch::{
    FileCandidate, FileSource, PendingBatch, UploadValidator, BYTES_PER_MB, DEFAULT_MAX_TOTAL_MB,
};
pub use effect::Effect;
pub use error::{PipelineError, TransportError, ValidationError};
pub use msg::Msg;
pub use poll::{PollSchedule, DEFAULT_POLL_BASE, DEFAULT_POLL_CAP, DEFAULT_POLL_STEP};
pub use result_store::{Artifact, ResultStore};
pub use snapshot::{JobHandle, JobSnapshot, JobStatus, Stage};
pub use state::{
    AppState, CoreConfig, FailureOrigin, Phase, RunFailure, RunId, RunState, SubmitMode,
};
pub use update::update;
pub use view_model::{
    format_mb, stepper, AppViewModel, ErrorView, FileRowView, StepStatus, StepView,
    NO_RESULT_PLACEHOLDER,
};

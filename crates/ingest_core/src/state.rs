use crate::{
    Artifact, FileCandidate, JobHandle, PendingBatch, PipelineError, ResultStore, Stage,
    TransportError, UploadValidator, ValidationError, DEFAULT_MAX_TOTAL_MB,
};

/// Identity of one submission. A fresh id is minted on every submit, so
/// messages from an abandoned run can be recognised and dropped.
pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    /// One request whose response is the final snapshot.
    Sync,
    /// Backend returns a job handle which is then polled.
    #[default]
    Async,
}

/// Settings fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    pub max_total_mb: u64,
    pub mode: SubmitMode,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_total_mb: DEFAULT_MAX_TOTAL_MB,
            mode: SubmitMode::Async,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Processing,
    Done,
    Error,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Uploading => "UPLOADING",
            Phase::Processing => "PROCESSING",
            Phase::Done => "DONE",
            Phase::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOrigin {
    Upload,
    StatusFetch,
    Pipeline,
}

/// Error shown for a failed run: a short message plus raw detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub origin: FailureOrigin,
    pub message: String,
    pub detail: String,
}

impl RunFailure {
    pub(crate) fn upload(error: TransportError) -> Self {
        Self {
            origin: FailureOrigin::Upload,
            message: "Upload failed.".to_string(),
            detail: error.raw_body,
        }
    }

    pub(crate) fn status_fetch(error: TransportError) -> Self {
        let detail = if error.raw_body.is_empty() {
            error.message
        } else {
            error.raw_body
        };
        Self {
            origin: FailureOrigin::StatusFetch,
            message: "Failed to fetch job status.".to_string(),
            detail,
        }
    }

    pub(crate) fn pipeline(error: Option<PipelineError>) -> Self {
        let (message, detail) = match error {
            Some(err) => (err.message, err.detail.unwrap_or_default()),
            None => (String::new(), String::new()),
        };
        let message = if message.trim().is_empty() {
            "Pipeline error.".to_string()
        } else {
            message
        };
        Self {
            origin: FailureOrigin::Pipeline,
            message,
            detail,
        }
    }
}

/// Lifecycle of the current run. The only source of truth for what the UI
/// shows about a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Uploading {
        run_id: RunId,
    },
    Processing {
        run_id: RunId,
        handle: JobHandle,
        stage: Stage,
        progress: u8,
    },
    Done {
        run_id: RunId,
        stage: Stage,
    },
    Error {
        run_id: RunId,
        stage: Stage,
        failure: RunFailure,
    },
}

impl RunState {
    pub fn phase(&self) -> Phase {
        match self {
            RunState::Idle => Phase::Idle,
            RunState::Uploading { .. } => Phase::Uploading,
            RunState::Processing { .. } => Phase::Processing,
            RunState::Done { .. } => Phase::Done,
            RunState::Error { .. } => Phase::Error,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            RunState::Idle | RunState::Uploading { .. } => Stage::Upload,
            RunState::Processing { stage, .. }
            | RunState::Done { stage, .. }
            | RunState::Error { stage, .. } => *stage,
        }
    }

    pub fn progress(&self) -> u8 {
        match self {
            RunState::Processing { progress, .. } => *progress,
            RunState::Done { .. } => 100,
            _ => 0,
        }
    }

    pub fn run_id(&self) -> Option<RunId> {
        match self {
            RunState::Idle => None,
            RunState::Uploading { run_id }
            | RunState::Processing { run_id, .. }
            | RunState::Done { run_id, .. }
            | RunState::Error { run_id, .. } => Some(*run_id),
        }
    }

    /// Handle of the job currently being polled, if any.
    pub fn active_handle(&self) -> Option<&JobHandle> {
        match self {
            RunState::Processing { handle, .. } => Some(handle),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            RunState::Error { failure, .. } => Some(failure),
            _ => None,
        }
    }

    /// Uploading or Processing: something may still arrive for this run.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RunState::Uploading { .. } | RunState::Processing { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    config: CoreConfig,
    validator: UploadValidator,
    batch: PendingBatch,
    run: RunState,
    results: ResultStore,
    notice: Option<ValidationError>,
    next_run_id: RunId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(CoreConfig::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            config,
            validator: UploadValidator::new(config.max_total_mb),
            batch: PendingBatch::new(),
            run: RunState::Idle,
            results: ResultStore::new(),
            notice: None,
            next_run_id: 1,
            dirty: false,
        }
    }

    pub fn config(&self) -> CoreConfig {
        self.config
    }

    pub fn batch(&self) -> &PendingBatch {
        &self.batch
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    /// Last rejected add, shown until the next successful add or a clear.
    pub fn notice(&self) -> Option<&ValidationError> {
        self.notice.as_ref()
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn add_files(&mut self, incoming: Vec<FileCandidate>) {
        match self.validator.validate(&self.batch, incoming) {
            Ok(batch) => {
                self.batch = batch;
                self.notice = None;
            }
            Err(err) => self.notice = Some(err),
        }
        self.mark_dirty();
    }

    /// Returns `true` when the batch became empty as a result.
    pub(crate) fn remove_file(&mut self, index: usize) -> bool {
        if self.batch.remove(index).is_none() {
            return false;
        }
        self.mark_dirty();
        self.batch.is_empty()
    }

    pub(crate) fn clear_batch(&mut self) {
        self.batch.clear();
        self.mark_dirty();
    }

    /// Drops every piece of run state; the next submit starts from scratch.
    pub(crate) fn reset_run(&mut self) {
        self.run = RunState::Idle;
        self.results.clear();
        self.notice = None;
        self.mark_dirty();
    }

    /// Mints a new run and moves to Uploading. Prior output is discarded here.
    pub(crate) fn begin_run(&mut self) -> RunId {
        let run_id = self.next_run_id;
        self.next_run_id += 1;
        self.run = RunState::Uploading { run_id };
        self.results.clear();
        self.mark_dirty();
        run_id
    }

    pub(crate) fn set_run(&mut self, run: RunState) {
        self.run = run;
        self.mark_dirty();
    }

    pub(crate) fn store_artifact(&mut self, artifact: Artifact) {
        self.results.store(artifact);
        self.mark_dirty();
    }
}

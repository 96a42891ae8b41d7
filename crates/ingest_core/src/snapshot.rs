use std::fmt;

use serde_json::Value;

use crate::PipelineError;

/// Named pipeline step, used only for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Upload,
    Extract,
    Filter,
    Weight,
    Intelligence,
    Validate,
    Output,
}

impl Stage {
    /// The fixed, ordered stage vocabulary.
    pub const ALL: [Stage; 7] = [
        Stage::Upload,
        Stage::Extract,
        Stage::Filter,
        Stage::Weight,
        Stage::Intelligence,
        Stage::Validate,
        Stage::Output,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Upload => "UPLOAD",
            Stage::Extract => "EXTRACT",
            Stage::Filter => "FILTER",
            Stage::Weight => "WEIGHT",
            Stage::Intelligence => "INTELLIGENCE",
            Stage::Validate => "VALIDATE",
            Stage::Output => "OUTPUT",
        }
    }

    /// Parses a wire stage name. Unknown names yield `None`.
    pub fn parse(raw: &str) -> Option<Stage> {
        let raw = raw.trim();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque backend identifier for an asynchronous job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn parse(raw: &str) -> Option<JobStatus> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "done" => Some(JobStatus::Done),
            "error" => Some(JobStatus::Error),
            _ => None,
        }
    }

    /// `done` and `error` end polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

/// One point-in-time read of a job. Each snapshot replaces the previous one
/// wholesale; fields are never merged across snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub job_id: Option<JobHandle>,
    pub status: JobStatus,
    pub stage: Option<Stage>,
    /// Percent complete, clamped to 0..=100.
    pub progress: u8,
    pub source_files: Vec<String>,
    pub raw_text_preview: Option<String>,
    pub result: Option<Value>,
    pub error: Option<PipelineError>,
}

impl JobSnapshot {
    pub fn new(status: JobStatus) -> Self {
        Self {
            job_id: None,
            status,
            stage: None,
            progress: 0,
            source_files: Vec::new(),
            raw_text_preview: None,
            result: None,
            error: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_job_id(mut self, handle: JobHandle) -> Self {
        self.job_id = Some(handle);
        self
    }

    pub fn with_result(mut self, result: Value, raw_text_preview: impl Into<String>) -> Self {
        self.result = Some(result);
        self.raw_text_preview = Some(raw_text_preview.into());
        self
    }

    pub fn with_error(mut self, error: PipelineError) -> Self {
        self.error = Some(error);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_parse_is_case_insensitive() {
        assert_eq!(Stage::parse("extract"), Some(Stage::Extract));
        assert_eq!(Stage::parse(" OUTPUT "), Some(Stage::Output));
        assert_eq!(Stage::parse("RENDER"), None);
    }

    #[test]
    fn stage_index_follows_vocabulary_order() {
        for (idx, stage) in Stage::ALL.into_iter().enumerate() {
            assert_eq!(stage.index(), idx);
        }
    }

    #[test]
    fn only_done_and_error_are_terminal() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }
}

use crate::{AppState, Phase, Stage, BYTES_PER_MB};

pub const NO_RESULT_PLACEHOLDER: &str = "No ESG JSON yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Active,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepView {
    pub stage: Stage,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub index: usize,
    pub name: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub message: String,
    /// Expandable raw detail; `None` when there is nothing to expand.
    pub detail: Option<String>,
}

/// Fully-formed render input derived from [`AppState`] in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub phase: Phase,
    pub stage: Stage,
    pub progress: u8,
    pub steps: Vec<StepView>,
    pub failed: bool,
    pub files: Vec<FileRowView>,
    pub total_size: String,
    pub max_total_mb: u64,
    pub notice: Option<String>,
    pub error: Option<ErrorView>,
    pub can_submit: bool,
    pub result_json: Option<String>,
    pub raw_text: Option<String>,
    /// Processed documents of a finished run; empty otherwise.
    pub sources: Vec<String>,
}

impl AppViewModel {
    pub fn status_line(&self) -> String {
        format!("Status: {}", self.phase.as_str())
    }
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        let run = self.run();
        let phase = run.phase();
        let stage = run.stage();

        let files = self
            .batch()
            .files()
            .iter()
            .enumerate()
            .map(|(index, file)| FileRowView {
                index,
                name: file.name.clone(),
                size: format_mb(file.byte_size),
            })
            .collect();

        let error = run.failure().map(|failure| ErrorView {
            message: failure.message.clone(),
            detail: (!failure.detail.is_empty()).then(|| failure.detail.clone()),
        });

        let result_json = self.results().result().map(|value| {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        });
        let (raw_text, sources) = if phase == Phase::Done {
            let raw_text = self
                .results()
                .raw_text()
                .filter(|text| !text.is_empty())
                .map(ToOwned::to_owned);
            (raw_text, self.results().source_files().to_vec())
        } else {
            (None, Vec::new())
        };

        AppViewModel {
            phase,
            stage,
            progress: run.progress(),
            steps: stepper(phase, stage),
            failed: phase == Phase::Error,
            files,
            total_size: format_mb(self.batch().total_bytes()),
            max_total_mb: self.config().max_total_mb,
            notice: self.notice().map(ToString::to_string),
            error,
            can_submit: !self.batch().is_empty(),
            result_json,
            raw_text,
            sources,
        }
    }
}

/// Every stage is done once the run is done; otherwise stages before the
/// current one are done and the current one is active unless the run failed.
pub fn stepper(phase: Phase, current: Stage) -> Vec<StepView> {
    let current_index = current.index();
    Stage::ALL
        .into_iter()
        .map(|stage| {
            let idx = stage.index();
            let status = if phase == Phase::Done || idx < current_index {
                StepStatus::Done
            } else if idx == current_index && phase != Phase::Error {
                StepStatus::Active
            } else {
                StepStatus::Pending
            };
            StepView { stage, status }
        })
        .collect()
}

pub fn format_mb(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / BYTES_PER_MB as f64)
}

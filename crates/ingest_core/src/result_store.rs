use serde_json::Value;

/// Output of a finished run: the opaque structured result plus the raw text
/// preview the backend extracted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Artifact {
    pub result: Option<Value>,
    pub raw_text: String,
    pub source_files: Vec<String>,
}

/// Holds the last completed artifact.
///
/// Cleared when a new submission starts and when the batch becomes empty, so a
/// previous run's output is never visible while a newer run is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultStore {
    last: Option<Artifact>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.last.as_ref()
    }

    pub fn result(&self) -> Option<&Value> {
        self.last.as_ref().and_then(|artifact| artifact.result.as_ref())
    }

    /// Names of the documents the backend reports it processed.
    pub fn source_files(&self) -> &[String] {
        self.last
            .as_ref()
            .map(|artifact| artifact.source_files.as_slice())
            .unwrap_or_default()
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.last.as_ref().map(|artifact| artifact.raw_text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    pub(crate) fn store(&mut self, artifact: Artifact) {
        self.last = Some(artifact);
    }

    pub(crate) fn clear(&mut self) {
        self.last = None;
    }
}

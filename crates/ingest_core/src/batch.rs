use std::path::PathBuf;

use bytes::Bytes;

use crate::ValidationError;

pub const BYTES_PER_MB: u64 = 1024 * 1024;
pub const DEFAULT_MAX_TOTAL_MB: u64 = 50;

/// Where the engine reads a candidate's content from at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Bytes),
}

/// A document staged for upload. Immutable once added; names may repeat, so
/// removal is always by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub byte_size: u64,
    pub mime_hint: Option<String>,
    pub source: FileSource,
}

impl FileCandidate {
    pub fn in_memory(
        name: impl Into<String>,
        mime_hint: Option<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            byte_size: content.len() as u64,
            mime_hint,
            source: FileSource::Memory(content),
        }
    }

    pub fn on_disk(
        name: impl Into<String>,
        byte_size: u64,
        mime_hint: Option<String>,
        path: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            byte_size,
            mime_hint,
            source: FileSource::Path(path),
        }
    }
}

/// Ordered set of staged files. Only [`UploadValidator::validate`] grows it, so
/// its total never exceeds the configured limit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingBatch {
    files: Vec<FileCandidate>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[FileCandidate] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        sum_bytes(&self.files)
    }

    /// Removes the file at `index`. Out-of-range indices leave the batch as is.
    pub fn remove(&mut self, index: usize) -> Option<FileCandidate> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

/// Enforces the total upload size limit before files enter the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadValidator {
    max_total_mb: u64,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOTAL_MB)
    }
}

impl UploadValidator {
    pub fn new(max_total_mb: u64) -> Self {
        Self { max_total_mb }
    }

    pub fn max_total_mb(&self) -> u64 {
        self.max_total_mb
    }

    /// Returns `existing ++ incoming` when the combined size fits, otherwise
    /// rejects the whole incoming set.
    pub fn validate(
        &self,
        existing: &PendingBatch,
        incoming: Vec<FileCandidate>,
    ) -> Result<PendingBatch, ValidationError> {
        let total = existing.total_bytes().saturating_add(sum_bytes(&incoming));
        if total > self.max_total_mb.saturating_mul(BYTES_PER_MB) {
            return Err(ValidationError::SizeExceeded {
                limit_mb: self.max_total_mb,
                total_bytes: total,
            });
        }

        let mut files = Vec::with_capacity(existing.len() + incoming.len());
        files.extend_from_slice(existing.files());
        files.extend(incoming);
        Ok(PendingBatch { files })
    }
}

fn sum_bytes(files: &[FileCandidate]) -> u64 {
    files
        .iter()
        .fold(0u64, |acc, file| acc.saturating_add(file.byte_size))
}

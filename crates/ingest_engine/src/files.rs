use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ingest_core::FileCandidate;
use thiserror::Error;

/// Document types the backend extracts from.
pub const ACCEPTED_EXTENSIONS: [&str; 8] =
    ["pdf", "docx", "xlsx", "csv", "pptx", "png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unsupported file type {name} (accepted: .pdf .docx .xlsx .csv .pptx .png .jpg .jpeg)")]
    UnsupportedExtension { name: String },
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => return None,
    };
    Some(mime)
}

/// Turns a path into a staged candidate: checks the extension, reads the
/// size, and derives the mime hint. Content is streamed later at upload time.
pub fn probe_file(path: &Path) -> Result<FileCandidate, ProbeError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
        .ok_or_else(|| ProbeError::UnsupportedExtension { name: name.clone() })?;

    let meta = fs::metadata(path).map_err(|source| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(ProbeError::NotAFile(path.to_path_buf()));
    }

    Ok(FileCandidate::on_disk(
        name,
        meta.len(),
        Some(mime.to_string()),
        path.to_path_buf(),
    ))
}

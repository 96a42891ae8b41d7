use std::time::Duration;

use ingest_core::{FileCandidate, FileSource, JobHandle, JobSnapshot, TransportError};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Url};
use tokio_util::io::ReaderStream;

use crate::wire::{decode_accepted, decode_snapshot};

pub const EXTRACT_ASYNC_PATH: &str = "/api/extract";
pub const EXTRACT_SYNC_PATH: &str = "/api/extract_sync";
pub const JOBS_PATH: &str = "/api/jobs";
/// Multipart field carrying each uploaded document.
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            // Synchronous extraction runs the whole pipeline inside one request.
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Backend operations consumed by the orchestrator. Implementations never
/// retry; every failure is reported once as a [`TransportError`].
#[async_trait::async_trait]
pub trait JobClient: Send + Sync {
    async fn submit_sync(&self, files: &[FileCandidate]) -> Result<JobSnapshot, TransportError>;

    async fn submit_async(&self, files: &[FileCandidate]) -> Result<JobHandle, TransportError>;

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobSnapshot, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestJobClient {
    pub fn new(settings: ClientSettings) -> Result<Self, TransportError> {
        let base_url = Url::parse(&settings.base_url).map_err(|err| {
            TransportError::new(format!("invalid backend url: {err}"), settings.base_url.clone())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::new(
                "invalid backend url: cannot be a base",
                settings.base_url,
            ));
        }
        Ok(Self {
            base_url,
            client: build_client(&settings)?,
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }

    fn job_url(&self, handle: &JobHandle) -> Url {
        let mut url = self.endpoint(JOBS_PATH);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(handle.as_str());
        }
        url
    }

    async fn post_batch(&self, path: &str, files: &[FileCandidate]) -> Result<String, TransportError> {
        let url = self.endpoint(path);
        let form = build_form(files).await?;
        ingest_info!("POST {} files={}", url, files.len());
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_success_body(response).await
    }
}

#[async_trait::async_trait]
impl JobClient for ReqwestJobClient {
    async fn submit_sync(&self, files: &[FileCandidate]) -> Result<JobSnapshot, TransportError> {
        let body = self.post_batch(EXTRACT_SYNC_PATH, files).await?;
        decode_snapshot(&body)
    }

    async fn submit_async(&self, files: &[FileCandidate]) -> Result<JobHandle, TransportError> {
        let body = self.post_batch(EXTRACT_ASYNC_PATH, files).await?;
        decode_accepted(&body)
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobSnapshot, TransportError> {
        let url = self.job_url(handle);
        ingest_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = read_success_body(response).await?;
        decode_snapshot(&body)
    }
}

fn build_client(settings: &ClientSettings) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| TransportError::new(err.to_string(), ""))
}

async fn build_form(files: &[FileCandidate]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for file in files {
        form = form.part(FILES_FIELD, build_part(file).await?);
    }
    Ok(form)
}

async fn build_part(file: &FileCandidate) -> Result<Part, TransportError> {
    let body = match &file.source {
        FileSource::Memory(content) => Body::from(content.clone()),
        FileSource::Path(path) => {
            let handle = tokio::fs::File::open(path).await.map_err(|err| {
                TransportError::new(format!("cannot read {}: {err}", path.display()), "")
            })?;
            Body::wrap_stream(ReaderStream::new(handle))
        }
    };
    let part = Part::stream_with_length(body, file.byte_size).file_name(file.name.clone());
    match file.mime_hint.as_deref() {
        Some(mime) => part.mime_str(mime).map_err(map_reqwest_error),
        None => Ok(part),
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, TransportError> {
    let status = response.status();
    let body = response.text().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        ingest_warn!("Backend answered {} body_len={}", status, body.len());
        return Err(TransportError::new(status.to_string(), body));
    }
    Ok(body)
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(format!("timeout: {err}"), "");
    }
    if err.is_connect() {
        return TransportError::new(format!("connection failed: {err}"), "");
    }
    TransportError::new(err.to_string(), "")
}

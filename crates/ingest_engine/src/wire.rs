//! Decoding of backend JSON bodies into core snapshots.

use ingest_core::{JobHandle, JobSnapshot, JobStatus, PipelineError, Stage, TransportError};
use ingest_logging::ingest_warn;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct AcceptedPayload {
    #[serde(default)]
    job_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SnapshotPayload {
    job_id: Option<String>,
    status: Option<String>,
    stage: Option<String>,
    progress: Option<f64>,
    source_files: Option<Vec<String>>,
    raw_text_preview: Option<String>,
    result: Option<Value>,
    error: Option<ErrorPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorPayload {
    message: Option<Value>,
    detail: Option<Value>,
}

/// Decodes the `{job_id}` acknowledgement of an asynchronous submission.
pub fn decode_accepted(body: &str) -> Result<JobHandle, TransportError> {
    let payload: AcceptedPayload = serde_json::from_str(body)
        .map_err(|err| TransportError::new(format!("invalid submit response: {err}"), body))?;
    match payload.job_id {
        Some(id) if !id.trim().is_empty() => Ok(JobHandle::new(id)),
        _ => Err(TransportError::new("submit response carried no job_id", body)),
    }
}

/// Decodes a full job snapshot, as returned by the sync endpoint and by
/// status reads.
pub fn decode_snapshot(body: &str) -> Result<JobSnapshot, TransportError> {
    let payload: SnapshotPayload = serde_json::from_str(body)
        .map_err(|err| TransportError::new(format!("invalid job snapshot: {err}"), body))?;

    let raw_status = payload.status.unwrap_or_default();
    let status = JobStatus::parse(&raw_status).ok_or_else(|| {
        TransportError::new(format!("unknown job status {raw_status:?}"), body)
    })?;

    let stage = payload.stage.as_deref().and_then(|raw| {
        let parsed = Stage::parse(raw);
        if parsed.is_none() {
            ingest_warn!("Ignoring unknown stage {:?}", raw);
        }
        parsed
    });

    let error = payload.error.map(|err| {
        PipelineError::new(
            err.message.map(value_text).unwrap_or_default(),
            err.detail.map(value_text).filter(|detail| !detail.is_empty()),
        )
    });

    Ok(JobSnapshot {
        job_id: payload
            .job_id
            .filter(|id| !id.trim().is_empty())
            .map(JobHandle::new),
        status,
        stage,
        progress: clamp_progress(payload.progress),
        source_files: payload.source_files.unwrap_or_default(),
        raw_text_preview: payload.raw_text_preview,
        result: payload.result.filter(|value| !value.is_null()),
        error,
    })
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn clamp_progress(progress: Option<f64>) -> u8 {
    match progress {
        Some(value) if value.is_finite() => value.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_full_done_snapshot() {
        let body = json!({
            "job_id": "abc",
            "status": "done",
            "stage": "OUTPUT",
            "progress": 100,
            "source_files": ["a.pdf"],
            "raw_text_preview": "text",
            "result": {"k": 1},
            "error": null
        })
        .to_string();

        let snapshot = decode_snapshot(&body).unwrap();
        assert_eq!(
            snapshot,
            JobSnapshot {
                job_id: Some(JobHandle::new("abc")),
                status: JobStatus::Done,
                stage: Some(Stage::Output),
                progress: 100,
                source_files: vec!["a.pdf".to_string()],
                raw_text_preview: Some("text".to_string()),
                result: Some(json!({"k": 1})),
                error: None,
            }
        );
    }

    #[test]
    fn unknown_stage_is_dropped_not_fatal() {
        let snapshot = decode_snapshot(r#"{"status":"running","stage":"OCR"}"#).unwrap();
        assert_eq!(snapshot.status, JobStatus::Running);
        assert_eq!(snapshot.stage, None);
    }

    #[test]
    fn unknown_status_is_a_transport_error_with_body() {
        let body = r#"{"status":"paused"}"#;
        let err = decode_snapshot(body).unwrap_err();
        assert_eq!(err.raw_body, body);
    }

    #[test]
    fn error_detail_may_be_structured() {
        let body = r#"{"status":"error","error":{"message":"bad file","detail":{"page":3}}}"#;
        let snapshot = decode_snapshot(body).unwrap();
        let error = snapshot.error.unwrap();
        assert_eq!(error.message, "bad file");
        assert_eq!(error.detail.as_deref(), Some(r#"{"page":3}"#));
    }

    #[test]
    fn progress_is_rounded_and_clamped() {
        assert_eq!(clamp_progress(Some(12.6)), 13);
        assert_eq!(clamp_progress(Some(250.0)), 100);
        assert_eq!(clamp_progress(Some(-4.0)), 0);
        assert_eq!(clamp_progress(None), 0);
    }

    #[test]
    fn accepted_requires_job_id() {
        assert_eq!(
            decode_accepted(r#"{"job_id":"abc","status":"queued"}"#).unwrap(),
            JobHandle::new("abc")
        );
        assert!(decode_accepted(r#"{"status":"queued"}"#).is_err());
        assert!(decode_accepted("not json").is_err());
    }
}

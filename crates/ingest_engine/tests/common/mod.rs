#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ingest_core::{FileCandidate, JobHandle, JobSnapshot, JobStatus, TransportError};
use ingest_engine::{EngineEvent, EventSink, JobClient};

/// Scripted backend: status reads pop from a queue, falling back to
/// `running` once it is empty.
#[derive(Default)]
pub struct ScriptedClient {
    statuses: Mutex<VecDeque<Result<JobSnapshot, TransportError>>>,
    sync_response: Mutex<Option<Result<JobSnapshot, TransportError>>>,
    accept_as: Mutex<Option<Result<JobHandle, TransportError>>>,
    fetch_delay: Option<Duration>,
    submit_delay: Option<Duration>,
    pub fetch_times: Mutex<Vec<tokio::time::Instant>>,
    pub fetched_handles: Mutex<Vec<JobHandle>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(
        statuses: impl IntoIterator<Item = Result<JobSnapshot, TransportError>>,
    ) -> Self {
        let client = Self::default();
        client.statuses.lock().unwrap().extend(statuses);
        client
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    pub fn accepting(self, result: Result<JobHandle, TransportError>) -> Self {
        *self.accept_as.lock().unwrap() = Some(result);
        self
    }

    pub fn answering_sync(self, result: Result<JobSnapshot, TransportError>) -> Self {
        *self.sync_response.lock().unwrap() = Some(result);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_times.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl JobClient for ScriptedClient {
    async fn submit_sync(&self, _files: &[FileCandidate]) -> Result<JobSnapshot, TransportError> {
        self.sync_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(JobSnapshot::new(JobStatus::Done)))
    }

    async fn submit_async(&self, _files: &[FileCandidate]) -> Result<JobHandle, TransportError> {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        self.accept_as
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(JobHandle::new("job")))
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobSnapshot, TransportError> {
        self.fetch_times
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());
        self.fetched_handles.lock().unwrap().push(handle.clone());
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(JobSnapshot::new(JobStatus::Running)))
    }
}

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

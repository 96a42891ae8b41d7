use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ingest_core::{FileCandidate, JobHandle, PollSchedule, RunId, SubmitMode};
use ingest_logging::{ingest_error, ingest_info, ingest_warn};
use tokio_util::sync::CancellationToken;

use crate::types::{ChannelEventSink, EngineStopped};
use crate::{EngineEvent, EventSink, JobClient, PollScheduler};

enum EngineCommand {
    Submit {
        run_id: RunId,
        mode: SubmitMode,
        files: Vec<FileCandidate>,
    },
    StartPolling {
        run_id: RunId,
        handle: JobHandle,
    },
    Cancel,
}

/// Command side of the engine. Work runs on a dedicated tokio runtime thread;
/// results come back through [`EngineEvents`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Event side of the engine.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Blocks until the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

impl EngineHandle {
    /// Starts the engine thread. Fails when the tokio runtime cannot be built,
    /// so no command is ever accepted without something to run it.
    pub fn new(
        client: Arc<dyn JobClient>,
        schedule: PollSchedule,
    ) -> std::io::Result<(Self, EngineEvents)> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
            let mut worker = Worker {
                client: client.clone(),
                scheduler: PollScheduler::new(client, schedule),
                sink,
                active: None,
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.handle_command(&runtime, command);
            }
            worker.cancel_active();
            ingest_info!("Engine thread stopped");
        });

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    pub fn submit(
        &self,
        run_id: RunId,
        mode: SubmitMode,
        files: Vec<FileCandidate>,
    ) -> Result<(), EngineStopped> {
        self.send(EngineCommand::Submit {
            run_id,
            mode,
            files,
        })
    }

    pub fn start_polling(&self, run_id: RunId, handle: JobHandle) -> Result<(), EngineStopped> {
        self.send(EngineCommand::StartPolling { run_id, handle })
    }

    /// Abandons the in-flight submission or polling loop, if any.
    pub fn cancel(&self) {
        // Nothing is left to cancel once the thread is gone.
        let _ = self.send(EngineCommand::Cancel);
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineStopped> {
        self.cmd_tx.send(command).map_err(|_| {
            ingest_error!("Engine thread is gone; command dropped");
            EngineStopped
        })
    }
}

/// Runtime-thread state. At most one run is active; starting another one
/// cancels its token first.
struct Worker {
    client: Arc<dyn JobClient>,
    scheduler: PollScheduler,
    sink: Arc<dyn EventSink>,
    active: Option<CancellationToken>,
}

impl Worker {
    fn handle_command(&mut self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::Submit {
                run_id,
                mode,
                files,
            } => {
                let cancel = self.replace_active();
                let client = self.client.clone();
                let sink = self.sink.clone();
                runtime.spawn(async move {
                    let event = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            ingest_info!("Submission cancelled run_id={}", run_id);
                            return;
                        }
                        event = submit(client.as_ref(), run_id, mode, &files) => event,
                    };
                    if !cancel.is_cancelled() {
                        sink.emit(event);
                    }
                });
            }
            EngineCommand::StartPolling { run_id, handle } => {
                let cancel = self.replace_active();
                let scheduler = self.scheduler.clone();
                let sink = self.sink.clone();
                runtime.spawn(async move {
                    scheduler.run(run_id, handle, sink.as_ref(), cancel).await;
                });
            }
            EngineCommand::Cancel => self.cancel_active(),
        }
    }

    fn replace_active(&mut self) -> CancellationToken {
        self.cancel_active();
        let token = CancellationToken::new();
        self.active = Some(token.clone());
        token
    }

    fn cancel_active(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}

/// Performs one submission. Failures are reported, never retried.
pub async fn submit(
    client: &dyn JobClient,
    run_id: RunId,
    mode: SubmitMode,
    files: &[FileCandidate],
) -> EngineEvent {
    ingest_info!(
        "Submitting run_id={} mode={:?} files={}",
        run_id,
        mode,
        files.len()
    );
    let outcome = match mode {
        SubmitMode::Sync => client
            .submit_sync(files)
            .await
            .map(|snapshot| EngineEvent::SyncCompleted { run_id, snapshot }),
        SubmitMode::Async => client
            .submit_async(files)
            .await
            .map(|handle| EngineEvent::Accepted { run_id, handle }),
    };
    outcome.unwrap_or_else(|error| {
        ingest_warn!("Submission failed run_id={}: {}", run_id, error);
        EngineEvent::SubmitFailed { run_id, error }
    })
}

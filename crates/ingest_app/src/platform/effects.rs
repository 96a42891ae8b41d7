use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use ingest_core::{Effect, Msg, RunId, TransportError};
use ingest_engine::{EngineEvent, EngineEvents, EngineHandle, EngineStopped, ReqwestJobClient};
use ingest_logging::{ingest_info, ingest_warn};

use super::app::AppEvent;
use super::config::ClientConfig;

/// Executes core effects against the engine and feeds engine events back
/// into the app loop as [`Msg`]s.
pub struct EffectRunner {
    engine: EngineHandle,
    app_tx: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(config: &ClientConfig, app_tx: mpsc::Sender<AppEvent>) -> anyhow::Result<Self> {
        let client = ReqwestJobClient::new(config.client_settings())?;
        let (engine, events) = EngineHandle::new(Arc::new(client), config.poll)?;
        spawn_event_loop(events, app_tx.clone());
        Ok(Self { engine, app_tx })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Submit {
                    run_id,
                    mode,
                    files,
                } => {
                    ingest_info!(
                        "Submit run_id={} mode={:?} files={}",
                        run_id,
                        mode,
                        files.len()
                    );
                    if let Err(err) = self.engine.submit(run_id, mode, files) {
                        self.report(rejected_submit(run_id, err));
                    }
                }
                Effect::StartPolling { run_id, handle } => {
                    ingest_info!("StartPolling run_id={} job_id={}", run_id, handle);
                    if let Err(err) = self.engine.start_polling(run_id, handle.clone()) {
                        self.report(Msg::StatusFetchFailed {
                            run_id,
                            handle,
                            error: TransportError::new(err.to_string(), ""),
                        });
                    }
                }
                Effect::CancelPolling => self.engine.cancel(),
            }
        }
    }

    /// Queues a failure behind the current message so the run leaves its
    /// in-flight phase.
    fn report(&self, msg: Msg) {
        let _ = self.app_tx.send(AppEvent::Core(msg));
    }
}

fn rejected_submit(run_id: RunId, err: EngineStopped) -> Msg {
    ingest_warn!("Run {} could not be submitted: {}", run_id, err);
    Msg::SubmitFailed {
        run_id,
        error: TransportError::new(err.to_string(), ""),
    }
}

fn spawn_event_loop(events: EngineEvents, app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if app_tx.send(AppEvent::Core(to_msg(event))).is_err() {
                break;
            }
        }
    });
}

fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Accepted { run_id, handle } => Msg::AsyncAccepted { run_id, handle },
        EngineEvent::SyncCompleted { run_id, snapshot } => Msg::SyncResponded { run_id, snapshot },
        EngineEvent::SubmitFailed { run_id, error } => {
            ingest_warn!("Run {} submission failed: {}", run_id, error);
            Msg::SubmitFailed { run_id, error }
        }
        EngineEvent::Snapshot {
            run_id,
            handle,
            snapshot,
        } => Msg::StatusFetched {
            run_id,
            handle,
            snapshot,
        },
        EngineEvent::PollFailed {
            run_id,
            handle,
            error,
        } => {
            ingest_warn!("Run {} status read for {} failed: {}", run_id, handle, error);
            Msg::StatusFetchFailed {
                run_id,
                handle,
                error,
            }
        }
    }
}

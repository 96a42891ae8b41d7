use ingest_logging::ingest_debug;

use crate::{
    AppState, Artifact, Effect, JobHandle, JobSnapshot, JobStatus, Msg, PipelineError,
    RunFailure, RunId, RunState, Stage,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesAdded(incoming) => {
            if incoming.is_empty() {
                return (state, Vec::new());
            }
            state.add_files(incoming);
            Vec::new()
        }
        Msg::FileRemoved { index } => {
            if state.remove_file(index) {
                reset_after_empty_batch(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::BatchCleared => {
            if state.batch().is_empty() && state.run() == &RunState::Idle {
                return (state, Vec::new());
            }
            state.clear_batch();
            reset_after_empty_batch(&mut state)
        }
        Msg::SubmitClicked => {
            if state.batch().is_empty() {
                return (state, Vec::new());
            }
            let superseding = state.run().is_in_flight();
            let run_id = state.begin_run();
            let mut effects = Vec::with_capacity(2);
            if superseding {
                effects.push(Effect::CancelPolling);
            }
            effects.push(Effect::Submit {
                run_id,
                mode: state.config().mode,
                files: state.batch().files().to_vec(),
            });
            effects
        }
        Msg::AsyncAccepted { run_id, handle } => {
            if !is_uploading(&state, run_id) {
                ingest_debug!("Dropping stale acceptance run_id={} job={}", run_id, handle);
                return (state, Vec::new());
            }
            state.set_run(RunState::Processing {
                run_id,
                handle: handle.clone(),
                stage: Stage::Extract,
                progress: 0,
            });
            vec![Effect::StartPolling { run_id, handle }]
        }
        Msg::SyncResponded { run_id, snapshot } => {
            if !is_uploading(&state, run_id) {
                ingest_debug!("Dropping stale sync response run_id={}", run_id);
                return (state, Vec::new());
            }
            apply_sync_snapshot(&mut state, run_id, snapshot)
        }
        Msg::SubmitFailed { run_id, error } => {
            if !is_uploading(&state, run_id) {
                ingest_debug!("Dropping stale submit failure run_id={}", run_id);
                return (state, Vec::new());
            }
            state.set_run(RunState::Error {
                run_id,
                stage: Stage::Upload,
                failure: RunFailure::upload(error),
            });
            Vec::new()
        }
        Msg::StatusFetched {
            run_id,
            handle,
            snapshot,
        } => {
            let Some(stage) = processing_stage(&state, run_id, &handle) else {
                ingest_debug!("Dropping stale status run_id={} job={}", run_id, handle);
                return (state, Vec::new());
            };
            apply_polled_snapshot(&mut state, run_id, handle, stage, snapshot);
            Vec::new()
        }
        Msg::StatusFetchFailed {
            run_id,
            handle,
            error,
        } => {
            let Some(stage) = processing_stage(&state, run_id, &handle) else {
                ingest_debug!("Dropping stale fetch failure run_id={} job={}", run_id, handle);
                return (state, Vec::new());
            };
            state.set_run(RunState::Error {
                run_id,
                stage,
                failure: RunFailure::status_fetch(error),
            });
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn reset_after_empty_batch(state: &mut AppState) -> Vec<Effect> {
    let was_in_flight = state.run().is_in_flight();
    state.reset_run();
    if was_in_flight {
        vec![Effect::CancelPolling]
    } else {
        Vec::new()
    }
}

fn is_uploading(state: &AppState, run_id: RunId) -> bool {
    matches!(state.run(), RunState::Uploading { run_id: active } if *active == run_id)
}

/// Current stage when `(run_id, handle)` is the run being polled.
fn processing_stage(state: &AppState, run_id: RunId, handle: &JobHandle) -> Option<Stage> {
    match state.run() {
        RunState::Processing {
            run_id: active_run,
            handle: active_handle,
            stage,
            ..
        } if *active_run == run_id && active_handle == handle => Some(*stage),
        _ => None,
    }
}

fn apply_sync_snapshot(state: &mut AppState, run_id: RunId, snapshot: JobSnapshot) -> Vec<Effect> {
    match snapshot.status {
        JobStatus::Done | JobStatus::Error => {
            let stage = snapshot.stage.unwrap_or(Stage::Output);
            apply_terminal(state, run_id, stage, snapshot);
            Vec::new()
        }
        JobStatus::Queued | JobStatus::Running => match snapshot.job_id.clone() {
            Some(handle) => {
                state.set_run(RunState::Processing {
                    run_id,
                    handle: handle.clone(),
                    stage: snapshot.stage.unwrap_or(Stage::Output),
                    progress: snapshot.progress,
                });
                vec![Effect::StartPolling { run_id, handle }]
            }
            None => {
                let error = PipelineError::new(
                    "Pipeline error.",
                    Some("Synchronous response was not final and carried no job id.".into()),
                );
                state.set_run(RunState::Error {
                    run_id,
                    stage: snapshot.stage.unwrap_or(Stage::Output),
                    failure: RunFailure::pipeline(Some(error)),
                });
                Vec::new()
            }
        },
    }
}

fn apply_polled_snapshot(
    state: &mut AppState,
    run_id: RunId,
    handle: JobHandle,
    current_stage: Stage,
    snapshot: JobSnapshot,
) {
    let stage = snapshot.stage.unwrap_or(current_stage);
    if snapshot.status.is_terminal() {
        apply_terminal(state, run_id, stage, snapshot);
    } else {
        state.set_run(RunState::Processing {
            run_id,
            handle,
            stage,
            progress: snapshot.progress,
        });
    }
}

fn apply_terminal(state: &mut AppState, run_id: RunId, stage: Stage, snapshot: JobSnapshot) {
    if snapshot.status == JobStatus::Error {
        state.set_run(RunState::Error {
            run_id,
            stage,
            failure: RunFailure::pipeline(snapshot.error),
        });
        return;
    }
    state.store_artifact(Artifact {
        result: snapshot.result,
        raw_text: snapshot.raw_text_preview.unwrap_or_default(),
        source_files: snapshot.source_files,
    });
    state.set_run(RunState::Done { run_id, stage });
}

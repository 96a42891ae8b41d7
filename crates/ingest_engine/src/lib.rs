//! Ingest engine: backend client, status polling and effect execution.
mod client;
mod engine;
mod files;
mod poll;
mod types;
mod wire;

pub use client::{
    ClientSettings, JobClient, ReqwestJobClient, EXTRACT_ASYNC_PATH, EXTRACT_SYNC_PATH,
    FILES_FIELD, JOBS_PATH,
};
pub use engine::{submit, EngineEvents, EngineHandle};
pub use files::{mime_for_extension, probe_file, ProbeError, ACCEPTED_EXTENSIONS};
pub use poll::{PollOutcome, PollScheduler};
pub use types::{ChannelEventSink, EngineEvent, EngineStopped, EventSink};
pub use wire::{decode_accepted, decode_snapshot};

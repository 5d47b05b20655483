//! Application layer: the pipeline orchestrator and its request/response types

pub mod dto;
pub mod error;
pub mod pipeline;

pub use dto::{ErrorBody, ScrapeRequest, ScrapeResponse};
pub use error::{ErrorKind, ScrapeError};
pub use pipeline::{ContractProgress, Pipeline, PipelineOutput, ProgressObserver, RunState};

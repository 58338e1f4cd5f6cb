use crate::ServiceError;
use inkdeck_core::{BuildError, ReplyError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("turn {turn}: malformed reply: {error}")]
    MalformedReply { turn: u32, error: ReplyError },
    #[error("turn {turn}: generation failed: {error}")]
    Generation { turn: u32, error: ServiceError },
    #[error("stopped after {turns} turns with {total} of {target} cards")]
    IterationLimit { turns: u32, total: u32, target: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("could not embed the request: {0}")]
    Embedding(ServiceError),
    #[error("iterative build needs a text generator")]
    GeneratorRequired,
    #[error(transparent)]
    Agent(#[from] AgentError),
}

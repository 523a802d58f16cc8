//! Error types surfaced by the runtime API.

use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinError;

use appraiser_core::{
    AppraisalError, ArtifactId, BuildId, ErrorSeverity, TableError, ValuationError,
};

use crate::cache::CacheError;

/// Result type returned by runtime APIs.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors surfaced by the runtime API.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("valuation worker command channel closed")]
    CommandChannelClosed,

    #[error("valuation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("failed to join valuation worker task")]
    WorkerJoin(#[source] JoinError),

    #[error("trial chunk for {artifact} / {build} did not complete")]
    ChunkJoin {
        artifact: ArtifactId,
        build: BuildId,
        #[source]
        source: JoinError,
    },

    #[error("build {build} equips unknown {artifact}")]
    UnknownArtifact { build: BuildId, artifact: ArtifactId },

    #[error("runtime is missing {0}")]
    MissingComponent(&'static str),

    #[error("failed to load content: {0}")]
    Content(String),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<TableError> for RuntimeError {
    fn from(err: TableError) -> Self {
        RuntimeError::Valuation(ValuationError::Table(err))
    }
}

impl AppraisalError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_)
            | RuntimeError::ChunkJoin { .. } => ErrorSeverity::Fatal,
            RuntimeError::UnknownArtifact { .. } => ErrorSeverity::Validation,
            RuntimeError::MissingComponent(_) | RuntimeError::Content(_) => ErrorSeverity::Fatal,
            RuntimeError::Valuation(err) => err.severity(),
            RuntimeError::Cache(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::ChunkJoin { .. } => "RUNTIME_CHUNK_JOIN",
            RuntimeError::UnknownArtifact { .. } => "RUNTIME_UNKNOWN_ARTIFACT",
            RuntimeError::MissingComponent(_) => "RUNTIME_MISSING_COMPONENT",
            RuntimeError::Content(_) => "RUNTIME_CONTENT",
            RuntimeError::Valuation(err) => err.error_code(),
            RuntimeError::Cache(_) => "RUNTIME_CACHE",
        }
    }
}

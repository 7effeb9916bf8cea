//! Error taxonomy for the palate crate.
//!
//! Three families, matching the three ways this system can go wrong:
//!
//! - [`LoadError`]: the catalog file is unreadable or malformed. Fatal at
//!   startup; nothing downstream runs without a valid catalog.
//! - [`CollaboratorError`]: a chat completion call failed. Always recovered
//!   locally: mood classification degrades to "no mood", reply generation
//!   degrades to a fixed apology. The session decides the degrade policy, not
//!   the collaborator.
//! - [`EncodeError`]: the embedding model failed or produced a vector whose
//!   dimensionality doesn't match the catalog's.

/// Failure while loading the catalog file. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog has {vectors} vectors but {metadata} metadata entries")]
    CountMismatch { vectors: usize, metadata: usize },
    #[error("catalog vector {index} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Failure of the chat completion collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("chat completion request failed: {0}")]
    Api(#[from] async_openai::error::OpenAIError),
    #[error("chat completion returned no content")]
    EmptyResponse,
}

/// Failure of the text-to-vector encoder.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("embedding inference failed: {0}")]
    Inference(String),
    #[error("query embedding has dimension {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

//! Error taxonomy for the debate engine.
//!
//! Remote-call failures never escape the fan-out layer: they are retried
//! locally, then absorbed into an absent response. Only local failures
//! (configuration, session bookkeeping, storage) and cancellation reach the
//! caller of [`crate::DebateOrchestrator::run`].
//!
//! | Error              | Raised by            | Reaches caller |
//! |--------------------|----------------------|----------------|
//! | `AttemptError`     | one transport call   | no (retried)   |
//! | `BackendError`     | `BackendClient`      | no (dropped by fan-out) |
//! | `ConfigError`      | registries / loader  | yes            |
//! | `SessionError`     | `DebateSession`      | yes            |
//! | `StorageError`     | `SessionStore`       | yes            |
//! | `Cancelled`        | fan-out / orchestrator | yes          |

use std::time::Duration;

use thiserror::Error;

/// Failure of a single request attempt against a remote backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptError {
    /// The end-to-end timeout elapsed before a full reply arrived.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The reply body was not JSON at all.
    #[error("malformed reply body: {0}")]
    MalformedBody(String),
}

/// Failure of one logical "ask a backend" operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend key is not present in the registry.
    #[error("backend '{0}' is not configured")]
    NotFound(String),

    /// Every attempt failed.
    #[error("backend '{backend}' unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable {
        backend: String,
        attempts: u32,
        last_error: String,
    },
}

/// Configuration lookup and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("backend '{0}' not found in configuration")]
    BackendNotFound(String),

    #[error("debate mode '{0}' not found in configuration")]
    ModeNotFound(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Violations of the session aggregate's invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} is already complete")]
    AlreadyComplete(String),

    #[error("round {got} does not follow round {last}")]
    RoundOutOfOrder { last: u32, got: u32 },
}

/// Durable storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {0} already exists")]
    AlreadyExists(String),

    #[error("session {0} is not complete and cannot be persisted")]
    Incomplete(String),

    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error("integrity check failed for {path}: {reason}")]
    Integrity { path: String, reason: String },
}

/// Umbrella error returned by the orchestrator and the CLI-facing API.
#[derive(Debug, Error)]
pub enum ConclaveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("debate cancelled")]
    Cancelled,
}

pub type ConclaveResult<T> = Result<T, ConclaveError>;

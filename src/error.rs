//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return the typed [`OpError`] taxonomy; the installer
//! funnels every operation failure into the operation log and, when the
//! critical-stop policy is enabled, converts it into a [`CriticalStop`]
//! returned to the top-level caller. Caller-supplied transform closures
//! use [`anyhow::Error`] at the boundary and surface here as
//! [`OpError::Transform`].

use thiserror::Error;

/// Failure raised by a single provisioning operation.
///
/// Display output is the bare failure cause: the operation log embeds it
/// verbatim in its `failed, cause <msg> !` terminator lines, so variants
/// carry the full human-readable message rather than a prefixed one.
#[derive(Debug, Error)]
pub enum OpError {
    /// A file, directory, or manifest entry that must exist is missing.
    #[error("{0}")]
    NotFound(String),

    /// A path exists but has the wrong kind for the requested operation.
    #[error("{0}")]
    Conflict(String),

    /// The vendor manifest could not be parsed into a usable mapping.
    #[error("{0}")]
    Corrupt(String),

    /// An operation was invoked before its prerequisite setup, or with
    /// unusable arguments.
    #[error("{0}")]
    Configuration(String),

    /// A caller-supplied content transform reported an error.
    #[error("{0}")]
    Transform(String),

    /// An underlying filesystem call failed.
    #[error("io error on `{path}`: {source}")]
    Io {
        /// Path the failed call operated on.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl OpError {
    /// Wrap an I/O error together with the path it occurred on.
    #[must_use]
    pub fn io(path: &str, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }
}

/// Terminal abort signal: an operation failed while the critical-stop
/// policy was enabled, so the remainder of the provisioning run must not
/// execute.
///
/// By the time this value is returned the run log has already received
/// both the `failed, cause <msg> !` line and the `CRITICAL STOP` block.
/// The top-level caller is expected to treat it as "installation did not
/// complete".
#[derive(Debug, Error)]
#[error("critical stop: {cause}")]
pub struct CriticalStop {
    #[source]
    cause: OpError,
}

impl CriticalStop {
    pub(crate) const fn new(cause: OpError) -> Self {
        Self { cause }
    }

    /// The operation failure that triggered the abort.
    #[must_use]
    pub const fn cause(&self) -> &OpError {
        &self.cause
    }
}

//! Top-level error type and severity classification.

use core::fmt;
use std::path::PathBuf;

use crate::{FAILURE_SENTINEL, KernelError, ValidationError};

/// Top-level error type for LITMUS^RT operations.
#[derive(Debug, thiserror::Error)]
pub enum LitmusError {
    /// Rejected input or lookup miss
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A kernel collaborator call failed
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// The namespace path naming a lock object could not be opened
    #[error("Cannot open lock namespace {}: {source}", .path.display())]
    Namespace {
        /// The namespace path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Runtime initialization failed in at least one step
    #[error("{}", describe_initialization(.memory_lock.as_ref(), .handshake.as_ref()))]
    Initialization {
        /// Memory locking failure, if any
        memory_lock: Option<KernelError>,
        /// Kernel interface handshake failure, if any
        handshake: Option<KernelError>,
    },
}

fn describe_initialization(
    memory_lock: Option<&KernelError>,
    handshake: Option<&KernelError>,
) -> String {
    match (memory_lock, handshake) {
        (Some(m), Some(h)) => format!("Runtime initialization failed: {m}; {h}"),
        (Some(e), None) | (None, Some(e)) => format!("Runtime initialization failed: {e}"),
        (None, None) => "Runtime initialization failed".to_string(),
    }
}

impl LitmusError {
    /// Integer result code for this error.
    ///
    /// Kernel failures keep the collaborator's code. Everything else maps to
    /// [`FAILURE_SENTINEL`].
    pub fn code(&self) -> i32 {
        match self {
            LitmusError::Kernel(e) => e.code(),
            LitmusError::Validation(_)
            | LitmusError::Namespace { .. }
            | LitmusError::Initialization { .. } => FAILURE_SENTINEL,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LitmusError::Validation(e) => e.severity(),
            LitmusError::Kernel(e) => e.severity(),
            LitmusError::Namespace { .. } => ErrorSeverity::Error,
            LitmusError::Initialization { .. } => ErrorSeverity::Critical,
        }
    }

    /// The kernel error behind this error, if any.
    pub fn kernel_error(&self) -> Option<KernelError> {
        match self {
            LitmusError::Kernel(e) => Some(*e),
            _ => None,
        }
    }

    /// Create a namespace error.
    pub fn namespace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LitmusError::Namespace {
            path: path.into(),
            source,
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the thread cannot take part in real-time scheduling
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

//! Errors raised by kernel collaborator calls.
//!
//! A [`KernelError`] is `Copy` and allocation-free: it records which call
//! failed and the raw result code the kernel returned.

use core::fmt;

use crate::common::ErrorSeverity;

/// The kernel collaborator call that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KernelOp {
    /// Locking process pages into physical memory
    MemoryLock = 1,
    /// Kernel <-> user space interface initialization
    Handshake = 2,
    /// Submitting real-time parameters for a thread
    SetTaskParams = 3,
    /// Opening an object descriptor
    ObjectOpen = 4,
    /// Closing an object descriptor
    ObjectClose = 5,
    /// Acquiring a protocol lock
    Lock = 6,
    /// Releasing a protocol lock
    Unlock = 7,
    /// Resolving the first CPU of a cluster
    ClusterMapping = 8,
    /// Migrating the calling thread to a cluster
    Migration = 9,
    /// Querying the calling thread's identifier
    ThreadId = 10,
}

impl KernelOp {
    /// Human-readable description of the call.
    pub fn describe(self) -> &'static str {
        match self {
            KernelOp::MemoryLock => "mlockall()",
            KernelOp::Handshake => "kernel <-> user space interface initialization",
            KernelOp::SetTaskParams => "set_rt_task_param()",
            KernelOp::ObjectOpen => "od_open()",
            KernelOp::ObjectClose => "od_close()",
            KernelOp::Lock => "litmus_lock()",
            KernelOp::Unlock => "litmus_unlock()",
            KernelOp::ClusterMapping => "cluster to first CPU mapping",
            KernelOp::Migration => "migrate to cluster",
            KernelOp::ThreadId => "gettid()",
        }
    }
}

impl fmt::Display for KernelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A failed kernel collaborator call.
///
/// `code` is the value the collaborator returned. The Linux backend reports
/// negated `errno` values, so `-22` means `EINVAL`.
///
/// # Examples
///
/// ```
/// use litmus_errors::{KernelError, KernelOp, ErrorSeverity};
///
/// let err = KernelError::new(KernelOp::Migration, -1);
/// assert_eq!(err.code(), -1);
/// assert_eq!(err.errno(), 1);
/// assert_eq!(err.severity(), ErrorSeverity::Warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{op} failed with code {code}")]
pub struct KernelError {
    /// The call that failed
    pub op: KernelOp,
    /// Raw result code, always negative
    pub code: i32,
}

impl KernelError {
    /// Create an error from a raw result code.
    ///
    /// Non-negative codes are not failures; they are folded to `-1` so the
    /// stored code keeps its sign invariant.
    pub fn new(op: KernelOp, code: i32) -> Self {
        let code = if code < 0 { code } else { crate::FAILURE_SENTINEL };
        Self { op, code }
    }

    /// Create an error from a positive `errno` value.
    pub fn from_errno(op: KernelOp, errno: i32) -> Self {
        Self::new(op, errno.checked_neg().unwrap_or(i32::MIN))
    }

    /// Create an error from the calling thread's last OS error.
    pub fn last_os_error(op: KernelOp) -> Self {
        let errno = std::io::Error::last_os_error()
            .raw_os_error()
            .unwrap_or(1);
        Self::from_errno(op, errno)
    }

    /// The raw result code, unchanged.
    pub fn code(self) -> i32 {
        self.code
    }

    /// The positive `errno` equivalent of the code.
    pub fn errno(self) -> i32 {
        self.code.checked_neg().unwrap_or(i32::MAX)
    }

    /// Convert into an `io::Error` carrying the same `errno`.
    pub fn to_io_error(self) -> std::io::Error {
        std::io::Error::from_raw_os_error(self.errno())
    }

    /// Get the error severity.
    ///
    /// Only best-effort steps (cluster migration) are warnings.
    pub fn severity(self) -> ErrorSeverity {
        match self.op {
            KernelOp::Migration => ErrorSeverity::Warning,
            KernelOp::MemoryLock | KernelOp::Handshake => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

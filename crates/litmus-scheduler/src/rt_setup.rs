//! Real-time setup configuration.

use litmus_kernel::MemoryLockFlags;
use serde::{Deserialize, Serialize};

/// Process-level setup applied by [`LitmusRuntime::initialize`].
///
/// [`LitmusRuntime::initialize`]: crate::LitmusRuntime::initialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RTSetup {
    /// Enable memory locking (prevent paging).
    ///
    /// Paging a real-time task's memory back in costs unbounded time, so
    /// this is on by default.
    pub lock_memory: bool,

    /// Also lock pages mapped after initialization (`MCL_FUTURE`).
    pub lock_future_pages: bool,
}

impl Default for RTSetup {
    fn default() -> Self {
        Self {
            lock_memory: true,
            lock_future_pages: true,
        }
    }
}

impl RTSetup {
    /// Create a new RTSetup with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// No memory locking; only the kernel handshake runs.
    pub fn minimal() -> Self {
        Self {
            lock_memory: false,
            lock_future_pages: false,
        }
    }

    /// Lock current pages only, so test allocations stay pageable.
    pub fn testing() -> Self {
        Self {
            lock_memory: true,
            lock_future_pages: false,
        }
    }

    /// Set memory locking.
    #[must_use]
    pub fn with_lock_memory(mut self, enabled: bool) -> Self {
        self.lock_memory = enabled;
        self
    }

    /// Set locking of future pages.
    #[must_use]
    pub fn with_lock_future_pages(mut self, enabled: bool) -> Self {
        self.lock_future_pages = enabled;
        self
    }

    /// Flags for `mlockall`, or `None` when memory locking is off.
    pub fn memory_lock_flags(&self) -> Option<MemoryLockFlags> {
        self.lock_memory.then_some(MemoryLockFlags {
            current: true,
            future: self.lock_future_pages,
        })
    }
}

//! Namespace opener that counts live handles.
//!
//! [`CountingNamespace`] opens real files through
//! [`FsNamespace`](litmus_locking::FsNamespace) and tracks how many handles
//! are still open, so tests can prove acquisition never leaks one.

use std::fs::File;
use std::io;
use std::os::fd::{AsFd, BorrowedFd};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use litmus_locking::{FsNamespace, NamespaceOpener};

#[derive(Debug, Default)]
struct Counters {
    attempts: AtomicUsize,
    opened: AtomicUsize,
    live: AtomicUsize,
}

/// A [`NamespaceOpener`] that counts attempts, successes and live handles.
#[derive(Debug, Clone, Default)]
pub struct CountingNamespace {
    inner: FsNamespace,
    counters: Arc<Counters>,
}

impl CountingNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls to `open_namespace`, successful or not.
    pub fn attempts(&self) -> usize {
        self.counters.attempts.load(Ordering::SeqCst)
    }

    /// Successful opens.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Handles opened and not yet dropped.
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }
}

/// A namespace file whose drop is counted.
#[derive(Debug)]
pub struct CountedHandle {
    file: File,
    counters: Arc<Counters>,
}

impl AsFd for CountedHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl Drop for CountedHandle {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl NamespaceOpener for CountingNamespace {
    type Handle = CountedHandle;

    fn open_namespace(&self, path: &Path) -> io::Result<CountedHandle> {
        self.counters.attempts.fetch_add(1, Ordering::SeqCst);
        let file = self.inner.open_namespace(path)?;
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        Ok(CountedHandle {
            file,
            counters: Arc::clone(&self.counters),
        })
    }
}

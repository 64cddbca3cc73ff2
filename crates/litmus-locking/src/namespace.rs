//! Namespace files.
//!
//! The kernel names a lock object by an open file plus a lock id. The file
//! is only a name: it is opened for the duration of an acquisition call and
//! released before the call returns.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Permission bits for namespace files created on demand (owner read/write).
pub const NAMESPACE_MODE: u32 = 0o600;

/// Opens namespace resources.
pub trait NamespaceOpener {
    /// Open handle; dropping it releases the resource.
    type Handle: AsFd;

    /// Open `path` read/write, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn open_namespace(&self, path: &Path) -> io::Result<Self::Handle>;
}

impl<N: NamespaceOpener + ?Sized> NamespaceOpener for &N {
    type Handle = N::Handle;

    fn open_namespace(&self, path: &Path) -> io::Result<Self::Handle> {
        (**self).open_namespace(path)
    }
}

/// Opens namespace files on the local filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsNamespace {
    mode: u32,
}

impl FsNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `mode` for files created on demand.
    pub fn with_mode(mode: u32) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }
}

impl Default for FsNamespace {
    fn default() -> Self {
        Self::with_mode(NAMESPACE_MODE)
    }
}

impl NamespaceOpener for FsNamespace {
    type Handle = File;

    fn open_namespace(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(self.mode)
            .open(path)
    }
}

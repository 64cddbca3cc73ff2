//! Prelude module for lock acquisition.

pub use crate::lock::{LockGuard, LockHandle, open_lock, open_lock_by_id, open_lock_by_name};
pub use crate::namespace::{FsNamespace, NamespaceOpener};

//! LITMUS^RT lock objects.
//!
//! A real-time lock lives in the kernel and is named by a namespace file plus
//! a numeric lock id. Its type is one of the registered locking protocols
//! ([`LockProtocol`](litmus_types::LockProtocol)).
//!
//! ```no_run
//! use litmus_kernel::PlatformKernel;
//! use litmus_locking::prelude::*;
//! use litmus_types::{LockProtocol, ProtocolConfig};
//!
//! # fn main() -> Result<(), litmus_errors::LitmusError> {
//! let kernel = PlatformKernel::new();
//! let handle = LockHandle::open(
//!     &kernel,
//!     &FsNamespace::new(),
//!     LockProtocol::Fmlp,
//!     0,
//!     "semaphores",
//!     ProtocolConfig::None,
//! )?;
//!
//! let guard = handle.lock()?;
//! // critical section
//! guard.unlock()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod lock;
pub mod namespace;
pub mod prelude;

pub use lock::{LockGuard, LockHandle, open_lock, open_lock_by_id, open_lock_by_name};
pub use namespace::{FsNamespace, NAMESPACE_MODE, NamespaceOpener};

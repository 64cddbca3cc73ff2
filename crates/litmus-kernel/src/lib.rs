//! Kernel collaborator interface for LITMUS^RT.
//!
//! The userspace core never issues system calls directly. It talks to the
//! kernel through the traits in [`interface`], so tests can substitute a
//! recording double and production code uses [`PlatformKernel`].
//!
//! - [`SchedulerInterface`]: per-thread handshake and parameter submission
//! - [`MemoryLocking`]: pinning process pages in physical memory
//! - [`CpuTopology`]: cluster to CPU mapping and cluster migration
//! - [`ObjectDescriptors`]: kernel lock objects
//!
//! # Platform Support
//!
//! - **Linux**: `libc` system calls, `mlockall`, a per-thread mapping of the
//!   LITMUS^RT control device, `sched_setaffinity`
//! - **Other Unix**: every call fails with `ENOSYS`

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod config;
pub mod interface;
pub mod prelude;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
mod fallback;

pub use config::{KernelConfig, SyscallTable};
pub use interface::{
    CpuTopology, Kernel, MemoryLockFlags, MemoryLocking, ObjectDescriptor, ObjectDescriptors,
    SchedulerInterface, Tid, cluster_cpus,
};

#[cfg(target_os = "linux")]
pub use linux::PlatformKernel;

#[cfg(not(target_os = "linux"))]
pub use fallback::PlatformKernel;

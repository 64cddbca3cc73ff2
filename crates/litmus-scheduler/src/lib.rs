//! Sporadic task configuration and runtime lifecycle for LITMUS^RT.
//!
//! - **LitmusRuntime**: memory locking and per-thread kernel handshake,
//!   idempotent and queryable
//! - **SporadicTask**: implicit-deadline task description in milliseconds or
//!   nanoseconds, placed on a CPU cluster
//! - **RTSetup**: runtime setup, loadable with serde
//!
//! All calls are synchronous and run on the calling thread. Kernel access
//! goes through the [`litmus_kernel::Kernel`] traits, so any backend (the
//! platform one or a test double) can be plugged in.
//!
//! # Example
//!
//! ```no_run
//! use litmus_scheduler::prelude::*;
//!
//! # fn main() -> Result<(), litmus_errors::LitmusError> {
//! let runtime = LitmusRuntime::platform(RTSetup::default());
//! runtime.initialize()?;
//!
//! let task = SporadicTask::ms(10, 100, 0)?.with_priority(5);
//! let report = runtime.sporadic_task(&task)?;
//! assert_eq!(report.code(), 0);
//!
//! runtime.teardown();
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod prelude;
pub mod rt_setup;
pub mod runtime;
pub mod sporadic;

pub use rt_setup::RTSetup;
pub use runtime::LitmusRuntime;
pub use sporadic::{
    SporadicTask, SubmissionReport, sporadic_task, sporadic_task_ms, sporadic_task_ns,
};

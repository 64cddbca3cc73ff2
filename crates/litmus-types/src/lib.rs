//! Real-time task parameters and locking-protocol registry.
//!
//! This crate holds the data model shared by the rest of the workspace. It
//! performs no I/O and has no global mutable state.
//!
//! - [`RtTask`]: the parameter block submitted to the scheduler, with the
//!   defaults every descriptor starts from
//! - [`TaskClass`], [`BudgetPolicy`], [`ReleasePolicy`]: task classification
//! - [`LockProtocol`]: the fixed registry of kernel locking protocols
//!
//! # Example
//!
//! ```
//! use litmus_types::prelude::*;
//!
//! let task = RtTask::builder()
//!     .exec_cost(10 * NS_PER_MS)
//!     .period(100 * NS_PER_MS)
//!     .class(TaskClass::from_label("hrt").expect("known label"))
//!     .build()
//!     .expect("valid parameters");
//!
//! assert_eq!(task.effective_deadline(), 100 * NS_PER_MS);
//! assert_eq!(LockProtocol::for_name("MPCP-VS"), Some(LockProtocol::MpcpVs));
//! assert_eq!(name_for_protocol_id(42), UNKNOWN_PROTOCOL_NAME);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod prelude;
pub mod protocol;
pub mod task;

pub use protocol::{
    LockProtocol, ProtocolConfig, UNKNOWN_PROTOCOL_NAME, name_for_protocol_id,
    protocol_id_for_name, registered_names,
};
pub use task::{
    BudgetPolicy, LITMUS_HIGHEST_PRIORITY, LITMUS_LOWEST_PRIORITY, LITMUS_MAX_PRIORITY, Lt,
    NS_PER_MS, ReleasePolicy, RtTask, RtTaskBuilder, TaskClass, class_from_label,
    default_task_parameters,
};

//! Prelude module for convenient imports.

pub use crate::rt_setup::RTSetup;
pub use crate::runtime::LitmusRuntime;
pub use crate::sporadic::{
    SporadicTask, SubmissionReport, sporadic_task, sporadic_task_ms, sporadic_task_ns,
};

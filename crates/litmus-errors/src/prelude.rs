//! Prelude module for convenient error handling imports.

pub use crate::{
    FAILURE_SENTINEL, KernelResult, LitmusResult,
    common::{ErrorSeverity, LitmusError},
    kernel::{KernelError, KernelOp},
    validation::ValidationError,
};

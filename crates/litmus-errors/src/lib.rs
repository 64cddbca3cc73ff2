//! Error types for the LITMUS^RT userspace interface
//!
//! Every crate in the workspace reports failures through the types defined
//! here so that callers see one taxonomy:
//!
//! - [`validation`]: lookup misses and rejected input (unknown protocol names,
//!   invalid task class labels, malformed parameter blocks)
//! - [`kernel`]: failed calls into the kernel collaborators, carrying the raw
//!   negative result code
//! - [`common`]: the top-level [`LitmusError`] and severity classification
//!
//! # Integer contract
//!
//! The kernel reports failures as negative integers. [`KernelError::code`] and
//! [`LitmusError::code`] give that integer back unchanged, so code written
//! against the plain integer interface keeps working:
//!
//! ```
//! use litmus_errors::prelude::*;
//!
//! let err = KernelError::from_errno(KernelOp::SetTaskParams, 22);
//! assert_eq!(err.code(), -22);
//! assert_eq!(LitmusError::from(err).code(), -22);
//!
//! let miss = ValidationError::invalid_enum("task class", "xrt", "hrt, srt, be");
//! assert_eq!(LitmusError::from(miss).code(), -1);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod kernel;
pub mod prelude;
pub mod validation;

pub use common::{ErrorSeverity, LitmusError};
pub use kernel::{KernelError, KernelOp};
pub use validation::ValidationError;

/// Integer returned by the legacy interface for every non-kernel failure.
pub const FAILURE_SENTINEL: i32 = -1;

/// A specialized `Result` type for LITMUS^RT operations.
pub type LitmusResult<T> = std::result::Result<T, LitmusError>;

/// A specialized `Result` type for a single kernel collaborator call.
pub type KernelResult<T = ()> = std::result::Result<T, KernelError>;

//! Shared test utilities for the LITMUS^RT userspace crates.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`mock`] - A recording [`MockKernel`](mock::MockKernel)
//! - [`namespace`] - A namespace opener that counts live handles
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! litmus-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use litmus_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]

pub mod must;
pub mod namespace;
pub mod prelude;

#[cfg(feature = "mock")]
pub mod mock;

pub use must::*;

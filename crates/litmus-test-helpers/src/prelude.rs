//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use litmus_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_err, must_parse, must_some, must_with};
pub use crate::namespace::{CountedHandle, CountingNamespace};

#[cfg(feature = "mock")]
pub use crate::mock::{KernelCall, MOCK_ONLINE_CPUS, MOCK_TID, MockKernel};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

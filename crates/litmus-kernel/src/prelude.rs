//! Prelude module for the kernel interface.

pub use crate::PlatformKernel;
pub use crate::config::{KernelConfig, SyscallTable};
pub use crate::interface::{
    CpuTopology, Kernel, MemoryLockFlags, MemoryLocking, ObjectDescriptor, ObjectDescriptors,
    SchedulerInterface, Tid,
};

//! Fallback platform implementation for non-Linux systems.
//!
//! LITMUS^RT only exists on Linux. Every call fails with `ENOSYS` except the
//! CPU count, which callers may still use for diagnostics.

use std::os::fd::BorrowedFd;

use litmus_errors::{KernelError, KernelOp, KernelResult};
use litmus_types::{LockProtocol, ProtocolConfig, RtTask};

use crate::config::KernelConfig;
use crate::interface::{
    CpuTopology, MemoryLockFlags, MemoryLocking, ObjectDescriptor, ObjectDescriptors,
    SchedulerInterface, Tid,
};

fn unsupported(op: KernelOp) -> KernelError {
    KernelError::from_errno(op, libc::ENOSYS)
}

/// Fallback backend; every kernel call is unsupported.
#[derive(Debug, Clone, Default)]
pub struct PlatformKernel {
    config: KernelConfig,
}

impl PlatformKernel {
    /// Create a backend with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with a custom configuration.
    pub fn with_config(config: KernelConfig) -> Self {
        Self { config }
    }

    /// Backend configuration.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Always `false`: no control page can be mapped here.
    pub fn has_control_page(&self) -> bool {
        false
    }
}

impl SchedulerInterface for PlatformKernel {
    fn init_kernel_interface(&self) -> KernelResult {
        Err(unsupported(KernelOp::Handshake))
    }

    fn set_rt_task_param(&self, _tid: Tid, _params: &RtTask) -> KernelResult {
        Err(unsupported(KernelOp::SetTaskParams))
    }

    fn current_thread_id(&self) -> KernelResult<Tid> {
        Err(unsupported(KernelOp::ThreadId))
    }
}

impl MemoryLocking for PlatformKernel {
    fn lock_all_memory(&self, _flags: MemoryLockFlags) -> KernelResult {
        Err(unsupported(KernelOp::MemoryLock))
    }
}

impl CpuTopology for PlatformKernel {
    fn online_cpus(&self) -> KernelResult<u32> {
        std::thread::available_parallelism()
            .map_err(|e| {
                KernelError::from_errno(
                    KernelOp::ClusterMapping,
                    e.raw_os_error().unwrap_or(libc::ENOSYS),
                )
            })
            .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX))
    }

    fn migrate_to_cluster(&self, _cluster: u32, _cluster_size: u32) -> KernelResult {
        Err(unsupported(KernelOp::Migration))
    }
}

impl ObjectDescriptors for PlatformKernel {
    fn od_open(
        &self,
        _resource: BorrowedFd<'_>,
        _protocol: LockProtocol,
        _lock_id: u32,
        _config: ProtocolConfig,
    ) -> KernelResult<ObjectDescriptor> {
        Err(unsupported(KernelOp::ObjectOpen))
    }

    fn od_close(&self, _od: ObjectDescriptor) -> KernelResult {
        Err(unsupported(KernelOp::ObjectClose))
    }

    fn litmus_lock(&self, _od: ObjectDescriptor) -> KernelResult {
        Err(unsupported(KernelOp::Lock))
    }

    fn litmus_unlock(&self, _od: ObjectDescriptor) -> KernelResult {
        Err(unsupported(KernelOp::Unlock))
    }
}

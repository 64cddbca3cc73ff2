//! Kernel collaborator traits.
//!
//! Each trait covers one external service the core depends on. They are
//! object safe and `Send + Sync`, so a runtime can hold `Arc<dyn Kernel>` or
//! a concrete backend by value.
//!
//! # Result codes
//!
//! Implementations report failures as [`KernelError`] carrying the raw
//! negative code. Callers that need the integer contract read it back with
//! [`KernelError::code`].

use core::fmt;
use core::ops::Range;
use std::os::fd::BorrowedFd;

use litmus_errors::{KernelError, KernelOp, KernelResult};
use litmus_types::{LockProtocol, ProtocolConfig, RtTask};
use serde::{Deserialize, Serialize};

/// Kernel thread identifier (`gettid()`).
pub type Tid = i32;

/// Handle to a kernel lock object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectDescriptor(i32);

impl ObjectDescriptor {
    /// Wrap a raw descriptor returned by the kernel.
    pub fn from_raw(od: i32) -> Self {
        Self(od)
    }

    /// The raw descriptor.
    pub fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "od{}", self.0)
    }
}

/// Which pages `mlockall` pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryLockFlags {
    /// Pages mapped now (`MCL_CURRENT`)
    pub current: bool,
    /// Pages mapped in the future (`MCL_FUTURE`)
    pub future: bool,
}

impl MemoryLockFlags {
    /// Current and future pages.
    pub const ALL: Self = Self {
        current: true,
        future: true,
    };

    /// Whether any flag is set.
    pub fn is_empty(self) -> bool {
        !self.current && !self.future
    }
}

impl Default for MemoryLockFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Scheduler side of the kernel: interface handshake and task parameters.
pub trait SchedulerInterface: Send + Sync {
    /// Initialize the kernel <-> user space interface for the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::Handshake`] if the interface is
    /// unavailable.
    fn init_kernel_interface(&self) -> KernelResult;

    /// Submit real-time parameters for thread `tid`.
    ///
    /// # Errors
    ///
    /// Returns the kernel's rejection, tagged [`KernelOp::SetTaskParams`].
    fn set_rt_task_param(&self, tid: Tid, params: &RtTask) -> KernelResult;

    /// Identifier of the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::ThreadId`] if the identifier
    /// cannot be obtained.
    fn current_thread_id(&self) -> KernelResult<Tid>;
}

/// Pinning process memory.
pub trait MemoryLocking: Send + Sync {
    /// Lock process pages into physical memory.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::MemoryLock`].
    fn lock_all_memory(&self, flags: MemoryLockFlags) -> KernelResult;
}

/// CPU topology: clusters and migration.
pub trait CpuTopology: Send + Sync {
    /// Number of online CPUs.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::ClusterMapping`] if the count is
    /// unavailable.
    fn online_cpus(&self) -> KernelResult<u32>;

    /// First CPU of `cluster` when CPUs are grouped `cluster_size` at a time.
    ///
    /// Cluster size 1 is partitioned scheduling; a cluster spanning every
    /// CPU is global scheduling.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::ClusterMapping`] if the cluster
    /// does not exist.
    fn cluster_to_first_cpu(&self, cluster: u32, cluster_size: u32) -> KernelResult<u32> {
        let online = self.online_cpus()?;
        cluster_cpus(cluster, cluster_size, online).map(|cpus| cpus.start)
    }

    /// Restrict the calling thread to the CPUs of `cluster`.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::Migration`].
    fn migrate_to_cluster(&self, cluster: u32, cluster_size: u32) -> KernelResult;
}

/// Kernel lock objects.
pub trait ObjectDescriptors: Send + Sync {
    /// Request a descriptor for lock `lock_id` of type `protocol` in the
    /// namespace named by `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::ObjectOpen`].
    fn od_open(
        &self,
        resource: BorrowedFd<'_>,
        protocol: LockProtocol,
        lock_id: u32,
        config: ProtocolConfig,
    ) -> KernelResult<ObjectDescriptor>;

    /// Release a descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::ObjectClose`].
    fn od_close(&self, od: ObjectDescriptor) -> KernelResult;

    /// Acquire the lock behind `od`, blocking as the protocol dictates.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::Lock`].
    fn litmus_lock(&self, od: ObjectDescriptor) -> KernelResult;

    /// Release the lock behind `od`.
    ///
    /// # Errors
    ///
    /// Returns an error tagged [`KernelOp::Unlock`].
    fn litmus_unlock(&self, od: ObjectDescriptor) -> KernelResult;
}

/// Every kernel collaborator in one bound.
pub trait Kernel: SchedulerInterface + MemoryLocking + CpuTopology + ObjectDescriptors {}

impl<T> Kernel for T where
    T: ?Sized + SchedulerInterface + MemoryLocking + CpuTopology + ObjectDescriptors
{
}

/// CPUs belonging to `cluster` on a machine with `online` CPUs.
///
/// The last cluster may be short when `online` is not a multiple of
/// `cluster_size`.
///
/// # Errors
///
/// Returns `-EINVAL` (tagged [`KernelOp::ClusterMapping`]) when
/// `cluster_size` is zero or the cluster starts past the last CPU.
pub fn cluster_cpus(cluster: u32, cluster_size: u32, online: u32) -> KernelResult<Range<u32>> {
    let invalid = || KernelError::from_errno(KernelOp::ClusterMapping, libc::EINVAL);

    if cluster_size == 0 {
        return Err(invalid());
    }
    let first = cluster.checked_mul(cluster_size).ok_or_else(invalid)?;
    if first >= online {
        return Err(invalid());
    }
    let end = first.saturating_add(cluster_size).min(online);
    Ok(first..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitioned_cluster() {
        assert_eq!(cluster_cpus(3, 1, 8), Ok(3..4));
    }

    #[test]
    fn test_global_cluster() {
        assert_eq!(cluster_cpus(0, 8, 8), Ok(0..8));
        assert!(matches!(cluster_cpus(1, 8, 8), Err(_)));
    }

    #[test]
    fn test_short_last_cluster() {
        assert_eq!(cluster_cpus(1, 4, 6), Ok(4..6));
    }

    #[test]
    fn test_invalid_clusters() {
        let err = cluster_cpus(0, 0, 8);
        assert_eq!(err.map_err(|e| e.errno()), Err(libc::EINVAL));
        assert!(matches!(cluster_cpus(u32::MAX, 2, 8), Err(_)));
        assert!(matches!(cluster_cpus(0, 1, 0), Err(_)));
    }

    #[test]
    fn test_memory_lock_flags() {
        assert_eq!(MemoryLockFlags::default(), MemoryLockFlags::ALL);
        assert!(
            MemoryLockFlags {
                current: false,
                future: false
            }
            .is_empty()
        );
    }

    #[test]
    fn test_object_descriptor() {
        let od = ObjectDescriptor::from_raw(4);
        assert_eq!(od.as_raw(), 4);
        assert_eq!(od.to_string(), "od4");
    }

    #[test]
    fn test_trait_bounds() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SchedulerInterface>();
        assert_send_sync::<dyn ObjectDescriptors>();
        assert_send_sync::<dyn CpuTopology>();
    }
}

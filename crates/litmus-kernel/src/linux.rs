//! Linux-specific platform implementation.
#![expect(
    unsafe_code,
    reason = "raw LITMUS^RT system calls, mlockall, mmap and affinity need libc"
)]

use core::cell::RefCell;
use core::ffi::c_void;
use core::num::TryFromIntError;
use core::ptr::{self, NonNull};
use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, BorrowedFd};
use std::path::Path;

use libc::{
    CPU_SETSIZE, MAP_FAILED, MAP_POPULATE, MAP_SHARED, MCL_CURRENT, MCL_FUTURE, PROT_READ,
    PROT_WRITE, c_int, c_long, c_uint, cpu_set_t,
};
use litmus_errors::{KernelError, KernelOp, KernelResult};
use litmus_types::{LockProtocol, ProtocolConfig, RtTask};
use tracing::debug;

use crate::config::KernelConfig;
use crate::interface::{
    CpuTopology, MemoryLockFlags, MemoryLocking, ObjectDescriptor, ObjectDescriptors,
    SchedulerInterface, Tid, cluster_cpus,
};

/// Kernel-side layout of the task parameter block.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct RawRtTask {
    exec_cost: u64,
    period: u64,
    relative_deadline: u64,
    phase: u64,
    cpu: c_uint,
    priority: c_uint,
    cls: c_int,
    budget_policy: c_int,
    release_policy: c_int,
}

impl From<&RtTask> for RawRtTask {
    fn from(task: &RtTask) -> Self {
        Self {
            exec_cost: task.exec_cost,
            period: task.period,
            relative_deadline: task.relative_deadline,
            phase: task.phase,
            cpu: task.cpu,
            priority: task.priority,
            cls: task.cls as c_int,
            budget_policy: task.budget_policy as c_int,
            release_policy: task.release_policy as c_int,
        }
    }
}

/// The control page shared with the kernel, one per thread.
struct ControlPage {
    addr: NonNull<c_void>,
    len: usize,
}

impl ControlPage {
    fn map(device: &Path) -> KernelResult<Self> {
        let file: File = OpenOptions::new()
            .read(true)
            .write(true)
            .open(device)
            .map_err(|e| {
                KernelError::from_errno(
                    KernelOp::Handshake,
                    e.raw_os_error().unwrap_or(libc::ENODEV),
                )
            })?;
        let len = page_size()?;

        // SAFETY: `file` is open for the duration of the call, the address
        // hint is null so the kernel picks the placement, and the result is
        // checked against MAP_FAILED before use.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                PROT_READ | PROT_WRITE,
                MAP_SHARED | MAP_POPULATE,
                file.as_raw_fd(),
                0,
            )
        };
        if addr == MAP_FAILED {
            return Err(KernelError::last_os_error(KernelOp::Handshake));
        }

        NonNull::new(addr)
            .map(|addr| Self { addr, len })
            .ok_or_else(|| KernelError::from_errno(KernelOp::Handshake, libc::EFAULT))
    }
}

impl Drop for ControlPage {
    fn drop(&mut self) {
        // SAFETY: `addr`/`len` describe a mapping created by `map` and owned
        // exclusively by this value.
        unsafe {
            libc::munmap(self.addr.as_ptr(), self.len);
        }
    }
}

thread_local! {
    static CONTROL_PAGE: RefCell<Option<ControlPage>> = const { RefCell::new(None) };
}

fn page_size() -> KernelResult<usize> {
    // SAFETY: sysconf has no memory-safety preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    let size = check(size, KernelOp::Handshake)?;
    usize::try_from(size).map_err(|e| out_of_range(KernelOp::Handshake, e))
}

fn out_of_range(op: KernelOp, err: TryFromIntError) -> KernelError {
    debug!(op = op.describe(), %err, "kernel value out of range");
    KernelError::from_errno(op, libc::ERANGE)
}

fn check(ret: c_long, op: KernelOp) -> KernelResult<c_long> {
    if ret < 0 {
        Err(KernelError::last_os_error(op))
    } else {
        Ok(ret)
    }
}

/// Linux backend for every kernel collaborator.
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

    /// Whether the calling thread holds a mapped control page.
    pub fn has_control_page(&self) -> bool {
        CONTROL_PAGE.with(|slot| slot.borrow().is_some())
    }
}

impl SchedulerInterface for PlatformKernel {
    fn init_kernel_interface(&self) -> KernelResult {
        CONTROL_PAGE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                let page = ControlPage::map(&self.config.control_device)?;
                debug!(
                    device = %self.config.control_device.display(),
                    len = page.len,
                    "mapped control page"
                );
                *slot = Some(page);
            }
            Ok(())
        })
    }

    fn set_rt_task_param(&self, tid: Tid, params: &RtTask) -> KernelResult {
        let raw = RawRtTask::from(params);

        // SAFETY: `raw` is a live repr(C) value matching the kernel's
        // `struct rt_task`; the kernel only copies from the pointer.
        let ret = unsafe {
            libc::syscall(
                self.config.syscalls.set_rt_task_param,
                c_long::from(tid),
                ptr::addr_of!(raw),
            )
        };
        check(ret, KernelOp::SetTaskParams).map(|_| ())
    }

    fn current_thread_id(&self) -> KernelResult<Tid> {
        // SAFETY: gettid takes no arguments and cannot fail.
        let ret = unsafe { libc::syscall(libc::SYS_gettid) };
        let ret = check(ret, KernelOp::ThreadId)?;
        Tid::try_from(ret).map_err(|e| out_of_range(KernelOp::ThreadId, e))
    }
}

impl MemoryLocking for PlatformKernel {
    fn lock_all_memory(&self, flags: MemoryLockFlags) -> KernelResult {
        let mut raw = 0;
        if flags.current {
            raw |= MCL_CURRENT;
        }
        if flags.future {
            raw |= MCL_FUTURE;
        }

        // SAFETY: mlockall only changes page residency of this process.
        let ret = unsafe { libc::mlockall(raw) };
        check(c_long::from(ret), KernelOp::MemoryLock).map(|_| ())
    }
}

impl CpuTopology for PlatformKernel {
    fn online_cpus(&self) -> KernelResult<u32> {
        // SAFETY: sysconf has no memory-safety preconditions.
        let count = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        let count = check(count, KernelOp::ClusterMapping)?;
        u32::try_from(count).map_err(|e| out_of_range(KernelOp::ClusterMapping, e))
    }

    fn migrate_to_cluster(&self, cluster: u32, cluster_size: u32) -> KernelResult {
        let online = self
            .online_cpus()
            .map_err(|e| KernelError::new(KernelOp::Migration, e.code()))?;
        let cpus = cluster_cpus(cluster, cluster_size, online)
            .map_err(|e| KernelError::new(KernelOp::Migration, e.code()))?;

        // SAFETY: cpu_set_t is a plain bitmask; all zeroes is the empty set.
        let mut set: cpu_set_t = unsafe { core::mem::zeroed() };
        for cpu in cpus.clone() {
            if i64::from(cpu) >= i64::from(CPU_SETSIZE) {
                break;
            }
            // SAFETY: `cpu` is below CPU_SETSIZE, so the bit lies inside `set`.
            unsafe { libc::CPU_SET(cpu as usize, &mut set) };
        }

        // SAFETY: `set` is initialized and its size is passed alongside it;
        // pid 0 targets the calling thread.
        let ret = unsafe { libc::sched_setaffinity(0, size_of::<cpu_set_t>(), &set) };
        check(c_long::from(ret), KernelOp::Migration)?;
        debug!(cluster, cluster_size, first = cpus.start, end = cpus.end, "migrated to cluster");
        Ok(())
    }
}

impl ObjectDescriptors for PlatformKernel {
    fn od_open(
        &self,
        resource: BorrowedFd<'_>,
        protocol: LockProtocol,
        lock_id: u32,
        config: ProtocolConfig,
    ) -> KernelResult<ObjectDescriptor> {
        let mut cpu_arg: c_int = match config {
            ProtocolConfig::None => 0,
            ProtocolConfig::Cpu(cpu) => cpu,
        };
        let config_ptr: *mut c_void = if config.is_none() {
            ptr::null_mut()
        } else {
            ptr::addr_of_mut!(cpu_arg).cast()
        };

        // SAFETY: `resource` is a borrowed, open descriptor and `config_ptr`
        // is either null or points at `cpu_arg`, which outlives the call.
        let ret = unsafe {
            libc::syscall(
                self.config.syscalls.od_open,
                c_long::from(resource.as_raw_fd()),
                c_long::from(protocol.id()),
                c_long::from(lock_id),
                config_ptr,
            )
        };
        let od = check(ret, KernelOp::ObjectOpen)?;
        i32::try_from(od)
            .map(ObjectDescriptor::from_raw)
            .map_err(|e| out_of_range(KernelOp::ObjectOpen, e))
    }

    fn od_close(&self, od: ObjectDescriptor) -> KernelResult {
        // SAFETY: the call takes a plain integer and touches no user memory.
        let ret = unsafe { libc::syscall(self.config.syscalls.od_close, c_long::from(od.as_raw())) };
        check(ret, KernelOp::ObjectClose).map(|_| ())
    }

    fn litmus_lock(&self, od: ObjectDescriptor) -> KernelResult {
        // SAFETY: the call takes a plain integer and touches no user memory.
        let ret =
            unsafe { libc::syscall(self.config.syscalls.litmus_lock, c_long::from(od.as_raw())) };
        check(ret, KernelOp::Lock).map(|_| ())
    }

    fn litmus_unlock(&self, od: ObjectDescriptor) -> KernelResult {
        // SAFETY: the call takes a plain integer and touches no user memory.
        let ret = unsafe {
            libc::syscall(self.config.syscalls.litmus_unlock, c_long::from(od.as_raw()))
        };
        check(ret, KernelOp::Unlock).map(|_| ())
    }
}

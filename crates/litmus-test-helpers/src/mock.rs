//! Recording kernel double.
//!
//! [`MockKernel`] implements every collaborator trait from `litmus-kernel`
//! without touching the real kernel. It records each call in order, hands out
//! object descriptors from a counter, tracks which descriptors are open and
//! held, and fails any operation on demand with a scripted result code.

use std::collections::{BTreeSet, HashMap};
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};

use litmus_errors::{KernelError, KernelOp, KernelResult};
use litmus_kernel::{
    CpuTopology, MemoryLockFlags, MemoryLocking, ObjectDescriptor, ObjectDescriptors,
    SchedulerInterface, Tid, cluster_cpus,
};
use litmus_types::{LockProtocol, ProtocolConfig, RtTask};
use parking_lot::Mutex;

/// Thread id reported by a fresh [`MockKernel`].
pub const MOCK_TID: Tid = 4242;

/// Online CPU count reported by a fresh [`MockKernel`].
pub const MOCK_ONLINE_CPUS: u32 = 8;

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelCall {
    InitKernelInterface,
    SetRtTaskParam { tid: Tid, params: RtTask },
    CurrentThreadId,
    LockAllMemory(MemoryLockFlags),
    OnlineCpus,
    ClusterToFirstCpu { cluster: u32, cluster_size: u32 },
    MigrateToCluster { cluster: u32, cluster_size: u32 },
    OdOpen {
        fd: RawFd,
        protocol: LockProtocol,
        lock_id: u32,
        config: ProtocolConfig,
    },
    OdClose(ObjectDescriptor),
    Lock(ObjectDescriptor),
    Unlock(ObjectDescriptor),
}

impl KernelCall {
    /// The operation this call belongs to.
    pub fn op(&self) -> KernelOp {
        match self {
            KernelCall::InitKernelInterface => KernelOp::Handshake,
            KernelCall::SetRtTaskParam { .. } => KernelOp::SetTaskParams,
            KernelCall::CurrentThreadId => KernelOp::ThreadId,
            KernelCall::LockAllMemory(_) => KernelOp::MemoryLock,
            KernelCall::OnlineCpus | KernelCall::ClusterToFirstCpu { .. } => {
                KernelOp::ClusterMapping
            }
            KernelCall::MigrateToCluster { .. } => KernelOp::Migration,
            KernelCall::OdOpen { .. } => KernelOp::ObjectOpen,
            KernelCall::OdClose(_) => KernelOp::ObjectClose,
            KernelCall::Lock(_) => KernelOp::Lock,
            KernelCall::Unlock(_) => KernelOp::Unlock,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<KernelCall>,
    failures: HashMap<KernelOp, i32>,
    next_od: i32,
    open: BTreeSet<ObjectDescriptor>,
    held: BTreeSet<ObjectDescriptor>,
}

/// A kernel that records calls instead of making them.
#[derive(Debug)]
pub struct MockKernel {
    tid: Tid,
    online_cpus: u32,
    state: Mutex<MockState>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            tid: MOCK_TID,
            online_cpus: MOCK_ONLINE_CPUS,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Report `tid` from `current_thread_id`.
    pub fn with_tid(mut self, tid: Tid) -> Self {
        self.tid = tid;
        self
    }

    /// Report `count` online CPUs.
    pub fn with_online_cpus(mut self, count: u32) -> Self {
        self.online_cpus = count;
        self
    }

    /// Fail every call of `op` with `code` until cleared.
    pub fn failing(self, op: KernelOp, code: i32) -> Self {
        self.fail(op, code);
        self
    }

    /// Fail every call of `op` with `code` until cleared.
    pub fn fail(&self, op: KernelOp, code: i32) {
        self.state.lock().failures.insert(op, code);
    }

    /// Let `op` succeed again.
    pub fn clear_failure(&self, op: KernelOp) {
        self.state.lock().failures.remove(&op);
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<KernelCall> {
        self.state.lock().calls.clone()
    }

    /// Number of recorded calls of `op`.
    pub fn call_count(&self, op: KernelOp) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    /// Parameters passed to `set_rt_task_param`, in order.
    pub fn submissions(&self) -> Vec<(Tid, RtTask)> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                KernelCall::SetRtTaskParam { tid, params } => Some((*tid, *params)),
                _ => None,
            })
            .collect()
    }

    /// The most recent submission.
    pub fn last_submission(&self) -> Option<(Tid, RtTask)> {
        self.submissions().pop()
    }

    /// Descriptors opened and not yet closed.
    pub fn open_descriptors(&self) -> Vec<ObjectDescriptor> {
        self.state.lock().open.iter().copied().collect()
    }

    /// Descriptors currently locked.
    pub fn held_locks(&self) -> Vec<ObjectDescriptor> {
        self.state.lock().held.iter().copied().collect()
    }

    /// Forget recorded calls. Scripted failures and descriptors are kept.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn record(&self, call: KernelCall) -> KernelResult {
        let mut state = self.state.lock();
        let op = call.op();
        state.calls.push(call);
        match state.failures.get(&op) {
            Some(&code) => Err(KernelError::new(op, code)),
            None => Ok(()),
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerInterface for MockKernel {
    fn init_kernel_interface(&self) -> KernelResult {
        self.record(KernelCall::InitKernelInterface)
    }

    fn set_rt_task_param(&self, tid: Tid, params: &RtTask) -> KernelResult {
        self.record(KernelCall::SetRtTaskParam {
            tid,
            params: *params,
        })
    }

    fn current_thread_id(&self) -> KernelResult<Tid> {
        self.record(KernelCall::CurrentThreadId)?;
        Ok(self.tid)
    }
}

impl MemoryLocking for MockKernel {
    fn lock_all_memory(&self, flags: MemoryLockFlags) -> KernelResult {
        self.record(KernelCall::LockAllMemory(flags))?;
        if flags.is_empty() {
            return Err(KernelError::from_errno(KernelOp::MemoryLock, libc::EINVAL));
        }
        Ok(())
    }
}

impl CpuTopology for MockKernel {
    fn online_cpus(&self) -> KernelResult<u32> {
        self.record(KernelCall::OnlineCpus)?;
        Ok(self.online_cpus)
    }

    fn cluster_to_first_cpu(&self, cluster: u32, cluster_size: u32) -> KernelResult<u32> {
        self.record(KernelCall::ClusterToFirstCpu {
            cluster,
            cluster_size,
        })?;
        cluster_cpus(cluster, cluster_size, self.online_cpus).map(|cpus| cpus.start)
    }

    fn migrate_to_cluster(&self, cluster: u32, cluster_size: u32) -> KernelResult {
        self.record(KernelCall::MigrateToCluster {
            cluster,
            cluster_size,
        })?;
        cluster_cpus(cluster, cluster_size, self.online_cpus)
            .map(|_| ())
            .map_err(|e| KernelError::new(KernelOp::Migration, e.code()))
    }
}

impl ObjectDescriptors for MockKernel {
    fn od_open(
        &self,
        resource: BorrowedFd<'_>,
        protocol: LockProtocol,
        lock_id: u32,
        config: ProtocolConfig,
    ) -> KernelResult<ObjectDescriptor> {
        self.record(KernelCall::OdOpen {
            fd: resource.as_raw_fd(),
            protocol,
            lock_id,
            config,
        })?;
        let mut state = self.state.lock();
        let od = ObjectDescriptor::from_raw(state.next_od);
        state.next_od = state.next_od.saturating_add(1);
        state.open.insert(od);
        Ok(od)
    }

    fn od_close(&self, od: ObjectDescriptor) -> KernelResult {
        self.record(KernelCall::OdClose(od))?;
        let mut state = self.state.lock();
        if !state.open.remove(&od) {
            return Err(KernelError::from_errno(KernelOp::ObjectClose, libc::EBADF));
        }
        state.held.remove(&od);
        Ok(())
    }

    fn litmus_lock(&self, od: ObjectDescriptor) -> KernelResult {
        self.record(KernelCall::Lock(od))?;
        let mut state = self.state.lock();
        if !state.open.contains(&od) {
            return Err(KernelError::from_errno(KernelOp::Lock, libc::EBADF));
        }
        if !state.held.insert(od) {
            return Err(KernelError::from_errno(KernelOp::Lock, libc::EBUSY));
        }
        Ok(())
    }

    fn litmus_unlock(&self, od: ObjectDescriptor) -> KernelResult {
        self.record(KernelCall::Unlock(od))?;
        let mut state = self.state.lock();
        if !state.held.remove(&od) {
            return Err(KernelError::from_errno(KernelOp::Unlock, libc::EINVAL));
        }
        Ok(())
    }
}

//! Kernel interface lifecycle.
//!
//! [`LitmusRuntime`] owns the kernel backend and tracks what has been set
//! up: memory locking once per process, the kernel handshake once per
//! thread. Repeating either step is a no-op. Every thread that takes part in
//! real-time scheduling calls [`LitmusRuntime::initialize_rt_thread`] (or
//! [`LitmusRuntime::initialize`] on the main thread) before submitting
//! parameters or opening locks. The runtime does not enforce that order.

use std::collections::HashSet;
use std::path::Path;
use std::thread::{self, ThreadId};

use litmus_errors::{KernelError, LitmusError, LitmusResult};
use litmus_kernel::{Kernel, KernelConfig, PlatformKernel};
use litmus_locking::{FsNamespace, LockHandle};
use litmus_types::{LockProtocol, ProtocolConfig, RtTask};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::rt_setup::RTSetup;
use crate::sporadic::{SporadicTask, SubmissionReport, sporadic_task};

#[derive(Debug, Default)]
struct RuntimeState {
    memory_locked: bool,
    /// Every thread that completed the handshake; exited threads stay.
    threads: HashSet<ThreadId>,
}

/// Process-wide LITMUS^RT runtime.
#[derive(Debug)]
pub struct LitmusRuntime<K> {
    kernel: K,
    setup: RTSetup,
    state: Mutex<RuntimeState>,
}

impl LitmusRuntime<PlatformKernel> {
    /// A runtime over the platform backend with its default configuration.
    pub fn platform(setup: RTSetup) -> Self {
        Self::new(PlatformKernel::new(), setup)
    }

    /// A runtime over the platform backend configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment overrides do not validate.
    pub fn from_env(setup: RTSetup) -> LitmusResult<Self> {
        let config = KernelConfig::from_env()?;
        Ok(Self::new(PlatformKernel::with_config(config), setup))
    }
}

impl<K: Kernel> LitmusRuntime<K> {
    pub fn new(kernel: K, setup: RTSetup) -> Self {
        Self {
            kernel,
            setup,
            state: Mutex::new(RuntimeState::default()),
        }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn setup(&self) -> &RTSetup {
        &self.setup
    }

    /// Lock process memory, then perform the kernel handshake for the
    /// calling thread.
    ///
    /// Both steps are attempted even if the first fails, and each failure
    /// is logged on its own.
    ///
    /// # Errors
    ///
    /// Returns [`LitmusError::Initialization`] carrying every failed step.
    pub fn initialize(&self) -> LitmusResult<()> {
        let memory_lock = self.lock_memory().err();
        let handshake = self.handshake().err();

        if memory_lock.is_none() && handshake.is_none() {
            info!(
                memory_locked = self.is_memory_locked(),
                "LITMUS^RT runtime initialized"
            );
            return Ok(());
        }
        Err(LitmusError::Initialization {
            memory_lock,
            handshake,
        })
    }

    /// Perform the kernel handshake for an additional thread.
    ///
    /// # Errors
    ///
    /// Returns the handshake failure.
    pub fn initialize_rt_thread(&self) -> LitmusResult<()> {
        Ok(self.handshake()?)
    }

    /// Release runtime resources. Nothing is held yet, so this only logs.
    pub fn teardown(&self) {
        debug!("LITMUS^RT runtime teardown: nothing to release");
    }

    pub fn is_memory_locked(&self) -> bool {
        self.state.lock().memory_locked
    }

    /// Whether the calling thread has completed the handshake.
    pub fn is_thread_initialized(&self) -> bool {
        self.state.lock().threads.contains(&thread::current().id())
    }

    /// Number of threads that have completed the handshake through this
    /// runtime.
    ///
    /// Threads are never forgotten: one that has since exited still counts,
    /// so this is a running total rather than a live count.
    pub fn initialized_threads(&self) -> usize {
        self.state.lock().threads.len()
    }

    /// Configure and submit a sporadic task for the calling thread.
    ///
    /// # Errors
    ///
    /// As [`sporadic_task`].
    pub fn sporadic_task(&self, task: &SporadicTask) -> LitmusResult<SubmissionReport> {
        sporadic_task(&self.kernel, task)
    }

    /// Submit `params` for the calling thread.
    ///
    /// # Errors
    ///
    /// Returns the thread id lookup or submission failure.
    pub fn set_rt_task_param(&self, params: &RtTask) -> LitmusResult<()> {
        let tid = self.kernel.current_thread_id()?;
        self.kernel.set_rt_task_param(tid, params)?;
        debug!(tid, cpu = params.cpu, "submitted task parameters");
        Ok(())
    }

    /// Open a lock object named by a namespace file.
    ///
    /// # Errors
    ///
    /// As [`litmus_locking::open_lock`].
    pub fn open_lock(
        &self,
        protocol: LockProtocol,
        lock_id: u32,
        namespace: impl AsRef<Path>,
        config: ProtocolConfig,
    ) -> LitmusResult<LockHandle<'_, K>> {
        LockHandle::open(
            &self.kernel,
            &FsNamespace::new(),
            protocol,
            lock_id,
            namespace,
            config,
        )
    }

    fn lock_memory(&self) -> Result<(), KernelError> {
        let Some(flags) = self.setup.memory_lock_flags() else {
            return Ok(());
        };
        // held across mlockall: memory is locked at most once per process
        let mut state = self.state.lock();
        if state.memory_locked {
            return Ok(());
        }

        match self.kernel.lock_all_memory(flags) {
            Ok(()) => {
                state.memory_locked = true;
                debug!(future = flags.future, "locked process memory");
                Ok(())
            }
            Err(e) => {
                error!(op = e.op.describe(), code = e.code(), "mlockall() failed");
                Err(e)
            }
        }
    }

    fn handshake(&self) -> Result<(), KernelError> {
        if self.is_thread_initialized() {
            return Ok(());
        }

        match self.kernel.init_kernel_interface() {
            Ok(()) => {
                self.state.lock().threads.insert(thread::current().id());
                debug!("kernel interface initialized for thread");
                Ok(())
            }
            Err(e) => {
                error!(
                    op = e.op.describe(),
                    code = e.code(),
                    "kernel <-> user space interface initialization failed"
                );
                Err(e)
            }
        }
    }
}

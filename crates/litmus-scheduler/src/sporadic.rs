//! Sporadic task configuration.
//!
//! A sporadic task is described by execution cost, period and phase. This
//! module turns that description into a full [`RtTask`] with an implicit
//! deadline, places it on the first CPU of its cluster, and submits it for
//! the calling thread.
//!
//! # Outcome
//!
//! Submission returns [`SubmissionReport`]. Its `status` is exactly what the
//! kernel answered to `set_rt_task_param`; [`SubmissionReport::code`] turns it
//! back into the kernel's integer. Migration to the cluster is best effort: a
//! failure is logged and kept in `migration_failure`, and submission still
//! happens. Failures that leave nothing to submit (unit overflow, cluster
//! mapping, thread id) abort with `Err`.

use litmus_errors::{KernelError, KernelResult, LitmusResult, ValidationError};
use litmus_kernel::{Kernel, Tid};
use litmus_types::{
    BudgetPolicy, LITMUS_LOWEST_PRIORITY, Lt, NS_PER_MS, ReleasePolicy, RtTask, TaskClass,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Description of a sporadic task, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SporadicTask {
    /// Worst-case execution cost
    pub exec_cost: Lt,
    /// Minimum inter-arrival time, also the relative deadline
    pub period: Lt,
    /// Offset of the first release
    pub phase: Lt,
    /// Cluster index
    pub cluster: u32,
    /// CPUs per cluster; 1 is partitioned scheduling
    pub cluster_size: u32,
    /// Fixed priority, lower is more urgent
    pub priority: u32,
    /// Task class
    pub cls: TaskClass,
    /// Budget enforcement policy
    pub budget_policy: BudgetPolicy,
    /// Move the calling thread onto the cluster before submitting
    pub migrate: bool,
}

impl SporadicTask {
    /// A task on cluster 0 of size 1, lowest priority, soft real-time, no
    /// budget enforcement, no migration.
    pub fn ns(exec_cost: Lt, period: Lt, phase: Lt) -> Self {
        Self {
            exec_cost,
            period,
            phase,
            cluster: 0,
            cluster_size: 1,
            priority: LITMUS_LOWEST_PRIORITY,
            cls: TaskClass::SoftRealTime,
            budget_policy: BudgetPolicy::NoEnforcement,
            migrate: false,
        }
    }

    /// Like [`ns`](Self::ns) with times given in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NumericOverflow`] if a value does not fit
    /// in nanoseconds.
    pub fn ms(exec_cost: Lt, period: Lt, phase: Lt) -> Result<Self, ValidationError> {
        Ok(Self::ns(
            ms_to_ns("exec_cost", exec_cost)?,
            ms_to_ns("period", period)?,
            ms_to_ns("phase", phase)?,
        ))
    }

    /// Place the task on `cluster` of `cluster_size` CPUs.
    #[must_use]
    pub fn with_cluster(mut self, cluster: u32, cluster_size: u32) -> Self {
        self.cluster = cluster;
        self.cluster_size = cluster_size;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_class(mut self, cls: TaskClass) -> Self {
        self.cls = cls;
        self
    }

    #[must_use]
    pub fn with_budget_policy(mut self, policy: BudgetPolicy) -> Self {
        self.budget_policy = policy;
        self
    }

    /// Migrate the calling thread onto the cluster before submitting.
    #[must_use]
    pub fn with_migration(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    /// The parameter block for this task on `cpu`.
    ///
    /// Always a fresh descriptor with `relative_deadline == period`; fields
    /// this task does not describe keep their zero value.
    pub fn to_params(&self, cpu: u32) -> RtTask {
        RtTask {
            exec_cost: self.exec_cost,
            period: self.period,
            relative_deadline: self.period,
            phase: self.phase,
            cpu,
            priority: self.priority,
            cls: self.cls,
            budget_policy: self.budget_policy,
            release_policy: ReleasePolicy::Sporadic,
        }
    }
}

fn ms_to_ns(field: &str, ms: Lt) -> Result<Lt, ValidationError> {
    ms.checked_mul(NS_PER_MS)
        .ok_or_else(|| ValidationError::overflow(field))
}

/// Outcome of a sporadic task submission.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the submission status must be checked"]
pub struct SubmissionReport {
    /// The kernel's answer to `set_rt_task_param`
    pub status: KernelResult,
    /// The parameters that were submitted
    pub params: RtTask,
    /// Thread the parameters were submitted for
    pub tid: Tid,
    /// Best-effort migration failure, if migration was requested and failed
    pub migration_failure: Option<KernelError>,
}

impl SubmissionReport {
    /// The kernel's result code: `0` on success, negative on failure.
    pub fn code(&self) -> i32 {
        match self.status {
            Ok(()) => 0,
            Err(e) => e.code(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_ok()
    }

    /// Whether migration was requested and failed.
    pub fn migration_failed(&self) -> bool {
        self.migration_failure.is_some()
    }

    /// Collapse into the submitted parameters or the submission error.
    ///
    /// # Errors
    ///
    /// Returns the kernel's refusal.
    pub fn into_result(self) -> LitmusResult<RtTask> {
        self.status?;
        Ok(self.params)
    }
}

/// Configure and submit `task` for the calling thread.
///
/// # Errors
///
/// Returns an error, without submitting, if the cluster does not exist or
/// the calling thread's id cannot be read. A refused submission is not an
/// error here; it is reported in [`SubmissionReport::status`].
pub fn sporadic_task<K: Kernel + ?Sized>(
    kernel: &K,
    task: &SporadicTask,
) -> LitmusResult<SubmissionReport> {
    let cpu = kernel
        .cluster_to_first_cpu(task.cluster, task.cluster_size)
        .inspect_err(|e| {
            error!(
                cluster = task.cluster,
                cluster_size = task.cluster_size,
                code = e.code(),
                "cannot map cluster to a CPU"
            );
        })?;
    let params = task.to_params(cpu);

    let migration_failure = if task.migrate {
        kernel
            .migrate_to_cluster(task.cluster, task.cluster_size)
            .inspect_err(|e| {
                warn!(
                    cluster = task.cluster,
                    cluster_size = task.cluster_size,
                    code = e.code(),
                    "migrate to cluster failed, submitting anyway"
                );
            })
            .err()
    } else {
        None
    };

    let tid = kernel.current_thread_id()?;
    let status = kernel.set_rt_task_param(tid, &params);
    match status {
        Ok(()) => debug!(
            tid,
            cpu,
            exec_cost = params.exec_cost,
            period = params.period,
            "submitted sporadic task"
        ),
        Err(e) => warn!(tid, cpu, code = e.code(), "kernel rejected task parameters"),
    }

    Ok(SubmissionReport {
        status,
        params,
        tid,
        migration_failure,
    })
}

/// Submit a sporadic task given in nanoseconds.
///
/// # Errors
///
/// As [`sporadic_task`].
#[expect(
    clippy::too_many_arguments,
    reason = "flat entry point taking every task field"
)]
pub fn sporadic_task_ns<K: Kernel + ?Sized>(
    kernel: &K,
    exec_cost: Lt,
    period: Lt,
    phase: Lt,
    cluster: u32,
    cluster_size: u32,
    priority: u32,
    cls: TaskClass,
    budget_policy: BudgetPolicy,
    migrate: bool,
) -> LitmusResult<SubmissionReport> {
    let task = SporadicTask::ns(exec_cost, period, phase)
        .with_cluster(cluster, cluster_size)
        .with_priority(priority)
        .with_class(cls)
        .with_budget_policy(budget_policy)
        .with_migration(migrate);
    sporadic_task(kernel, &task)
}

/// Submit a sporadic task given in milliseconds.
///
/// # Errors
///
/// Returns [`ValidationError::NumericOverflow`] for times that do not fit in
/// nanoseconds, otherwise as [`sporadic_task`].
#[expect(
    clippy::too_many_arguments,
    reason = "flat entry point taking every task field"
)]
pub fn sporadic_task_ms<K: Kernel + ?Sized>(
    kernel: &K,
    exec_cost: Lt,
    period: Lt,
    phase: Lt,
    cluster: u32,
    cluster_size: u32,
    priority: u32,
    cls: TaskClass,
    budget_policy: BudgetPolicy,
    migrate: bool,
) -> LitmusResult<SubmissionReport> {
    let task = SporadicTask::ms(exec_cost, period, phase)?
        .with_cluster(cluster, cluster_size)
        .with_priority(priority)
        .with_class(cls)
        .with_budget_policy(budget_policy)
        .with_migration(migrate);
    sporadic_task(kernel, &task)
}

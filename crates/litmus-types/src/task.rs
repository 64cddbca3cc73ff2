//! Real-time task parameter block.
//!
//! [`RtTask`] mirrors the kernel's per-task parameter structure. Every
//! descriptor starts from [`RtTask::default`], which applies the defaults the
//! scheduler expects:
//!
//! - implicit deadline (`relative_deadline == 0`)
//! - `phase == 0`, `cpu == 0`
//! - [`TaskClass::SoftRealTime`]
//! - [`BudgetPolicy::NoEnforcement`]
//! - fixed priority [`LITMUS_LOWEST_PRIORITY`]
//! - [`ReleasePolicy::Sporadic`]
//!
//! Callers must still set `exec_cost` and `period` to non-zero values, and
//! `cpu` for non-global schedulers (the first CPU of the cluster).

use core::fmt;
use core::str::FromStr;

use litmus_errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Time quantity in nanoseconds.
pub type Lt = u64;

/// Nanoseconds per millisecond.
pub const NS_PER_MS: Lt = 1_000_000;

/// Number of distinct fixed priorities.
pub const LITMUS_MAX_PRIORITY: u32 = 512;

/// Numerically smallest (most urgent) fixed priority.
pub const LITMUS_HIGHEST_PRIORITY: u32 = 1;

/// Numerically largest (least urgent) fixed priority.
pub const LITMUS_LOWEST_PRIORITY: u32 = LITMUS_MAX_PRIORITY - 1;

/// Task class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum TaskClass {
    /// Hard real-time: deadline misses are failures
    HardRealTime = 0,
    /// Soft real-time: bounded tardiness is acceptable
    #[default]
    SoftRealTime = 1,
    /// Best effort
    BestEffort = 2,
}

impl TaskClass {
    /// Short label used on command lines (`hrt`, `srt`, `be`).
    pub fn label(self) -> &'static str {
        match self {
            TaskClass::HardRealTime => "hrt",
            TaskClass::SoftRealTime => "srt",
            TaskClass::BestEffort => "be",
        }
    }

    /// Parse a short label.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEnumValue`] for anything other than
    /// `hrt`, `srt` or `be`. There is no fallback class.
    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        match label {
            "hrt" => Ok(TaskClass::HardRealTime),
            "srt" => Ok(TaskClass::SoftRealTime),
            "be" => Ok(TaskClass::BestEffort),
            other => Err(ValidationError::invalid_enum(
                "task class",
                other,
                "hrt, srt, be",
            )),
        }
    }
}

impl FromStr for TaskClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskClass::from_label(s)
    }
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Budget enforcement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum BudgetPolicy {
    /// Overruns are not enforced
    #[default]
    NoEnforcement = 0,
    /// Enforced at quantum boundaries
    QuantumEnforcement = 1,
    /// Enforced with a precise timer
    PreciseEnforcement = 2,
}

/// Job release policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ReleasePolicy {
    /// Releases separated by at least one period
    #[default]
    Sporadic = 0,
    /// Strictly periodic releases
    Periodic = 1,
    /// Released as soon as the previous job completes
    Early = 2,
}

/// Real-time task parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RtTask {
    /// Worst-case execution cost in nanoseconds
    pub exec_cost: Lt,
    /// Period (minimum inter-arrival time) in nanoseconds
    pub period: Lt,
    /// Relative deadline in nanoseconds, `0` for an implicit deadline
    pub relative_deadline: Lt,
    /// Offset of the first release in nanoseconds
    pub phase: Lt,
    /// Target CPU for partitioned and clustered schedulers
    pub cpu: u32,
    /// Fixed priority, lower is more urgent
    pub priority: u32,
    /// Task class
    pub cls: TaskClass,
    /// Budget enforcement policy
    pub budget_policy: BudgetPolicy,
    /// Release policy
    pub release_policy: ReleasePolicy,
}

impl Default for RtTask {
    fn default() -> Self {
        Self {
            exec_cost: 0,
            period: 0,
            relative_deadline: 0,
            phase: 0,
            cpu: 0,
            priority: LITMUS_LOWEST_PRIORITY,
            cls: TaskClass::SoftRealTime,
            budget_policy: BudgetPolicy::NoEnforcement,
            release_policy: ReleasePolicy::Sporadic,
        }
    }
}

impl RtTask {
    /// Create a descriptor with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder.
    pub fn builder() -> RtTaskBuilder {
        RtTaskBuilder::default()
    }

    /// Deadline the scheduler will use: `period` when the deadline is implicit.
    pub fn effective_deadline(&self) -> Lt {
        if self.relative_deadline == 0 {
            self.period
        } else {
            self.relative_deadline
        }
    }

    /// Whether the deadline is implicit.
    pub fn has_implicit_deadline(&self) -> bool {
        self.relative_deadline == 0 || self.relative_deadline == self.period
    }

    /// Check the parameters before submission.
    ///
    /// # Errors
    ///
    /// - `exec_cost` or `period` is zero
    /// - an explicit deadline is shorter than `exec_cost`
    /// - `priority` lies outside
    ///   `[LITMUS_HIGHEST_PRIORITY, LITMUS_LOWEST_PRIORITY]`
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exec_cost == 0 {
            return Err(ValidationError::required("exec_cost"));
        }
        if self.period == 0 {
            return Err(ValidationError::required("period"));
        }
        if self.effective_deadline() < self.exec_cost {
            return Err(ValidationError::constraint(format!(
                "relative deadline {}ns is shorter than execution cost {}ns",
                self.effective_deadline(),
                self.exec_cost
            )));
        }
        if !(LITMUS_HIGHEST_PRIORITY..=LITMUS_LOWEST_PRIORITY).contains(&self.priority) {
            return Err(ValidationError::out_of_range(
                "priority",
                self.priority,
                LITMUS_HIGHEST_PRIORITY,
                LITMUS_LOWEST_PRIORITY,
            ));
        }
        Ok(())
    }
}

/// Diagnostic rendering of execution cost, period and CPU.
impl fmt::Display for RtTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rt params:\n\texec_cost:\t{}\n\tperiod:\t\t{}\n\tcpu:\t{}\n",
            self.exec_cost, self.period, self.cpu
        )
    }
}

/// Builder for [`RtTask`], starting from the defaults.
#[derive(Debug, Default)]
pub struct RtTaskBuilder {
    task: RtTask,
}

impl RtTaskBuilder {
    /// Set the execution cost in nanoseconds.
    #[must_use]
    pub fn exec_cost(mut self, ns: Lt) -> Self {
        self.task.exec_cost = ns;
        self
    }

    /// Set the period in nanoseconds.
    #[must_use]
    pub fn period(mut self, ns: Lt) -> Self {
        self.task.period = ns;
        self
    }

    /// Set an explicit relative deadline in nanoseconds.
    #[must_use]
    pub fn relative_deadline(mut self, ns: Lt) -> Self {
        self.task.relative_deadline = ns;
        self
    }

    /// Set the phase in nanoseconds.
    #[must_use]
    pub fn phase(mut self, ns: Lt) -> Self {
        self.task.phase = ns;
        self
    }

    /// Set the target CPU.
    #[must_use]
    pub fn cpu(mut self, cpu: u32) -> Self {
        self.task.cpu = cpu;
        self
    }

    /// Set the fixed priority.
    #[must_use]
    pub fn priority(mut self, priority: u32) -> Self {
        self.task.priority = priority;
        self
    }

    /// Set the task class.
    #[must_use]
    pub fn class(mut self, cls: TaskClass) -> Self {
        self.task.cls = cls;
        self
    }

    /// Set the budget policy.
    #[must_use]
    pub fn budget_policy(mut self, policy: BudgetPolicy) -> Self {
        self.task.budget_policy = policy;
        self
    }

    /// Set the release policy.
    #[must_use]
    pub fn release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.task.release_policy = policy;
        self
    }

    /// Build and validate the descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if [`RtTask::validate`] rejects the parameters.
    pub fn build(self) -> Result<RtTask, ValidationError> {
        self.task.validate()?;
        Ok(self.task)
    }
}

/// Fresh descriptor with default parameters.
pub fn default_task_parameters() -> RtTask {
    RtTask::default()
}

/// Parse a task class label (`hrt`, `srt`, `be`).
///
/// # Errors
///
/// Returns an error for any other label.
pub fn class_from_label(label: &str) -> Result<TaskClass, ValidationError> {
    TaskClass::from_label(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let task = default_task_parameters();
        assert_eq!(task.cls, TaskClass::SoftRealTime);
        assert_eq!(task.priority, LITMUS_LOWEST_PRIORITY);
        assert_eq!(task.budget_policy, BudgetPolicy::NoEnforcement);
        assert_eq!(task.release_policy, ReleasePolicy::Sporadic);
        assert_eq!(task.exec_cost, 0);
        assert_eq!(task.period, 0);
        assert_eq!(task.relative_deadline, 0);
        assert_eq!(task.phase, 0);
        assert_eq!(task.cpu, 0);
    }

    #[test]
    fn test_priority_constants() {
        assert_eq!(LITMUS_LOWEST_PRIORITY, 511);
        assert!(LITMUS_HIGHEST_PRIORITY < LITMUS_LOWEST_PRIORITY);
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(class_from_label("hrt"), Ok(TaskClass::HardRealTime));
        assert_eq!(class_from_label("srt"), Ok(TaskClass::SoftRealTime));
        assert_eq!(class_from_label("be"), Ok(TaskClass::BestEffort));
        assert!(matches!(class_from_label("HRT"), Err(_)));
        assert!(matches!(class_from_label(""), Err(_)));
        assert!(matches!(class_from_label("soft"), Err(_)));
    }

    #[test]
    fn test_validate_requires_cost_and_period() {
        let task = RtTask::default();
        assert_eq!(
            task.validate(),
            Err(ValidationError::required("exec_cost"))
        );

        let task = RtTask {
            exec_cost: 1,
            ..RtTask::default()
        };
        assert_eq!(task.validate(), Err(ValidationError::required("period")));
    }

    #[test]
    fn test_validate_deadline() {
        let task = RtTask {
            exec_cost: 10,
            period: 100,
            relative_deadline: 5,
            ..RtTask::default()
        };
        assert!(matches!(
            task.validate(),
            Err(ValidationError::ConstraintViolation(_))
        ));
        assert!(!task.has_implicit_deadline());

        let implicit = RtTask {
            relative_deadline: 0,
            ..task
        };
        assert_eq!(implicit.validate(), Ok(()));
        assert_eq!(implicit.effective_deadline(), 100);
        assert!(implicit.has_implicit_deadline());
    }

    #[test]
    fn test_validate_priority_range() {
        let base = RtTask {
            exec_cost: 1,
            period: 2,
            ..RtTask::default()
        };
        assert!(matches!(RtTask { priority: 0, ..base }.validate(), Err(_)));
        assert!(matches!(RtTask { priority: 512, ..base }.validate(), Err(_)));
        assert_eq!(RtTask { priority: 1, ..base }.validate(), Ok(()));
    }

    #[test]
    fn test_builder() {
        let result = RtTask::builder()
            .exec_cost(10)
            .period(100)
            .relative_deadline(50)
            .phase(3)
            .cpu(2)
            .priority(7)
            .class(TaskClass::HardRealTime)
            .budget_policy(BudgetPolicy::PreciseEnforcement)
            .release_policy(ReleasePolicy::Periodic)
            .build();

        assert_eq!(
            result,
            Ok(RtTask {
                exec_cost: 10,
                period: 100,
                relative_deadline: 50,
                phase: 3,
                cpu: 2,
                priority: 7,
                cls: TaskClass::HardRealTime,
                budget_policy: BudgetPolicy::PreciseEnforcement,
                release_policy: ReleasePolicy::Periodic,
            })
        );
    }

    #[test]
    fn test_display() {
        let task = RtTask {
            exec_cost: 10_000_000,
            period: 100_000_000,
            cpu: 3,
            ..RtTask::default()
        };
        assert_eq!(
            task.to_string(),
            "rt params:\n\texec_cost:\t10000000\n\tperiod:\t\t100000000\n\tcpu:\t3\n"
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<(), serde_json::Error> {
        let task: RtTask = serde_json::from_str(r#"{"exec_cost": 5, "period": 20, "cls": "hard_real_time"}"#)?;
        assert_eq!(task.exec_cost, 5);
        assert_eq!(task.period, 20);
        assert_eq!(task.cls, TaskClass::HardRealTime);
        assert_eq!(task.priority, LITMUS_LOWEST_PRIORITY);
        assert_eq!(task.release_policy, ReleasePolicy::Sporadic);
        Ok(())
    }
}

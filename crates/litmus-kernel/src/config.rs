//! Backend configuration.

use std::path::PathBuf;

use litmus_errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Default path of the LITMUS^RT control device.
pub const DEFAULT_CONTROL_DEVICE: &str = "/dev/litmus/ctrl";

/// Default first LITMUS^RT system-call number.
///
/// This lies outside the mainline syscall table, so an unconfigured backend
/// fails with `ENOSYS` instead of reaching an unrelated system call. Set the
/// real base from the running kernel's headers.
pub const DEFAULT_SYSCALL_BASE: i64 = 1000;

/// Environment variable overriding [`KernelConfig::control_device`].
pub const ENV_CONTROL_DEVICE: &str = "LITMUS_CTRL_DEVICE";

/// Environment variable overriding the syscall base.
pub const ENV_SYSCALL_BASE: &str = "LITMUS_SYSCALL_BASE";

/// System-call numbers of the LITMUS^RT entry points used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyscallTable {
    /// `set_rt_task_param(pid, param)`
    pub set_rt_task_param: i64,
    /// `od_open(fd, type, obj_id, config)`
    pub od_open: i64,
    /// `od_close(od)`
    pub od_close: i64,
    /// `litmus_lock(od)`
    pub litmus_lock: i64,
    /// `litmus_unlock(od)`
    pub litmus_unlock: i64,
}

impl SyscallTable {
    /// Table laid out from `base` in kernel order.
    pub fn with_base(base: i64) -> Self {
        Self {
            set_rt_task_param: base,
            od_open: base.saturating_add(3),
            od_close: base.saturating_add(4),
            litmus_lock: base.saturating_add(5),
            litmus_unlock: base.saturating_add(6),
        }
    }

    fn numbers(&self) -> [(&'static str, i64); 5] {
        [
            ("set_rt_task_param", self.set_rt_task_param),
            ("od_open", self.od_open),
            ("od_close", self.od_close),
            ("litmus_lock", self.litmus_lock),
            ("litmus_unlock", self.litmus_unlock),
        ]
    }

    /// Check that every number is non-negative and distinct.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending entry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let numbers = self.numbers();
        for (i, (name, nr)) in numbers.iter().enumerate() {
            if *nr < 0 {
                return Err(ValidationError::out_of_range(*name, *nr, 0, i64::MAX));
            }
            if numbers.iter().skip(i + 1).any(|(_, other)| other == nr) {
                return Err(ValidationError::constraint(format!(
                    "syscall number {nr} for {name} is used twice"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SyscallTable {
    fn default() -> Self {
        Self::with_base(DEFAULT_SYSCALL_BASE)
    }
}

/// Configuration for [`PlatformKernel`](crate::PlatformKernel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Control device mapped by the per-thread handshake
    pub control_device: PathBuf,
    /// System-call numbers
    pub syscalls: SyscallTable,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            control_device: PathBuf::from(DEFAULT_CONTROL_DEVICE),
            syscalls: SyscallTable::default(),
        }
    }
}

impl KernelConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by [`ENV_CONTROL_DEVICE`] and [`ENV_SYSCALL_BASE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the syscall base is not an integer or the result
    /// does not validate.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let mut config = Self::default();
        if let Some(device) = lookup(ENV_CONTROL_DEVICE) {
            config.control_device = PathBuf::from(device);
        }
        if let Some(base) = lookup(ENV_SYSCALL_BASE) {
            let base = base.trim().parse::<i64>().map_err(|e| {
                ValidationError::constraint(format!("{ENV_SYSCALL_BASE}={base:?}: {e}"))
            })?;
            config.syscalls = SyscallTable::with_base(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the control device path.
    #[must_use]
    pub fn with_control_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.control_device = path.into();
        self
    }

    /// Set the system-call table.
    #[must_use]
    pub fn with_syscalls(mut self, syscalls: SyscallTable) -> Self {
        self.syscalls = syscalls;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the control device path is empty or the syscall
    /// table is inconsistent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.control_device.as_os_str().is_empty() {
            return Err(ValidationError::required("control_device"));
        }
        self.syscalls.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = KernelConfig::default();
        assert_eq!(config.control_device, PathBuf::from("/dev/litmus/ctrl"));
        assert_eq!(config.syscalls.set_rt_task_param, DEFAULT_SYSCALL_BASE);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_table_layout() {
        let table = SyscallTable::with_base(400);
        assert_eq!(table.set_rt_task_param, 400);
        assert_eq!(table.od_open, 403);
        assert_eq!(table.od_close, 404);
        assert_eq!(table.litmus_lock, 405);
        assert_eq!(table.litmus_unlock, 406);
    }

    #[test]
    fn test_validate_rejects_duplicates_and_negatives() {
        let dup = SyscallTable {
            od_close: 1003,
            ..SyscallTable::default()
        };
        assert!(matches!(
            dup.validate(),
            Err(ValidationError::ConstraintViolation(_))
        ));

        let negative = SyscallTable::with_base(-10);
        assert!(matches!(negative.validate(), Err(_)));
    }

    #[test]
    fn test_validate_rejects_empty_device() {
        let config = KernelConfig::new().with_control_device("");
        assert_eq!(
            config.validate(),
            Err(ValidationError::required("control_device"))
        );
    }

    #[test]
    fn test_env_overrides() -> Result<(), ValidationError> {
        let env: HashMap<&str, &str> = [
            (ENV_CONTROL_DEVICE, "/tmp/ctrl"),
            (ENV_SYSCALL_BASE, " 500 "),
        ]
        .into_iter()
        .collect();

        let config = KernelConfig::from_lookup(|k| env.get(k).map(|v| (*v).to_string()))?;
        assert_eq!(config.control_device, PathBuf::from("/tmp/ctrl"));
        assert_eq!(config.syscalls, SyscallTable::with_base(500));
        Ok(())
    }

    #[test]
    fn test_env_rejects_garbage_base() {
        let result = KernelConfig::from_lookup(|k| {
            (k == ENV_SYSCALL_BASE).then(|| "three hundred".to_string())
        });
        assert!(matches!(result, Err(_)));
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<(), serde_json::Error> {
        let config: KernelConfig = serde_json::from_str(r#"{"control_device": "/dev/ctl"}"#)?;
        assert_eq!(config.control_device, PathBuf::from("/dev/ctl"));
        assert_eq!(config.syscalls, SyscallTable::default());
        Ok(())
    }
}

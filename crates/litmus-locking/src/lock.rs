//! Lock object acquisition.

use std::os::fd::AsFd;
use std::path::Path;

use litmus_errors::{LitmusError, LitmusResult, ValidationError};
use litmus_kernel::{ObjectDescriptor, ObjectDescriptors};
use litmus_types::{LockProtocol, ProtocolConfig, registered_names};
use tracing::{debug, warn};

use crate::namespace::NamespaceOpener;

/// Request a kernel descriptor for lock `lock_id` of type `protocol`.
///
/// The namespace file is opened (and created if absent) only to name the
/// lock; the handle is released before this returns on every path. The
/// returned descriptor belongs to the caller, who must eventually pass it to
/// `od_close`; [`LockHandle`] does that automatically.
///
/// Callers that need the integer contract map the result with
/// [`ObjectDescriptor::as_raw`] and [`LitmusError::code`]: namespace
/// failures give `-1`, kernel failures give the kernel's code.
///
/// # Errors
///
/// - [`LitmusError::Namespace`] if the namespace file cannot be opened; the
///   kernel is not called
/// - [`LitmusError::Kernel`] if the kernel refuses the descriptor
pub fn open_lock<K, N>(
    kernel: &K,
    opener: &N,
    protocol: LockProtocol,
    lock_id: u32,
    namespace: impl AsRef<Path>,
    config: ProtocolConfig,
) -> LitmusResult<ObjectDescriptor>
where
    K: ObjectDescriptors + ?Sized,
    N: NamespaceOpener + ?Sized,
{
    let path = namespace.as_ref();
    let handle = opener.open_namespace(path).map_err(|source| {
        warn!(
            path = %path.display(),
            error = %source,
            "cannot open lock namespace"
        );
        LitmusError::namespace(path, source)
    })?;

    let result = kernel.od_open(handle.as_fd(), protocol, lock_id, config);
    drop(handle);

    match result {
        Ok(od) => {
            debug!(%protocol, lock_id, %od, path = %path.display(), "opened lock");
            Ok(od)
        }
        Err(e) => {
            warn!(%protocol, lock_id, code = e.code(), "kernel refused lock object");
            Err(e.into())
        }
    }
}

/// [`open_lock`] with the protocol given by its registered name.
///
/// # Errors
///
/// Returns [`LitmusError::Validation`] for an unregistered name, otherwise
/// as [`open_lock`].
pub fn open_lock_by_name<K, N>(
    kernel: &K,
    opener: &N,
    protocol: &str,
    lock_id: u32,
    namespace: impl AsRef<Path>,
    config: ProtocolConfig,
) -> LitmusResult<ObjectDescriptor>
where
    K: ObjectDescriptors + ?Sized,
    N: NamespaceOpener + ?Sized,
{
    let protocol: LockProtocol = protocol.parse()?;
    open_lock(kernel, opener, protocol, lock_id, namespace, config)
}

/// [`open_lock`] with the protocol given by its kernel identifier.
///
/// # Errors
///
/// Returns [`LitmusError::Validation`] for an unknown identifier, otherwise
/// as [`open_lock`].
pub fn open_lock_by_id<K, N>(
    kernel: &K,
    opener: &N,
    protocol_id: i32,
    lock_id: u32,
    namespace: impl AsRef<Path>,
    config: ProtocolConfig,
) -> LitmusResult<ObjectDescriptor>
where
    K: ObjectDescriptors + ?Sized,
    N: NamespaceOpener + ?Sized,
{
    let protocol = LockProtocol::from_id(protocol_id).ok_or_else(|| {
        let expected = registered_names()
            .map(|(name, p)| format!("{}={name}", p.id()))
            .collect::<Vec<_>>()
            .join(", ");
        ValidationError::invalid_enum("locking protocol id", protocol_id.to_string(), expected)
    })?;
    open_lock(kernel, opener, protocol, lock_id, namespace, config)
}

/// An open lock object, closed on drop.
#[derive(Debug)]
pub struct LockHandle<'k, K: ObjectDescriptors + ?Sized> {
    kernel: &'k K,
    od: ObjectDescriptor,
    protocol: LockProtocol,
    lock_id: u32,
    owned: bool,
}

impl<'k, K: ObjectDescriptors + ?Sized> LockHandle<'k, K> {
    /// Acquire a descriptor through [`open_lock`] and take ownership of it.
    ///
    /// # Errors
    ///
    /// As [`open_lock`].
    pub fn open<N: NamespaceOpener + ?Sized>(
        kernel: &'k K,
        opener: &N,
        protocol: LockProtocol,
        lock_id: u32,
        namespace: impl AsRef<Path>,
        config: ProtocolConfig,
    ) -> LitmusResult<Self> {
        let od = open_lock(kernel, opener, protocol, lock_id, namespace, config)?;
        Ok(Self::from_descriptor(kernel, od, protocol, lock_id))
    }

    /// Take ownership of a descriptor obtained elsewhere.
    pub fn from_descriptor(
        kernel: &'k K,
        od: ObjectDescriptor,
        protocol: LockProtocol,
        lock_id: u32,
    ) -> Self {
        Self {
            kernel,
            od,
            protocol,
            lock_id,
            owned: true,
        }
    }

    pub fn protocol(&self) -> LockProtocol {
        self.protocol
    }

    pub fn lock_id(&self) -> u32 {
        self.lock_id
    }

    pub fn descriptor(&self) -> ObjectDescriptor {
        self.od
    }

    /// Acquire the lock. It is released when the guard drops.
    ///
    /// # Errors
    ///
    /// Returns the kernel's refusal.
    pub fn lock(&self) -> LitmusResult<LockGuard<'_, K>> {
        self.kernel.litmus_lock(self.od)?;
        Ok(LockGuard {
            kernel: self.kernel,
            od: self.od,
            held: true,
        })
    }

    /// Close the descriptor now, reporting the outcome.
    ///
    /// # Errors
    ///
    /// Returns the kernel's `od_close` failure.
    pub fn close(mut self) -> LitmusResult<()> {
        self.owned = false;
        Ok(self.kernel.od_close(self.od)?)
    }

    /// Give up ownership; the caller becomes responsible for closing.
    pub fn into_raw(mut self) -> ObjectDescriptor {
        self.owned = false;
        self.od
    }
}

impl<K: ObjectDescriptors + ?Sized> Drop for LockHandle<'_, K> {
    fn drop(&mut self) {
        if self.owned
            && let Err(e) = self.kernel.od_close(self.od)
        {
            warn!(od = %self.od, protocol = %self.protocol, code = e.code(), "failed to close lock object");
        }
    }
}

/// A held lock, released on drop.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<'a, K: ObjectDescriptors + ?Sized> {
    kernel: &'a K,
    od: ObjectDescriptor,
    held: bool,
}

impl<K: ObjectDescriptors + ?Sized> LockGuard<'_, K> {
    pub fn descriptor(&self) -> ObjectDescriptor {
        self.od
    }

    /// Release the lock now, reporting the outcome.
    ///
    /// # Errors
    ///
    /// Returns the kernel's `litmus_unlock` failure.
    pub fn unlock(mut self) -> LitmusResult<()> {
        self.held = false;
        Ok(self.kernel.litmus_unlock(self.od)?)
    }
}

impl<K: ObjectDescriptors + ?Sized> Drop for LockGuard<'_, K> {
    fn drop(&mut self) {
        if self.held
            && let Err(e) = self.kernel.litmus_unlock(self.od)
        {
            warn!(od = %self.od, code = e.code(), "failed to release lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsNamespace;
    use litmus_errors::{KernelOp, FAILURE_SENTINEL};
    use litmus_test_helpers::mock::{KernelCall, MockKernel};
    use litmus_test_helpers::{must, must_err};
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_open_lock_logs_success() {
        let dir = must(tempfile::tempdir());
        let kernel = MockKernel::new();

        let od = must(open_lock(
            &kernel,
            &FsNamespace::new(),
            LockProtocol::Srp,
            7,
            dir.path().join("ns"),
            ProtocolConfig::None,
        ));

        assert_eq!(od.as_raw(), 0);
        assert!(logs_contain("opened lock"));
        assert!(logs_contain("protocol=SRP"));
    }

    #[test]
    #[traced_test]
    fn test_namespace_failure_skips_kernel() {
        let dir = must(tempfile::tempdir());
        let kernel = MockKernel::new();

        let err = must_err(open_lock(
            &kernel,
            &FsNamespace::new(),
            LockProtocol::Fmlp,
            0,
            dir.path().join("missing/ns"),
            ProtocolConfig::None,
        ));

        assert!(matches!(err, LitmusError::Namespace { .. }));
        assert_eq!(err.code(), FAILURE_SENTINEL);
        assert!(kernel.calls().is_empty());
        assert!(logs_contain("cannot open lock namespace"));
    }

    #[test]
    fn test_kernel_code_passes_through() {
        let dir = must(tempfile::tempdir());
        let kernel = MockKernel::new().failing(KernelOp::ObjectOpen, -22);

        let err = must_err(open_lock(
            &kernel,
            &FsNamespace::new(),
            LockProtocol::Dpcp,
            1,
            dir.path().join("ns"),
            ProtocolConfig::Cpu(2),
        ));
        assert_eq!(err.code(), -22);
        assert!(matches!(
            kernel.calls().first(),
            Some(KernelCall::OdOpen { protocol: LockProtocol::Dpcp, lock_id: 1, config: ProtocolConfig::Cpu(2), .. })
        ));
    }

    #[test]
    fn test_by_name_and_id() {
        let dir = must(tempfile::tempdir());
        let kernel = MockKernel::new();
        let ns = FsNamespace::new();
        let path = dir.path().join("ns");

        must(open_lock_by_name(&kernel, &ns, "MPCP-VS", 3, &path, ProtocolConfig::None));
        must(open_lock_by_id(&kernel, &ns, 5, 4, &path, ProtocolConfig::None));

        let protocols: Vec<_> = kernel
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                KernelCall::OdOpen { protocol, .. } => Some(protocol),
                _ => None,
            })
            .collect();
        assert_eq!(protocols, [LockProtocol::MpcpVs, LockProtocol::Pcp]);

        let err = must_err(open_lock_by_name(&kernel, &ns, "nope", 0, &path, ProtocolConfig::None));
        assert!(matches!(err, LitmusError::Validation(_)));
        let err = must_err(open_lock_by_id(&kernel, &ns, 17, 0, &path, ProtocolConfig::None));
        assert_eq!(err.code(), FAILURE_SENTINEL);
    }

    #[test]
    fn test_handle_closes_on_drop() {
        let dir = must(tempfile::tempdir());
        let kernel = MockKernel::new();
        {
            let handle = must(LockHandle::open(
                &kernel,
                &FsNamespace::new(),
                LockProtocol::Fmlp,
                0,
                dir.path().join("ns"),
                ProtocolConfig::None,
            ));
            let guard = must(handle.lock());
            assert_eq!(kernel.held_locks(), [guard.descriptor()]);
        }
        assert!(kernel.held_locks().is_empty());
        assert!(kernel.open_descriptors().is_empty());
        assert_eq!(kernel.call_count(KernelOp::Unlock), 1);
        assert_eq!(kernel.call_count(KernelOp::ObjectClose), 1);
    }

    #[test]
    #[traced_test]
    fn test_failed_close_is_logged() {
        let kernel = MockKernel::new();
        let handle = LockHandle::from_descriptor(
            &kernel,
            ObjectDescriptor::from_raw(9),
            LockProtocol::Pcp,
            0,
        );
        // descriptor 9 was never opened on the mock
        assert!(matches!(handle.lock(), Err(_)));
        drop(handle);
        assert!(logs_contain("failed to close lock object"));
    }
}

//! RAII behaviour of lock handles and guards.

use litmus_errors::KernelOp;
use litmus_kernel::ObjectDescriptors;
use litmus_locking::prelude::*;
use litmus_test_helpers::prelude::*;
use litmus_types::{LockProtocol, ProtocolConfig};

fn open_handle<'k>(
    kernel: &'k MockKernel,
    dir: &tempfile::TempDir,
) -> Result<LockHandle<'k, MockKernel>, litmus_errors::LitmusError> {
    LockHandle::open(
        kernel,
        &CountingNamespace::new(),
        LockProtocol::Fmlp,
        0,
        dir.path().join("ns"),
        ProtocolConfig::None,
    )
}

#[test]
fn guard_unlocks_and_handle_closes() -> TestResult {
    let dir = tempfile::tempdir()?;
    let kernel = MockKernel::new();

    let handle = open_handle(&kernel, &dir)?;
    {
        let _guard = handle.lock()?;
        assert_eq!(kernel.held_locks(), [handle.descriptor()]);
    }
    assert!(kernel.held_locks().is_empty());
    drop(handle);

    assert!(kernel.open_descriptors().is_empty());
    assert_eq!(kernel.call_count(KernelOp::Lock), 1);
    assert_eq!(kernel.call_count(KernelOp::Unlock), 1);
    assert_eq!(kernel.call_count(KernelOp::ObjectClose), 1);
    Ok(())
}

#[test]
fn explicit_unlock_does_not_unlock_twice() -> TestResult {
    let dir = tempfile::tempdir()?;
    let kernel = MockKernel::new();
    let handle = open_handle(&kernel, &dir)?;

    handle.lock()?.unlock()?;
    handle.close()?;

    assert_eq!(kernel.call_count(KernelOp::Unlock), 1);
    assert_eq!(kernel.call_count(KernelOp::ObjectClose), 1);
    Ok(())
}

#[test]
fn relocking_after_release() -> TestResult {
    let dir = tempfile::tempdir()?;
    let kernel = MockKernel::new();
    let handle = open_handle(&kernel, &dir)?;

    for _ in 0..10 {
        let guard = handle.lock()?;
        drop(guard);
    }
    assert_eq!(kernel.call_count(KernelOp::Lock), 10);
    assert_eq!(kernel.call_count(KernelOp::Unlock), 10);
    Ok(())
}

#[test]
fn failed_lock_yields_no_guard() -> TestResult {
    let dir = tempfile::tempdir()?;
    let kernel = MockKernel::new();
    let handle = open_handle(&kernel, &dir)?;

    kernel.fail(KernelOp::Lock, -35);
    let err = must_err(handle.lock());
    assert_eq!(err.code(), -35);
    assert_eq!(kernel.call_count(KernelOp::Unlock), 0);
    Ok(())
}

#[test]
fn into_raw_transfers_ownership() -> TestResult {
    let dir = tempfile::tempdir()?;
    let kernel = MockKernel::new();

    let od = open_handle(&kernel, &dir)?.into_raw();
    assert_eq!(kernel.open_descriptors(), [od]);
    assert_eq!(kernel.call_count(KernelOp::ObjectClose), 0);

    kernel.od_close(od)?;
    Ok(())
}

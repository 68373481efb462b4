use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use mixload::{BackendAdapter, HarnessError, RunConfig, WorkloadDriver};

/// Backend double for lifecycle behavior: configurable setup/teardown
/// failures, counts operation calls.
struct LifecycleBackend {
    fail_setup: bool,
    fail_teardown: bool,
    setup_called: AtomicBool,
    teardown_called: AtomicBool,
    ops: AtomicUsize,
}

impl LifecycleBackend {
    fn new() -> Self {
        Self {
            fail_setup: false,
            fail_teardown: false,
            setup_called: AtomicBool::new(false),
            teardown_called: AtomicBool::new(false),
            ops: AtomicUsize::new(0),
        }
    }

    fn failing_setup() -> Self {
        Self {
            fail_setup: true,
            ..Self::new()
        }
    }

    fn failing_teardown() -> Self {
        Self {
            fail_teardown: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl BackendAdapter for LifecycleBackend {
    async fn setup(&self) -> Result<()> {
        self.setup_called.store(true, Ordering::SeqCst);
        if self.fail_setup {
            bail!("injected setup failure");
        }
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        self.teardown_called.store(true, Ordering::SeqCst);
        if self.fail_teardown {
            bail!("injected teardown failure");
        }
        Ok(())
    }

    async fn read(&self, _id: u64) -> Result<()> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert(&self, _id: u64) -> Result<()> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, _id: u64) -> Result<()> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn short_config() -> RunConfig {
    RunConfig {
        run_for: Duration::from_millis(100),
        concurrency: 8,
        key_space: 10,
        write_ratio: 0.5,
        seed: Some(7),
    }
}

#[tokio::test]
async fn setup_failure_is_fatal_and_dispatches_nothing() {
    let adapter = Arc::new(LifecycleBackend::failing_setup());
    let driver = WorkloadDriver::new(short_config());

    let err = mixload::run_against(&driver, adapter.clone())
        .await
        .err()
        .expect("setup failure must abort the run");
    assert!(matches!(err, HarnessError::Setup(_)));
    assert_eq!(adapter.ops.load(Ordering::SeqCst), 0);
    assert!(!adapter.teardown_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn teardown_failure_is_not_fatal() {
    let adapter = Arc::new(LifecycleBackend::failing_teardown());
    let driver = WorkloadDriver::new(short_config());

    let summary = mixload::run_against(&driver, adapter.clone())
        .await
        .expect("teardown failure must not discard the run's statistics");

    assert!(adapter.teardown_called.load(Ordering::SeqCst));
    let total = summary.reads.tries + summary.writes.tries;
    assert!(total > 0);
    assert_eq!(total as usize, adapter.ops.load(Ordering::SeqCst));
}

#[tokio::test]
async fn invalid_config_is_rejected_before_setup() {
    let adapter = Arc::new(LifecycleBackend::new());
    let driver = WorkloadDriver::new(RunConfig {
        write_ratio: -0.1,
        ..short_config()
    });

    let err = mixload::run_against(&driver, adapter.clone())
        .await
        .err()
        .expect("must fail");
    assert!(matches!(err, HarnessError::InvalidConfig(_)));
    assert!(!adapter.setup_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn summary_reflects_both_classes() {
    let adapter = Arc::new(LifecycleBackend::new());
    let driver = WorkloadDriver::new(short_config());

    let summary = mixload::run_against(&driver, adapter.clone()).await.unwrap();

    assert_eq!(summary.reads.successes, summary.reads.tries);
    assert_eq!(summary.writes.successes, summary.writes.tries);
    assert!(summary.reads.tries > 0);
    assert!(summary.writes.tries > 0);
    assert!(summary.reads.latency.is_some());
    assert!(summary.writes.latency.is_some());
}

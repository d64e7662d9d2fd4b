// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The top-level periodic scheduling loop.
//!
//! Each cycle runs single-threaded and cooperative: the update gate, then
//! the always-run component, then every runnable component in sequence.
//! The next tick is not awaited until the whole cycle has completed. No
//! component failure aborts a cycle; only a failure in the scheduler's own
//! bookkeeping (the gate marker write) can.
//!
//! No deadline is attached to an individual component here: a hung
//! external dependency inside a check blocks the cycle. Callers who need
//! isolation wrap entry points in `tokio::time::timeout` at registration.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vigil_core::{ComponentRegistry, InvocationFlags, UpdateProbe, VigilError};

use crate::dispatcher::Dispatcher;
use crate::update_gate::UpdateGate;

/// How the scheduler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerMode {
    /// Execute exactly one cycle, then return.
    Once,
    /// Tick at a fixed interval until cancelled.
    Continuous,
    /// Print the runnable names without executing anything.
    ListOnly,
}

/// Scheduler construction options.
pub struct SchedulerOptions {
    /// Tick interval for continuous mode.
    pub interval: Duration,
    /// Name of the component executed unconditionally every cycle,
    /// whether or not it appears in the runnable set.
    pub always_run: String,
    /// Platform tag compared against descriptor constraints; normally
    /// `std::env::consts::OS`.
    pub platform: String,
    /// Flags propagated into every dispatch this scheduler performs.
    pub flags: InvocationFlags,
}

/// The periodic scheduler.
pub struct Scheduler {
    registry: Arc<ComponentRegistry>,
    dispatcher: Dispatcher,
    update_gate: UpdateGate,
    update_probe: Arc<dyn UpdateProbe>,
    options: SchedulerOptions,
}

impl Scheduler {
    pub fn new(
        registry: Arc<ComponentRegistry>,
        dispatcher: Dispatcher,
        update_gate: UpdateGate,
        update_probe: Arc<dyn UpdateProbe>,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            update_gate,
            update_probe,
            options,
        }
    }

    /// Runs the scheduler in the given mode until done or cancelled.
    pub async fn run(
        &self,
        mode: SchedulerMode,
        cancel: CancellationToken,
    ) -> Result<(), VigilError> {
        match mode {
            SchedulerMode::ListOnly => {
                for name in self.registry.runnable_names(&self.options.platform) {
                    println!("{name}");
                }
                Ok(())
            }
            SchedulerMode::Once => self.run_cycle().await,
            SchedulerMode::Continuous => {
                info!(
                    interval_secs = self.options.interval.as_secs(),
                    "scheduler running"
                );
                let mut ticker = tokio::time::interval(self.options.interval);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            if let Err(e) = self.run_cycle().await {
                                // Bookkeeping failure aborts this cycle only;
                                // the loop itself runs until shutdown.
                                error!(error = %e, "cycle aborted");
                            }
                        }
                        _ = cancel.cancelled() => {
                            info!("shutdown signal received, stopping scheduler");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// One full cycle: gate, always-run component, runnable components.
    async fn run_cycle(&self) -> Result<(), VigilError> {
        debug!("cycle start");

        if self.update_gate.is_due() {
            info!("update gate due");
            match self.update_probe.run().await {
                Ok(()) => self.update_gate.mark_fired()?,
                Err(e) => warn!(error = %e, "update probe failed, gate not advanced"),
            }
        }

        match self.registry.lookup(&self.options.always_run) {
            Some(descriptor) => {
                self.dispatcher
                    .dispatch(&descriptor, self.options.flags)
                    .await;
            }
            None => error!(
                component = self.options.always_run.as_str(),
                "always-run component missing from registry"
            ),
        }

        let runnable = self.registry.runnable_names(&self.options.platform);
        debug!(count = runnable.len(), "runnable components computed");

        for name in &runnable {
            // Already executed unconditionally above.
            if *name == self.options.always_run {
                continue;
            }
            match self.registry.lookup(name) {
                Some(descriptor) => {
                    self.dispatcher
                        .dispatch(&descriptor, self.options.flags)
                        .await;
                }
                None => warn!(component = name.as_str(), "runnable name vanished before dispatch"),
            }
        }

        debug!("cycle complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use vigil_core::{ComponentDescriptor, ExecuteFn, Platform};

    use super::*;

    struct CountingProbe {
        runs: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl UpdateProbe for CountingProbe {
        async fn run(&self) -> Result<(), VigilError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(VigilError::Internal("probe failed".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn recording_execute(log: Arc<Mutex<Vec<String>>>, name: &'static str) -> ExecuteFn {
        Arc::new(move || {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push(name.to_string());
                Ok(())
            })
        })
    }

    fn failing_execute() -> ExecuteFn {
        Arc::new(|| {
            Box::pin(async {
                Err(VigilError::Check {
                    message: "boom".to_string(),
                    source: None,
                })
            })
        })
    }

    fn scheduler_with(
        registry: Arc<ComponentRegistry>,
        marker_dir: &tempfile::TempDir,
        probe: Arc<dyn UpdateProbe>,
    ) -> Scheduler {
        Scheduler::new(
            registry,
            Dispatcher::with_capabilities("host1", false, None),
            UpdateGate::new(marker_dir.path().join("marker")),
            probe,
            SchedulerOptions {
                interval: Duration::from_millis(10),
                always_run: "agent-version".to_string(),
                platform: "testos".to_string(),
                flags: InvocationFlags::default(),
            },
        )
    }

    #[tokio::test]
    async fn cycle_runs_always_run_first_then_runnables_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(ComponentRegistry::new());
        registry
            .register(ComponentDescriptor::with_execute(
                "agent-version",
                recording_execute(log.clone(), "agent-version"),
            ))
            .unwrap();
        registry
            .register(ComponentDescriptor::with_execute(
                "b-check",
                recording_execute(log.clone(), "b-check"),
            ))
            .unwrap();
        registry
            .register(ComponentDescriptor::with_execute(
                "a-check",
                recording_execute(log.clone(), "a-check"),
            ))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(CountingProbe {
            runs: AtomicUsize::new(0),
            fail: false,
        });
        let scheduler = scheduler_with(registry, &dir, probe);

        scheduler
            .run(SchedulerMode::Once, CancellationToken::new())
            .await
            .unwrap();

        // Always-run executes first and is not repeated by the runnable
        // sweep even though it is itself runnable.
        assert_eq!(
            *log.lock().unwrap(),
            vec!["agent-version", "a-check", "b-check"]
        );
    }

    #[tokio::test]
    async fn always_run_executes_even_when_filtered_out() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(ComponentRegistry::new());
        registry
            .register(
                ComponentDescriptor::with_execute(
                    "agent-version",
                    recording_execute(log.clone(), "agent-version"),
                )
                .platform(Platform::Os("otheros")),
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(CountingProbe {
            runs: AtomicUsize::new(0),
            fail: false,
        });
        let scheduler = scheduler_with(registry, &dir, probe);

        scheduler
            .run(SchedulerMode::Once, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["agent-version"]);
    }

    #[tokio::test]
    async fn component_failure_does_not_stop_the_cycle() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(ComponentRegistry::new());
        registry
            .register(ComponentDescriptor::with_execute(
                "agent-version",
                recording_execute(log.clone(), "agent-version"),
            ))
            .unwrap();
        registry
            .register(ComponentDescriptor::with_execute(
                "a-broken",
                failing_execute(),
            ))
            .unwrap();
        registry
            .register(ComponentDescriptor::with_execute(
                "z-after",
                recording_execute(log.clone(), "z-after"),
            ))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(CountingProbe {
            runs: AtomicUsize::new(0),
            fail: false,
        });
        let scheduler = scheduler_with(registry, &dir, probe);

        scheduler
            .run(SchedulerMode::Once, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["agent-version", "z-after"]);
    }

    #[tokio::test]
    async fn list_only_executes_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(ComponentRegistry::new());
        registry
            .register(ComponentDescriptor::with_execute(
                "agent-version",
                recording_execute(log.clone(), "agent-version"),
            ))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(CountingProbe {
            runs: AtomicUsize::new(0),
            fail: false,
        });
        let runs_handle = probe.clone();
        let scheduler = scheduler_with(registry, &dir, probe);

        scheduler
            .run(SchedulerMode::ListOnly, CancellationToken::new())
            .await
            .unwrap();

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(runs_handle.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_probe_fires_once_within_the_window() {
        let registry = Arc::new(ComponentRegistry::new());
        registry
            .register(ComponentDescriptor::with_execute(
                "agent-version",
                Arc::new(|| Box::pin(async { Ok(()) })),
            ))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(CountingProbe {
            runs: AtomicUsize::new(0),
            fail: false,
        });
        let runs_handle = probe.clone();
        let scheduler = scheduler_with(registry, &dir, probe);

        for _ in 0..3 {
            scheduler
                .run(SchedulerMode::Once, CancellationToken::new())
                .await
                .unwrap();
        }

        // Due on the first cycle (no marker), then gated for 24h.
        assert_eq!(runs_handle.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_update_probe_leaves_the_gate_open() {
        let registry = Arc::new(ComponentRegistry::new());
        registry
            .register(ComponentDescriptor::with_execute(
                "agent-version",
                Arc::new(|| Box::pin(async { Ok(()) })),
            ))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(CountingProbe {
            runs: AtomicUsize::new(0),
            fail: true,
        });
        let runs_handle = probe.clone();
        let scheduler = scheduler_with(registry, &dir, probe);

        for _ in 0..2 {
            scheduler
                .run(SchedulerMode::Once, CancellationToken::new())
                .await
                .unwrap();
        }

        assert_eq!(runs_handle.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_always_run_component_does_not_crash_the_cycle() {
        let registry = Arc::new(ComponentRegistry::new());
        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(CountingProbe {
            runs: AtomicUsize::new(0),
            fail: false,
        });
        let scheduler = scheduler_with(registry, &dir, probe);

        scheduler
            .run(SchedulerMode::Once, CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn continuous_mode_stops_on_cancellation() {
        let registry = Arc::new(ComponentRegistry::new());
        registry
            .register(ComponentDescriptor::with_execute(
                "agent-version",
                Arc::new(|| Box::pin(async { Ok(()) })),
            ))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let probe = Arc::new(CountingProbe {
            runs: AtomicUsize::new(0),
            fail: false,
        });
        let scheduler = scheduler_with(registry, &dir, probe);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            scheduler.run(SchedulerMode::Continuous, cancel),
        )
        .await
        .expect("scheduler should stop promptly on cancellation")
        .unwrap();
    }
}

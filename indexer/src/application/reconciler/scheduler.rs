use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::application::reconciler::{Reconciler, StreamRegistry};
use crate::config::IndexerConfig;

/// Periodic trigger: one timer task per stream
pub struct Scheduler {
    period: Duration,
    run_on_startup: bool,
    tasks: Vec<(String, JoinHandle<()>)>,
    stopping: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(period: Duration, run_on_startup: bool) -> Self {
        Self {
            // tokio intervals reject a zero period
            period: period.max(Duration::from_millis(1)),
            run_on_startup,
            tasks: Vec::new(),
            stopping: watch::channel(false).0,
        }
    }

    pub fn from_config(config: &IndexerConfig) -> Self {
        Self::new(config.reconcile_interval(), config.run_on_startup)
    }

    /// Start a timer for every stream in the registry
    pub fn start_all(&mut self, registry: &StreamRegistry) {
        for reconciler in registry.reconcilers() {
            info!(
                stream = %reconciler.name(),
                period_ms = self.period.as_millis() as u64,
                run_on_startup = self.run_on_startup,
                "starting reconcile timer"
            );
            let handle = spawn_timer(
                reconciler.clone(),
                self.period,
                self.run_on_startup,
                self.stopping.subscribe(),
            );
            self.tasks.push((reconciler.name().to_string(), handle));
        }
    }

    /// Stop every timer, giving in-flight runs until `grace` runs out to
    /// finish. Runs still going after that are aborted.
    pub async fn shutdown(&mut self, grace: Duration) {
        self.stopping.send_replace(true);
        let deadline = Instant::now() + grace;

        for (stream, mut handle) in self.tasks.drain(..) {
            match time::timeout_at(deadline, &mut handle).await {
                Ok(_) => info!(stream = %stream, "reconcile timer stopped"),
                Err(_) => {
                    warn!(stream = %stream, "run still in flight after grace period, aborting");
                    handle.abort();
                }
            }
        }
    }

    /// Abort all timers; an in-flight run is dropped at its next await point
    /// and its stream lease handed back
    pub fn stop_all(&mut self) {
        for (stream, handle) in self.tasks.drain(..) {
            info!(stream = %stream, "stopping reconcile timer");
            handle.abort();
        }
    }

    pub fn running(&self) -> usize {
        self.tasks.iter().filter(|(_, h)| !h.is_finished()).count()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn spawn_timer(
    reconciler: Arc<Reconciler>,
    period: Duration,
    run_on_startup: bool,
    mut stopping: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The first tick completes immediately
        if !run_on_startup {
            ticker.tick().await;
        }

        // A run in progress is never interrupted by the stop signal
        loop {
            tokio::select! {
                _ = ticker.tick() => run_and_log(&reconciler).await,
                _ = stopping.changed() => break,
            }
        }
    })
}

/// Timer runs report failures through the log only
async fn run_and_log(reconciler: &Reconciler) {
    match reconciler.reconcile().await {
        Ok(Some(event)) => info!(
            stream = %reconciler.name(),
            block = event.block_number,
            event = %event.name,
            "timer run recorded new events"
        ),
        Ok(None) => debug!(stream = %reconciler.name(), "timer run found nothing new"),
        Err(e) => error!(stream = %reconciler.name(), error = %e, "timer run failed"),
    }
}

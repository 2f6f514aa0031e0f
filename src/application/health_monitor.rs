//! Connection Health Monitor - periodic prober and status classifier.
//!
//! A single actor task owns the [`HealthTracker`], the probe ticker, the
//! in-flight probe and the "revert to Online" timer. Handles talk to it over
//! a command channel; the status is published through a `watch` channel so
//! observers always see whole values.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `probe_interval` | 8s | Time between probes; the first probe runs one interval after `start` |
//! | `probe_timeout` | 7s | A probe still pending after this counts as a failure |
//! | `back_online_grace` | 3s | Time spent in `BackOnline` before reverting to `Online` |
//!
//! A tick that arrives while the previous probe is still pending is skipped,
//! so probes never overlap.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::timer_slot::TimerSlot;
use crate::config::HealthConfig;
use crate::domain::health::{ConnectionStatus, HealthTracker, HealthTransition, ProbeOutcome};
use crate::ports::{ConnectivityProbe, HealthReporter};

/// Timing of the health monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthMonitorConfig {
    pub probe_interval: Duration,
    pub probe_timeout: Duration,
    pub back_online_grace: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(8),
            probe_timeout: Duration::from_secs(7),
            back_online_grace: Duration::from_secs(3),
        }
    }
}

impl From<&HealthConfig> for HealthMonitorConfig {
    fn from(config: &HealthConfig) -> Self {
        Self {
            probe_interval: config.probe_interval(),
            probe_timeout: config.probe_timeout(),
            back_online_grace: config.back_online_grace(),
        }
    }
}

enum MonitorCommand {
    Start,
    Stop(oneshot::Sender<()>),
    HardFailure,
}

/// Handle to a running health monitor. Cheap to clone.
///
/// The actor task ends once every handle has been dropped.
#[derive(Clone)]
pub struct HealthMonitor {
    commands: mpsc::UnboundedSender<MonitorCommand>,
    status: watch::Receiver<ConnectionStatus>,
}

impl HealthMonitor {
    /// Spawns the monitor actor in its stopped state. Must be called inside
    /// a Tokio runtime.
    pub fn spawn(probe: Arc<dyn ConnectivityProbe>, config: HealthMonitorConfig) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Online);

        let actor = MonitorActor {
            probe,
            config,
            commands: commands_rx,
            status: status_tx,
            tracker: HealthTracker::new(),
            ticker: None,
            in_flight: None,
            revert: TimerSlot::new(),
        };
        tokio::spawn(actor.run());

        Self {
            commands: commands_tx,
            status: status_rx,
        }
    }

    /// Begins periodic probing. Calling it while running is a no-op.
    pub fn start(&self) {
        self.send(MonitorCommand::Start);
    }

    /// Stops probing, cancels the revert timer and resets to `Online`.
    ///
    /// Resolves once the actor has applied the reset.
    pub async fn stop(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(MonitorCommand::Stop(ack_tx));
        let _ = ack_rx.await;
    }

    /// Forces `Offline` after a connectivity-class error seen elsewhere.
    pub fn report_hard_failure(&self) {
        self.send(MonitorCommand::HardFailure);
    }

    /// Current status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Returns true only while `Offline`.
    pub fn is_offline(&self) -> bool {
        self.status().is_offline()
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    fn send(&self, command: MonitorCommand) {
        if self.commands.send(command).is_err() {
            warn!("health monitor task is gone");
        }
    }
}

impl HealthReporter for HealthMonitor {
    fn report_hard_failure(&self) {
        HealthMonitor::report_hard_failure(self);
    }
}

struct MonitorActor {
    probe: Arc<dyn ConnectivityProbe>,
    config: HealthMonitorConfig,
    commands: mpsc::UnboundedReceiver<MonitorCommand>,
    status: watch::Sender<ConnectionStatus>,
    tracker: HealthTracker,
    ticker: Option<Interval>,
    in_flight: Option<BoxFuture<'static, ProbeOutcome>>,
    revert: TimerSlot,
}

impl MonitorActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },

                outcome = next_outcome(&mut self.in_flight) => {
                    debug!(?outcome, "probe finished");
                    let transition = self.tracker.record_probe(outcome);
                    self.apply(transition);
                }

                _ = next_tick(&mut self.ticker) => self.launch_probe(),

                _ = self.revert.fired() => {
                    let transition = self.tracker.revert_elapsed();
                    self.apply(transition);
                }
            }
        }
        debug!("health monitor stopped: all handles dropped");
    }

    fn handle_command(&mut self, command: MonitorCommand) {
        match command {
            MonitorCommand::Start => {
                if self.ticker.is_some() {
                    return;
                }
                let period = self.config.probe_interval;
                let mut ticker = time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.ticker = Some(ticker);
                info!(interval_secs = period.as_secs(), "health monitor started");
            }
            MonitorCommand::Stop(ack) => {
                self.ticker = None;
                self.in_flight = None;
                self.revert.cancel();
                let transition = self.tracker.reset();
                self.publish(transition);
                info!("health monitor stopped");
                let _ = ack.send(());
            }
            MonitorCommand::HardFailure => {
                if self.ticker.is_none() {
                    debug!("hard failure ignored while monitor is stopped");
                    return;
                }
                let transition = self.tracker.record_hard_failure();
                self.apply(transition);
            }
        }
    }

    fn launch_probe(&mut self) {
        if self.in_flight.is_some() {
            debug!("previous probe still pending, skipping tick");
            return;
        }

        let probe = Arc::clone(&self.probe);
        let timeout = self.config.probe_timeout;
        self.in_flight = Some(Box::pin(async move {
            match time::timeout(timeout, probe.probe()).await {
                Ok(Ok(())) => ProbeOutcome::Success,
                Ok(Err(error)) => {
                    debug!(%error, "probe failed");
                    ProbeOutcome::Failure
                }
                Err(_) => {
                    debug!(timeout_secs = timeout.as_secs(), "probe timed out");
                    ProbeOutcome::Failure
                }
            }
        }));
    }

    fn apply(&mut self, transition: HealthTransition) {
        if transition.changed() {
            self.revert.cancel();
        }
        if transition.arms_revert() {
            self.revert.arm_if_idle(self.config.back_online_grace);
        }
        self.publish(transition);
    }

    fn publish(&self, transition: HealthTransition) {
        if !transition.changed() {
            return;
        }
        info!(
            previous = %transition.previous,
            status = %transition.current,
            failures = self.tracker.consecutive_failures(),
            "connection status changed"
        );
        self.status.send_replace(transition.current);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

async fn next_outcome(in_flight: &mut Option<BoxFuture<'static, ProbeOutcome>>) -> ProbeOutcome {
    match in_flight.as_mut() {
        Some(probe) => {
            let outcome = probe.await;
            *in_flight = None;
            outcome
        }
        None => future::pending().await,
    }
}

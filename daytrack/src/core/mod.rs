use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::{error, info, warn};
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;

use crate::error::TrackerError;

pub mod location;
pub mod sampler;
pub mod window;

use sampler::{SampleOutcome, Sampler};

/// Events broadcast to the registered observer.
#[derive(Clone, Debug)]
pub enum CoreEvent {
    /// Raw address resolved for the current fix, possibly empty. Emitted
    /// before the record is written.
    AddressResolved(String),
    SampleRecorded {
        path: String,
        value: String,
    },
}

enum CoreCommand {
    SampleNow,
    Quit,
}

/// Owns the sampler and drives it from a background task on a fixed
/// period. Invocations are serialized: a sample runs to completion
/// before the next tick is honored, and missed ticks are skipped.
pub struct TrackerCore {
    sampler: Sampler,
    command_tx: mpsc::Sender<CoreCommand>,
    // Sync as well as Send: the sampler notifies mid-invocation, so the
    // callback is held across await points of the background task.
    on_core_event: Option<Box<dyn Fn(CoreEvent) + Send + Sync>>,
}

impl TrackerCore {
    pub fn new(sampler: Sampler, sample_interval: Duration) -> Arc<Mutex<Self>> {
        let (tx, mut rx) = mpsc::channel::<CoreCommand>(1);
        let core = Arc::new(Mutex::new(Self {
            sampler,
            command_tx: tx,
            on_core_event: None,
        }));

        let core_clone = core.clone();
        tokio::spawn(async move {
            info!("tracker background task started");

            let mut sample_ival = tokio::time::interval(sample_interval);
            sample_ival.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = sample_ival.tick() => {
                        core_clone.lock().await.run_scheduled_sample().await;
                    }
                    cmd = rx.recv() => {
                        match cmd {
                            Some(CoreCommand::SampleNow) => {
                                core_clone.lock().await.run_scheduled_sample().await;
                            }
                            Some(CoreCommand::Quit) | None => break,
                        }
                    }
                }
            }

            info!("tracker background task stopped");
        });
        core
    }

    /// Runs one sampling invocation now. Failures are logged per the
    /// error taxonomy and never abort the loop.
    pub async fn run_scheduled_sample(&self) {
        let now = Local::now().naive_local();
        let outcome = self
            .sampler
            .sample_once(now, |event| self.broadcast(event))
            .await;
        match outcome {
            Ok(SampleOutcome::Recorded { path, value }) => {
                self.broadcast(CoreEvent::SampleRecorded { path, value });
            }
            Ok(SampleOutcome::Skipped) => {}
            Err(e @ TrackerError::PermissionDenied(_)) => error!("{e}"),
            Err(e @ (TrackerError::FixTimeout(_) | TrackerError::FixUnavailable(_))) => {
                warn!("{e}")
            }
            Err(e) => error!("sampling invocation failed: {e}"),
        }
    }

    /// Requests an out-of-schedule sampling invocation.
    pub fn sample_now(&self) {
        _ = self.command_tx.try_send(CoreCommand::SampleNow);
    }

    pub fn on_core_event<F>(&mut self, f: F)
    where
        F: Fn(CoreEvent) + Send + Sync + 'static,
    {
        self.on_core_event = Some(Box::new(f));
    }

    pub async fn quit(&self) {
        _ = self.command_tx.send(CoreCommand::Quit).await;
    }

    fn broadcast(&self, event: CoreEvent) {
        if let Some(on_core_event) = &self.on_core_event {
            on_core_event(event);
        }
    }
}

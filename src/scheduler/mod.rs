//! Periodic collection loop
//!
//! The loop is a two-state machine. After a successful run it sleeps the
//! regular interval (`Running`); after a failed or panicking run it sleeps
//! the shorter backoff (`Backoff`) and tries again. Nothing is carried from
//! one attempt to the next, so the backoff never grows.
//!
//! A sleep ends early when the shared trigger is notified, which is how the
//! API requests an immediate collection.

use crate::collector::Collector;
use crate::config::Config;
use crate::AuditError;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// State of the collection loop after the latest attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Last attempt succeeded, next one after the regular interval
    Running,

    /// Last attempt failed, next one after the backoff delay
    Backoff,
}

/// Timing and batch size of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub interval: Duration,
    pub backoff: Duration,
    pub limit: usize,
}

impl ScheduleConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.scheduler.interval(),
            backoff: config.scheduler.backoff(),
            limit: config.collector.limit,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            backoff: Duration::from_secs(60),
            limit: 5,
        }
    }
}

/// Source of delays between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs a collector forever on a fixed schedule
pub struct CollectionLoop {
    collector: Arc<dyn Collector>,
    config: ScheduleConfig,
    sleeper: Arc<dyn Sleeper>,
    trigger: Arc<Notify>,
    state: LoopState,
}

impl CollectionLoop {
    /// Creates a loop that sleeps on the tokio timer
    pub fn new(collector: Arc<dyn Collector>, config: ScheduleConfig, trigger: Arc<Notify>) -> Self {
        Self::with_sleeper(collector, config, trigger, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        collector: Arc<dyn Collector>,
        config: ScheduleConfig,
        trigger: Arc<Notify>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            collector,
            config,
            sleeper,
            trigger,
            state: LoopState::Running,
        }
    }

    /// State after the latest attempt (`Running` before the first one)
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Delay before the next attempt, given the current state
    pub fn next_delay(&self) -> Duration {
        match self.state {
            LoopState::Running => self.config.interval,
            LoopState::Backoff => self.config.backoff,
        }
    }

    /// Runs one collection attempt and updates the state
    ///
    /// Errors and panics escaping the collector are logged here and never
    /// propagate further.
    pub async fn tick(&mut self) -> LoopState {
        let platform = self.collector.platform().to_string();
        tracing::info!("Running scheduled collection for {}", platform);

        let attempt = AssertUnwindSafe(self.collector.collect(self.config.limit))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(AuditError::Panic(panic_message(panic.as_ref()))));

        self.state = match attempt {
            Ok(reports) => {
                tracing::info!(
                    "Scheduled collection for {} stored {} reports",
                    platform,
                    reports.len()
                );
                LoopState::Running
            }
            Err(e) => {
                tracing::error!("Scheduled collection for {} failed: {}", platform, e);
                LoopState::Backoff
            }
        };

        self.state
    }

    /// Runs one attempt, then waits for the next one
    ///
    /// The wait ends after the state's delay or as soon as the trigger fires.
    pub async fn step(&mut self) -> LoopState {
        let state = self.tick().await;
        let delay = self.next_delay();

        tracing::debug!("Next collection in {}s ({:?})", delay.as_secs(), state);

        tokio::select! {
            _ = self.sleeper.sleep(delay) => {}
            _ = self.trigger.notified() => {
                tracing::info!("Collection requested, starting early");
            }
        }

        state
    }

    /// Runs the loop until the task is dropped
    pub async fn run(mut self) {
        loop {
            self.step().await;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "collector panicked".to_string()
    }
}

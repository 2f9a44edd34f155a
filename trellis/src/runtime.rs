//! Async driver for the scheduler.
//!
//! The runtime is passive: it sleeps until the scheduler signals that
//! something was invalidated, collapses redundant signals, and flushes.

use std::future::Future;

use log::{debug, info, warn};

use crate::error::Result;
use crate::scheduler::{Scheduler, TickReport};
use crate::wakeup::{self, WakeupReceiver};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Upper bound on ticks flushed by one `run_until_idle` call.
    pub max_ticks_per_flush: usize,
    /// Capacity of the wakeup channel.
    pub wakeup_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_ticks_per_flush: 64,
            wakeup_capacity: 16,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick cap for `run_until_idle`.
    pub fn max_ticks_per_flush(mut self, ticks: usize) -> Self {
        self.max_ticks_per_flush = ticks.max(1);
        self
    }

    /// Set the wakeup channel capacity.
    pub fn wakeup_capacity(mut self, capacity: usize) -> Self {
        self.wakeup_capacity = capacity.max(1);
        self
    }
}

/// Drives a `Scheduler` from a tokio task.
#[derive(Debug)]
pub struct Runtime {
    scheduler: Scheduler,
    wakeup: WakeupReceiver,
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a runtime for `scheduler` and install its wakeup channel.
    pub fn new(scheduler: Scheduler, config: RuntimeConfig) -> Self {
        let (tx, rx) = wakeup::channel(config.wakeup_capacity);
        scheduler.install_wakeup(tx);
        Self {
            scheduler,
            wakeup: rx,
            config,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Flush one tick.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.wakeup.drain();
        self.scheduler.flush()
    }

    /// Flush until no root is pending, up to the configured tick cap.
    ///
    /// Returns the number of ticks that rendered something.
    pub fn run_until_idle(&mut self) -> Result<usize> {
        let mut ticks = 0;
        while self.scheduler.has_pending() {
            if ticks >= self.config.max_ticks_per_flush {
                warn!(
                    "still pending after {} ticks, yielding",
                    self.config.max_ticks_per_flush
                );
                break;
            }
            self.tick()?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Flush on every wakeup until `shutdown` resolves.
    ///
    /// Work pending at startup is flushed first; pending work is flushed once
    /// more before returning.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("runtime started");
        self.run_until_idle()?;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("shutdown requested");
                    break;
                }
                signal = self.wakeup.recv() => {
                    if signal.is_none() {
                        debug!("wakeup channel closed");
                        break;
                    }
                    // Signals that arrived while rendering collapse into one flush
                    let extra = self.wakeup.drain();
                    if extra > 0 {
                        debug!("collapsed {} extra wakeups", extra);
                    }
                    self.run_until_idle()?;
                }
            }
        }

        self.run_until_idle()?;
        info!("runtime stopped after {} ticks", self.scheduler.tick());
        Ok(())
    }
}

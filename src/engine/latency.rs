// Latency simulator - models asynchronous backend calls

//! # Latency Simulator
//!
//! Defers the delivery of a result by a fixed per-operation-class delay plus an
//! optional bounded random jitter. Reads wait *before* running (the value is
//! read after the simulated round trip), writes run first and wait *after*
//! (the change is applied immediately, the acknowledgement arrives later).
//!
//! The simulator only defers delivery. It does not impose any ordering across
//! unrelated operations.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::config::LatencyConfig;

/// Kind of backend operation being simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySimulator {
    read: Duration,
    write: Duration,
    jitter: Duration,
}

impl Default for LatencySimulator {
    fn default() -> Self {
        Self::from_config(&LatencyConfig::default())
    }
}

impl LatencySimulator {
    pub fn new(read: Duration, write: Duration) -> Self {
        Self {
            read,
            write,
            jitter: Duration::ZERO,
        }
    }

    /// No delay at all
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(config: &LatencyConfig) -> Self {
        Self {
            read: Duration::from_millis(config.read_delay_ms),
            write: Duration::from_millis(config.write_delay_ms),
            jitter: Duration::from_millis(config.jitter_ms),
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Base delay for a class, without jitter
    pub fn base_delay(&self, class: OperationClass) -> Duration {
        match class {
            OperationClass::Read => self.read,
            OperationClass::Write => self.write,
        }
    }

    /// Delay to apply to one operation: base plus `[0, jitter]`
    pub fn delay_for(&self, class: OperationClass) -> Duration {
        let base = self.base_delay(class);
        if self.jitter.is_zero() {
            return base;
        }
        let extra = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        base + Duration::from_millis(extra)
    }

    /// Wait for one simulated operation of `class`
    pub async fn wait(&self, class: OperationClass) {
        let delay = self.delay_for(class);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Delay, then run `body`
    pub async fn before<F: Future>(&self, class: OperationClass, body: F) -> F::Output {
        self.wait(class).await;
        body.await
    }

    /// Run `body`, then delay delivery of its output
    pub async fn after<F: Future>(&self, class: OperationClass, body: F) -> F::Output {
        let output = body.await;
        self.wait(class).await;
        output
    }
}

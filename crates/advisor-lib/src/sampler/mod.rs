//! Metric sampling sessions
//!
//! A single-threaded cooperative poll-then-sleep loop: each iteration
//! queries the snapshot provider for every enabled category, feeds the
//! baseline tracker, evaluates post-baseline samples for anomalies, and
//! sleeps the remainder of the interval. Cancellation is checked at
//! iteration boundaries only.

mod clock;
mod r#loop;


pub use clock::{Clock, ManualClock, SystemClock};
pub use r#loop::{Sampler, SamplerConfig, MIN_INTERVAL};

use crate::models::{HardwareFacts, MetricCategory, MetricReading, UtilizationSnapshot};
use anyhow::Result;
use thiserror::Error;

pub use async_trait::async_trait;

/// Boundary to the host: point-in-time facts and metric readings
///
/// An empty reading list means the category is unavailable on this host;
/// the sampler skips it for that iteration rather than failing the session.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Readings for one metric category; empty when unavailable
    async fn query_category(&self, category: MetricCategory) -> Result<Vec<MetricReading>>;

    /// Names of currently running processes
    async fn running_process_names(&self) -> Result<Vec<String>>;

    /// Display names of installed software
    async fn installed_software_names(&self) -> Result<Vec<String>>;

    /// CPU topology, memory, and GPU facts
    async fn hardware_facts(&self) -> Result<HardwareFacts>;

    /// Live utilization readings for bottleneck derivation
    async fn utilization(&self) -> Result<UtilizationSnapshot>;
}

/// Rejected sampler configurations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sampling interval must be at least 1 second, got {0:?}")]
    IntervalTooShort(std::time::Duration),
    #[error("sampling duration must be non-zero")]
    ZeroDuration,
    #[error("baseline fraction must be in (0, 1], got {0}")]
    BaselineFractionOutOfRange(f64),
    #[error("at least one metric category must be enabled")]
    NoCategories,
}

//! Core library for the host tuning advisor
//!
//! This crate provides the telemetry and adaptive recommendation engine:
//! - Metric sampling sessions with baseline statistics
//! - Sigma-rule anomaly detection
//! - Workload classification from software indicators
//! - Multi-factor weighted recommendation scoring
//! - Observability (structured logging and Prometheus metrics)
//!
//! Physically applying settings to firmware or the OS, report rendering,
//! and persistence are the caller's business; the engine only produces the
//! session and recommendation artifacts.

pub mod anomaly;
pub mod baseline;
pub mod bottleneck;
pub mod classifier;
pub mod models;
pub mod observability;
pub mod sampler;
pub mod scorer;

pub use anomaly::SigmaDetector;
pub use baseline::{BaselineEntry, BaselineTracker};
pub use bottleneck::{detect_bottlenecks, BottleneckThresholds};
pub use classifier::{ConfidenceModel, WorkloadClassifier, WorkloadSignature};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use sampler::{Clock, ManualClock, Sampler, SamplerConfig, SnapshotProvider, SystemClock};
pub use scorer::{Scorer, WeightTable};

//! The polling collector.
//!
//! A [`Scheduler`] launches [`ScrapeOrchestrator`] cycles that fill a
//! [`SnapshotCache`]; the [`MetricsProjector`] reads that cache on demand and
//! [`render`] turns its samples into the Prometheus text format.

pub mod cache;
pub mod error_counter;
pub mod exposition;
pub mod projector;
pub mod scheduler;
pub mod scrape;
pub mod source;

pub use cache::{SnapshotCache, TtlCache};
pub use error_counter::ErrorCounter;
pub use exposition::render;
pub use projector::{MetricKind, MetricSample, MetricsProjector};
pub use scheduler::Scheduler;
pub use scrape::{ScrapeOrchestrator, ScrapeReport};
pub use source::DeviceSource;

//! Telemetry and logging infrastructure
//!
//! Provides structured logging with tracing and frame timing metrics.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogConfig};
pub use metrics::{FrameProfiler, FrameStats};

//! Prometheus registry backend for the perfdbg debug agent.
//!
//! This crate provides a [`PrometheusRegistry`] implementation of [`perfdbg_core::MonitorRegistry`]
//! that exposes the agent monitors in Prometheus format.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use perfdbg_core::{MonitorRegistry, Monitors};
//! use perfdbg_prometheus::PrometheusRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = PrometheusRegistry::new();
//! let monitors = Arc::new(Monitors::default());
//! registry.register("perfdbg", "perfdbg-debug", monitors.clone())?;
//!
//! monitors.inc_sender_tasks();
//! let text = registry.render()?;
//! assert!(text.contains("perfdbg_sender_tasks_total"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `<ns>_generator_info{agent, generator}` - Gauge, always `1`
//! - `<ns>_sender_tasks_total{agent}` - Counter
//!
//! ## HTTP Server
//! This crate does NOT provide HTTP server for `/metrics` endpoint.
//! Serve [`PrometheusRegistry::render`] from your application's HTTP framework.

mod backend;
pub use backend::PrometheusRegistry;

mod collector;
pub use collector::MonitorsCollector;

pub use prometheus::{Encoder, Registry, TextEncoder};

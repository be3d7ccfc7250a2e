//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every upstream call (NetworkEntry::observe):
//!     → metrics.rs (call counter, latency histogram)
//!     → tracing warn on failure
//!
//! Status checks:
//!     → metrics.rs (per-network up gauge)
//!
//! Binary startup:
//!     → logging.rs (tracing-subscriber with EnvFilter)
//!     → metrics.rs (optional Prometheus exporter)
//! ```
//!
//! # Design Decisions
//! - Key material never reaches a log field or metric label
//! - Labels are static strings (network key, RPC method)

pub mod logging;
pub mod metrics;

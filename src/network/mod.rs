//! Network registry subsystem.
//!
//! # Data Flow
//! ```text
//! Network (closed enum, parsed case-insensitively from its key)
//!     → registry.rs (static defaults: chain id, public RPC, explorer, unit, fee model)
//!     → GatewayConfig overrides (RPC URL per network)
//!     → NetworkProfile (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Unknown network keys are rejected at the boundary, never deep in a call
//! - Amounts are 256-bit integers; decimal strings are derived, never floats

pub mod registry;
pub mod units;

pub use registry::{FeeModel, Network, NetworkProfile};
pub use units::{parse_amount, AmountValue};

//! Multi-network blockchain gateway library.

pub mod config;
pub mod gateway;
pub mod network;
pub mod observability;
pub mod rpc;

pub use config::GatewayConfig;
pub use gateway::{Gateway, GatewayError, GatewayResult};
pub use network::{AmountValue, Network, NetworkProfile};
pub use rpc::RpcConnection;

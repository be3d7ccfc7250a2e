//! Upstream JSON-RPC connection seam.
//!
//! # Data Flow
//! ```text
//! Gateway operation
//!     → RpcConnection (trait object, one per network)
//!     → http.rs (alloy HTTP provider)
//!     → JSON-RPC node
//! ```
//!
//! # Design Decisions
//! - Errors are classified once, here: a JSON-RPC error payload means the node
//!   rejected the request, anything else means the node was unreachable
//! - Connections are shared read-mostly; implementations must be `Send + Sync`
//! - No retries or timeouts are added at this layer

pub mod http;

use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::{Transaction, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportError;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use http::HttpConnection;

/// Failure of a single upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcFailure {
    /// The node answered with an error (revert, bad params, nonce too low).
    #[error("{0}")]
    Rejected(String),

    /// Transport, timeout, or response decoding failure.
    #[error("{0}")]
    Unavailable(String),
}

impl RpcFailure {
    pub fn message(&self) -> &str {
        match self {
            RpcFailure::Rejected(message) | RpcFailure::Unavailable(message) => message,
        }
    }
}

impl From<TransportError> for RpcFailure {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => RpcFailure::Rejected(payload.message.to_string()),
            None => RpcFailure::Unavailable(err.to_string()),
        }
    }
}

/// Raw fee rates in wei. `None` means the node did not report the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeRates {
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

/// Outcome of waiting for a transaction to be mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
}

/// Remote procedure interface of a single network's node.
#[async_trait]
pub trait RpcConnection: Send + Sync {
    async fn chain_id(&self) -> Result<u64, RpcFailure>;

    async fn block_number(&self) -> Result<u64, RpcFailure>;

    async fn balance(&self, address: Address) -> Result<U256, RpcFailure>;

    /// `None` when the node does not know the hash.
    async fn transaction(&self, tx_hash: TxHash) -> Result<Option<Transaction>, RpcFailure>;

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, RpcFailure>;

    async fn fee_rates(&self) -> Result<FeeRates, RpcFailure>;

    /// Read-only `eth_call`.
    async fn call(&self, request: &TransactionRequest) -> Result<Bytes, RpcFailure>;

    /// Sign and broadcast; returns as soon as the node accepts the transaction.
    async fn send_transaction(
        &self,
        request: TransactionRequest,
        signer: &PrivateKeySigner,
    ) -> Result<TxHash, RpcFailure>;

    /// Block until the transaction is mined with `confirmations` blocks of depth.
    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
        timeout: Option<Duration>,
    ) -> Result<Confirmation, RpcFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        let failure = RpcFailure::Rejected("execution reverted".to_string());
        assert_eq!(failure.message(), "execution reverted");
        assert_eq!(failure.to_string(), "execution reverted");
    }

    #[test]
    fn test_transport_error_classification() {
        let err = alloy::transports::TransportErrorKind::custom_str("connection refused");
        assert!(matches!(RpcFailure::from(err), RpcFailure::Unavailable(_)));
    }
}

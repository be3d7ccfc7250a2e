//! Gateway error taxonomy and result shapes.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use thiserror::Error;

use crate::network::{AmountValue, Network, NetworkProfile};
use crate::rpc::RpcFailure;

/// Errors returned by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The network key is not in the registry.
    #[error("unsupported network '{0}'")]
    UnsupportedNetwork(String),

    /// The node could not be reached or answered garbage.
    #[error("{network} RPC unavailable: {message}")]
    UpstreamUnavailable { network: Network, message: String },

    /// The node refused to estimate gas, usually because the call reverts.
    #[error("gas estimation failed on {network}: {message}")]
    GasEstimation { network: Network, message: String },

    /// The node rejected the transaction (insufficient funds, nonce conflict).
    #[error("transaction submission failed on {network}: {message}")]
    Submission { network: Network, message: String },

    /// Waiting for confirmation failed or timed out.
    #[error("transaction {tx_hash} not confirmed: {message}")]
    Confirmation { tx_hash: TxHash, message: String },

    /// The transaction was mined with a failure status.
    #[error("transaction {tx_hash} reverted")]
    Reverted {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },

    /// A view call reverted or its output could not be decoded.
    #[error("contract call failed on {network}: {message}")]
    ContractCall { network: Network, message: String },

    /// Malformed signing key. Never carries key material.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// Malformed address, hash, amount, or ABI argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The capability exists in the API but has no contract wired to it.
    #[error("{capability} is not implemented: {missing}")]
    NotImplemented {
        capability: &'static str,
        missing: &'static str,
    },

    /// The gateway could not be constructed from its configuration.
    #[error("invalid gateway configuration: {0}")]
    InvalidConfig(String),
}

impl GatewayError {
    /// Connectivity failures are the only kind safe to retry blindly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::UpstreamUnavailable { .. })
    }

    /// Errors caused by the caller's input rather than the network.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            GatewayError::UnsupportedNetwork(_)
                | GatewayError::InvalidKey(_)
                | GatewayError::InvalidInput(_)
        )
    }

    pub(crate) fn upstream(network: Network, failure: RpcFailure) -> Self {
        GatewayError::UpstreamUnavailable {
            network,
            message: failure.message().to_string(),
        }
    }

    pub(crate) fn gas_estimation(network: Network, failure: RpcFailure) -> Self {
        match failure {
            RpcFailure::Rejected(message) => GatewayError::GasEstimation { network, message },
            RpcFailure::Unavailable(message) => {
                GatewayError::UpstreamUnavailable { network, message }
            }
        }
    }

    pub(crate) fn submission(network: Network, failure: RpcFailure) -> Self {
        // A lost response may still have broadcast the transaction, so
        // transport failures are not reported as retryable here.
        GatewayError::Submission {
            network,
            message: failure.message().to_string(),
        }
    }

    pub(crate) fn contract_call(network: Network, failure: RpcFailure) -> Self {
        match failure {
            RpcFailure::Rejected(message) => GatewayError::ContractCall { network, message },
            RpcFailure::Unavailable(message) => {
                GatewayError::UpstreamUnavailable { network, message }
            }
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Diagnostic status of one network. Never an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NetworkStatus {
    Online {
        profile: NetworkProfile,
        latest_block: u64,
    },
    Error {
        profile: NetworkProfile,
        error_message: String,
    },
}

impl NetworkStatus {
    pub fn profile(&self) -> &NetworkProfile {
        match self {
            NetworkStatus::Online { profile, .. } | NetworkStatus::Error { profile, .. } => profile,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, NetworkStatus::Online { .. })
    }
}

/// Native balance of an account.
#[derive(Debug, Clone, Serialize)]
pub struct WalletBalance {
    pub address: Address,
    pub network: Network,
    pub symbol: String,
    pub balance: AmountValue,
}

/// Current fee rates. Absent fields were not reported by the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeeData {
    pub gas_price: Option<AmountValue>,
    pub max_fee_per_gas: Option<AmountValue>,
    pub max_priority_fee_per_gas: Option<AmountValue>,
}

/// Gas estimate for a transaction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeEstimate {
    pub gas_units: u64,
    #[serde(flatten)]
    pub fees: FeeData,
    /// `gas_units` priced at the max fee, or the gas price on legacy networks.
    pub estimated_cost: Option<AmountValue>,
}

/// Composite snapshot of a network.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkInfo {
    pub profile: NetworkProfile,
    pub block_number: u64,
    pub fees: FeeData,
}

/// Chain id reported by a node, compared with its profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainCheck {
    pub network: Network,
    pub expected: u64,
    /// `None` when the node could not be queried.
    pub reported: Option<u64>,
}

impl ChainCheck {
    pub fn matches(&self) -> bool {
        self.reported == Some(self.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::UnsupportedNetwork("fantom".to_string());
        assert_eq!(err.to_string(), "unsupported network 'fantom'");

        let err = GatewayError::NotImplemented {
            capability: "crop NFT minting",
            missing: "no crop NFT contract binding is configured",
        };
        assert_eq!(
            err.to_string(),
            "crop NFT minting is not implemented: no crop NFT contract binding is configured"
        );
    }

    #[test]
    fn test_error_classification() {
        let upstream = GatewayError::upstream(
            Network::Polygon,
            RpcFailure::Unavailable("connection refused".to_string()),
        );
        assert!(upstream.is_retryable());
        assert!(!upstream.is_usage_error());

        let submission = GatewayError::submission(
            Network::Polygon,
            RpcFailure::Unavailable("connection reset".to_string()),
        );
        assert!(!submission.is_retryable());

        assert!(GatewayError::InvalidKey("bad".to_string()).is_usage_error());
        assert!(!GatewayError::InvalidKey("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_gas_estimation_keeps_upstream_message() {
        let err = GatewayError::gas_estimation(
            Network::Ethereum,
            RpcFailure::Rejected("execution reverted: paused".to_string()),
        );
        match err {
            GatewayError::GasEstimation { message, .. } => {
                assert_eq!(message, "execution reverted: paused")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_serialization() {
        let status = NetworkStatus::Error {
            profile: NetworkProfile::builtin(Network::Bsc),
            error_message: "timeout".to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_message"], "timeout");
        assert_eq!(json["profile"]["network"], "bsc");
    }
}

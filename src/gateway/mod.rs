//! Multi-network gateway.
//!
//! # Data Flow
//! ```text
//! Caller (network key or default)
//!     → resolve (static registry, case-insensitive)
//!     → NetworkEntry (profile + shared connection)
//!     → queries.rs / wallet.rs / contract.rs / transaction.rs / bindings.rs
//!     → normalized result or GatewayError
//! ```
//!
//! # Security Constraints
//! - Signing keys are accepted per call and never stored, logged, or cloned
//!   beyond the operation that uses them
//! - RPC URLs are not logged in full; hosted endpoints embed API keys

pub mod bindings;
pub mod contract;
pub mod queries;
pub mod transaction;
pub mod types;
pub mod wallet;

use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::schema::GatewayConfig;
use crate::config::validation::validate_config;
use crate::gateway::bindings::{CropNftBinding, EscrowBinding};
use crate::network::{Network, NetworkProfile};
use crate::observability::metrics;
use crate::rpc::{HttpConnection, RpcConnection, RpcFailure};

pub use contract::ContractHandle;
pub use transaction::PendingTransaction;
pub use types::*;
pub use wallet::NetworkWallet;

/// A registered network: its profile and its one connection.
#[derive(Clone)]
pub(crate) struct NetworkEntry {
    pub(crate) profile: Arc<NetworkProfile>,
    pub(crate) connection: Arc<dyn RpcConnection>,
}

impl NetworkEntry {
    /// Run one upstream call, recording its outcome.
    pub(crate) async fn observe<T, F>(&self, method: &'static str, call: F) -> Result<T, RpcFailure>
    where
        F: Future<Output = Result<T, RpcFailure>>,
    {
        let started = Instant::now();
        let result = call.await;
        let network = self.profile.network;

        metrics::record_rpc_call(network.key(), method, result.is_ok(), started.elapsed());
        if let Err(e) = &result {
            tracing::warn!(network = %network, method, error = %e, "RPC call failed");
        }
        result
    }
}

/// Uniform access to every registered network.
///
/// Cheap to clone; clones share connections and bindings.
#[derive(Clone)]
pub struct Gateway {
    default_network: Network,
    entries: Arc<BTreeMap<Network, NetworkEntry>>,
    nft_binding: Option<Arc<dyn CropNftBinding>>,
    escrow_binding: Option<Arc<dyn EscrowBinding>>,
}

impl Gateway {
    /// Create a gateway over explicitly supplied connections.
    ///
    /// # Arguments
    /// * `default_network` - Network used when a caller passes no key
    /// * `connections` - One profile and connection per registered network
    pub fn new(
        default_network: Network,
        connections: impl IntoIterator<Item = (NetworkProfile, Arc<dyn RpcConnection>)>,
    ) -> GatewayResult<Self> {
        let mut entries = BTreeMap::new();
        for (profile, connection) in connections {
            let network = profile.network;
            let entry = NetworkEntry {
                profile: Arc::new(profile),
                connection,
            };
            if entries.insert(network, entry).is_some() {
                return Err(GatewayError::InvalidConfig(format!(
                    "network {} registered twice",
                    network
                )));
            }
        }

        if !entries.contains_key(&default_network) {
            return Err(GatewayError::InvalidConfig(format!(
                "default network {} has no connection",
                default_network
            )));
        }

        Ok(Self {
            default_network,
            entries: Arc::new(entries),
            nft_binding: None,
            escrow_binding: None,
        })
    }

    /// Build HTTP connections for every supported network.
    ///
    /// Connections are created eagerly so a malformed RPC URL fails here,
    /// not on first use. No request is sent.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        validate_config(config).map_err(|errors| {
            let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
            GatewayError::InvalidConfig(reasons.join(", "))
        })?;

        let default_network: Network = config
            .default_network
            .parse()
            .map_err(|_| {
                GatewayError::InvalidConfig(format!(
                    "unknown default network '{}'",
                    config.default_network
                ))
            })?;
        let poll_interval = Duration::from_millis(config.confirmation_poll_ms);

        let mut connections = Vec::with_capacity(Network::ALL.len());
        for network in Network::ALL {
            let profile = NetworkProfile::from_config(network, config);
            if profile.uses_fallback_rpc() {
                tracing::warn!(
                    network = %network,
                    "Using public fallback RPC endpoint; it is rate-limited and untrusted, configure an override for production"
                );
            }

            let connection = HttpConnection::new(&profile, poll_interval)
                .map_err(|e| GatewayError::InvalidConfig(e.to_string()))?;
            connections.push((profile, Arc::new(connection) as Arc<dyn RpcConnection>));
        }

        let gateway = Self::new(default_network, connections)?;
        tracing::info!(
            default_network = %default_network,
            networks = gateway.entries.len(),
            "Gateway initialized"
        );
        Ok(gateway)
    }

    /// Plug in a crop NFT contract binding.
    pub fn with_nft_binding(mut self, binding: Arc<dyn CropNftBinding>) -> Self {
        self.nft_binding = Some(binding);
        self
    }

    /// Plug in an escrow payment contract binding.
    pub fn with_escrow_binding(mut self, binding: Arc<dyn EscrowBinding>) -> Self {
        self.escrow_binding = Some(binding);
        self
    }

    /// Network used when no key is supplied.
    pub fn default_network(&self) -> Network {
        self.default_network
    }

    /// All registered profiles, in registry order.
    pub fn profiles(&self) -> Vec<&NetworkProfile> {
        self.entries.values().map(|entry| entry.profile.as_ref()).collect()
    }

    /// Resolve a network key (case-insensitive) or the default network.
    pub fn resolve(&self, network: Option<&str>) -> GatewayResult<&NetworkProfile> {
        self.entry(network).map(|entry| entry.profile.as_ref())
    }

    pub(crate) fn entry(&self, network: Option<&str>) -> GatewayResult<&NetworkEntry> {
        let network = match network {
            Some(key) => key.parse::<Network>()?,
            None => self.default_network,
        };
        // A parsed key may still name a network this gateway was not built with.
        self.entries
            .get(&network)
            .ok_or_else(|| GatewayError::UnsupportedNetwork(network.key().to_string()))
    }

    /// Compare every node's reported chain id with its profile.
    ///
    /// Mismatches and failures are logged, never returned as errors.
    pub async fn verify_chain_ids(&self) -> Vec<ChainCheck> {
        let checks = self.entries.values().map(|entry| async move {
            let reported = entry
                .observe("eth_chainId", entry.connection.chain_id())
                .await
                .ok();
            let check = ChainCheck {
                network: entry.profile.network,
                expected: entry.profile.chain_id,
                reported,
            };

            match check.reported {
                Some(actual) if actual != check.expected => tracing::warn!(
                    network = %check.network,
                    expected = check.expected,
                    actual,
                    "Chain ID mismatch"
                ),
                None => tracing::warn!(
                    network = %check.network,
                    "Chain ID verification failed"
                ),
                _ => {}
            }
            check
        });

        join_all(checks).await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("default_network", &self.default_network)
            .field("networks", &self.entries.keys().collect::<Vec<_>>())
            .field("nft_binding", &self.nft_binding.is_some())
            .field("escrow_binding", &self.escrow_binding.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{Confirmation, FeeRates};
    use alloy::primitives::{Address, Bytes, TxHash, U256};
    use alloy::rpc::types::{Transaction, TransactionRequest};
    use alloy::signers::local::PrivateKeySigner;
    use async_trait::async_trait;

    struct OfflineConnection {
        chain_id: u64,
    }

    #[async_trait]
    impl RpcConnection for OfflineConnection {
        async fn chain_id(&self) -> Result<u64, RpcFailure> {
            Ok(self.chain_id)
        }
        async fn block_number(&self) -> Result<u64, RpcFailure> {
            Err(RpcFailure::Unavailable("offline".to_string()))
        }
        async fn balance(&self, _address: Address) -> Result<U256, RpcFailure> {
            Err(RpcFailure::Unavailable("offline".to_string()))
        }
        async fn transaction(&self, _tx_hash: TxHash) -> Result<Option<Transaction>, RpcFailure> {
            Ok(None)
        }
        async fn estimate_gas(&self, _request: &TransactionRequest) -> Result<u64, RpcFailure> {
            Err(RpcFailure::Unavailable("offline".to_string()))
        }
        async fn fee_rates(&self) -> Result<FeeRates, RpcFailure> {
            Ok(FeeRates::default())
        }
        async fn call(&self, _request: &TransactionRequest) -> Result<Bytes, RpcFailure> {
            Err(RpcFailure::Unavailable("offline".to_string()))
        }
        async fn send_transaction(
            &self,
            _request: TransactionRequest,
            _signer: &PrivateKeySigner,
        ) -> Result<TxHash, RpcFailure> {
            Err(RpcFailure::Unavailable("offline".to_string()))
        }
        async fn wait_for_confirmation(
            &self,
            _tx_hash: TxHash,
            _confirmations: u64,
            _timeout: Option<Duration>,
        ) -> Result<Confirmation, RpcFailure> {
            Err(RpcFailure::Unavailable("offline".to_string()))
        }
    }

    fn offline_gateway() -> Gateway {
        let connections = Network::ALL.into_iter().map(|network| {
            let connection = Arc::new(OfflineConnection {
                chain_id: network.chain_id(),
            }) as Arc<dyn RpcConnection>;
            (NetworkProfile::builtin(network), connection)
        });
        Gateway::new(Network::Polygon, connections).unwrap()
    }

    #[test]
    fn test_resolve_ignores_case_and_reuses_connection() {
        let gateway = offline_gateway();
        for network in Network::ALL {
            let canonical = gateway.entry(Some(network.key())).unwrap();
            for key in [network.key().to_uppercase(), capitalize(network.key())] {
                let entry = gateway.entry(Some(&key)).unwrap();
                assert!(Arc::ptr_eq(&entry.connection, &canonical.connection));
                assert!(Arc::ptr_eq(&entry.profile, &canonical.profile));
            }
        }
    }

    fn capitalize(key: &str) -> String {
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    #[test]
    fn test_resolve_default_network() {
        let gateway = offline_gateway();
        assert_eq!(gateway.resolve(None).unwrap().network, Network::Polygon);
        assert_eq!(gateway.default_network(), Network::Polygon);
    }

    #[test]
    fn test_resolve_unknown_network() {
        let gateway = offline_gateway();
        for key in ["fantom", "", "polygon-mainnet"] {
            let err = gateway.resolve(Some(key)).unwrap_err();
            assert!(matches!(err, GatewayError::UnsupportedNetwork(_)));
            assert!(err.is_usage_error());
        }
    }

    #[test]
    fn test_unregistered_network_rejected() {
        let connection = Arc::new(OfflineConnection { chain_id: 137 }) as Arc<dyn RpcConnection>;
        let gateway = Gateway::new(
            Network::Polygon,
            [(NetworkProfile::builtin(Network::Polygon), connection)],
        )
        .unwrap();
        let err = gateway.resolve(Some("ethereum")).unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedNetwork(ref key) if key == "ethereum"));
    }

    #[test]
    fn test_default_must_be_registered() {
        let connection = Arc::new(OfflineConnection { chain_id: 1 }) as Arc<dyn RpcConnection>;
        let err = Gateway::new(
            Network::Polygon,
            [(NetworkProfile::builtin(Network::Ethereum), connection)],
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_config_builds_every_network() {
        let gateway = Gateway::from_config(&GatewayConfig::default()).unwrap();
        assert_eq!(gateway.profiles().len(), Network::ALL.len());
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let mut config = GatewayConfig::default();
        config.networks.insert(
            "polygon".to_string(),
            crate::config::schema::NetworkOverride {
                rpc_url: Some("::not-a-url".to_string()),
            },
        );
        let err = Gateway::from_config(&config).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_config_rejects_zero_poll_interval() {
        let config = GatewayConfig {
            confirmation_poll_ms: 0,
            ..GatewayConfig::default()
        };
        let err = Gateway::from_config(&config).unwrap_err();
        assert!(
            matches!(err, GatewayError::InvalidConfig(ref message) if message.contains("confirmation_poll_ms"))
        );
    }

    #[test]
    fn test_from_config_rejects_unknown_override() {
        let mut config = GatewayConfig::default();
        config.networks.insert(
            "fantom".to_string(),
            crate::config::schema::NetworkOverride {
                rpc_url: Some("https://fantom.example".to_string()),
            },
        );
        let err = Gateway::from_config(&config).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfig(ref message) if message.contains("fantom")));
    }

    #[tokio::test]
    async fn test_verify_chain_ids() {
        let mut connections: Vec<(NetworkProfile, Arc<dyn RpcConnection>)> = Vec::new();
        connections.push((
            NetworkProfile::builtin(Network::Polygon),
            Arc::new(OfflineConnection { chain_id: 137 }),
        ));
        connections.push((
            NetworkProfile::builtin(Network::Sepolia),
            Arc::new(OfflineConnection { chain_id: 1 }),
        ));
        let gateway = Gateway::new(Network::Polygon, connections).unwrap();

        let checks = gateway.verify_chain_ids().await;
        assert_eq!(checks.len(), 2);
        let sepolia = checks.iter().find(|c| c.network == Network::Sepolia).unwrap();
        assert!(!sepolia.matches());
        assert_eq!(sepolia.reported, Some(1));
        let polygon = checks.iter().find(|c| c.network == Network::Polygon).unwrap();
        assert!(polygon.matches());
    }
}

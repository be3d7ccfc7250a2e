//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! default every field so a minimal (or absent) config works.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::network::Network;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Network key used when a caller does not name one.
    pub default_network: String,

    /// Per-network overrides keyed by network key (e.g. `polygon`).
    pub networks: BTreeMap<String, NetworkOverride>,

    /// Receipt polling interval while waiting for confirmations.
    pub confirmation_poll_ms: u64,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_network: Network::Polygon.key().to_string(),
            networks: BTreeMap::new(),
            confirmation_poll_ms: 2000,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Configured RPC URL for a network, if any.
    pub fn rpc_override(&self, network: Network) -> Option<&str> {
        self.networks
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(network.key()))
            .and_then(|(_, over)| over.rpc_url.as_deref())
    }
}

/// Overrides for one network.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkOverride {
    /// JSON-RPC endpoint replacing the public fallback.
    pub rpc_url: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.default_network, "polygon");
        assert_eq!(config.confirmation_poll_ms, 2000);
        assert!(config.networks.is_empty());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_network, "polygon");
    }

    #[test]
    fn test_parse_overrides() {
        let config: GatewayConfig = toml::from_str(
            r#"
            default_network = "sepolia"

            [networks.sepolia]
            rpc_url = "https://sepolia.example/v2/key"

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_network, "sepolia");
        assert_eq!(
            config.rpc_override(Network::Sepolia),
            Some("https://sepolia.example/v2/key")
        );
        assert_eq!(config.rpc_override(Network::Ethereum), None);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.metrics_address, "127.0.0.1:9090");
    }
}

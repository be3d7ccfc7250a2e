//! Static network table and resolved network profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::schema::GatewayConfig;
use crate::gateway::types::GatewayError;

/// Fee pricing model a network uses for transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeModel {
    /// Single gas price.
    Legacy,
    /// EIP-1559 base fee plus priority fee.
    Eip1559,
}

/// Supported networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "ethereum")]
    Ethereum,
    #[serde(rename = "sepolia")]
    Sepolia,
    #[serde(rename = "polygon")]
    Polygon,
    #[serde(rename = "amoy")]
    PolygonAmoy,
    #[serde(rename = "bsc")]
    Bsc,
    #[serde(rename = "localhost")]
    Localhost,
}

/// Built-in defaults for a network.
struct NetworkDefaults {
    key: &'static str,
    display_name: &'static str,
    chain_id: u64,
    rpc_url: &'static str,
    block_explorer_url: Option<&'static str>,
    native_symbol: &'static str,
    decimals: u8,
    fee_model: FeeModel,
}

// Public fallback endpoints are rate-limited and untrusted. Production
// deployments must configure their own RPC URLs.
const ETHEREUM: NetworkDefaults = NetworkDefaults {
    key: "ethereum",
    display_name: "Ethereum Mainnet",
    chain_id: 1,
    rpc_url: "https://eth.llamarpc.com",
    block_explorer_url: Some("https://etherscan.io"),
    native_symbol: "ETH",
    decimals: 18,
    fee_model: FeeModel::Eip1559,
};

const SEPOLIA: NetworkDefaults = NetworkDefaults {
    key: "sepolia",
    display_name: "Ethereum Sepolia Testnet",
    chain_id: 11_155_111,
    rpc_url: "https://rpc.sepolia.org",
    block_explorer_url: Some("https://sepolia.etherscan.io"),
    native_symbol: "ETH",
    decimals: 18,
    fee_model: FeeModel::Eip1559,
};

const POLYGON: NetworkDefaults = NetworkDefaults {
    key: "polygon",
    display_name: "Polygon PoS",
    chain_id: 137,
    rpc_url: "https://polygon-rpc.com",
    block_explorer_url: Some("https://polygonscan.com"),
    native_symbol: "POL",
    decimals: 18,
    fee_model: FeeModel::Eip1559,
};

const POLYGON_AMOY: NetworkDefaults = NetworkDefaults {
    key: "amoy",
    display_name: "Polygon Amoy Testnet",
    chain_id: 80_002,
    rpc_url: "https://rpc-amoy.polygon.technology",
    block_explorer_url: Some("https://amoy.polygonscan.com"),
    native_symbol: "POL",
    decimals: 18,
    fee_model: FeeModel::Eip1559,
};

const BSC: NetworkDefaults = NetworkDefaults {
    key: "bsc",
    display_name: "BNB Smart Chain",
    chain_id: 56,
    rpc_url: "https://bsc-dataseed.binance.org",
    block_explorer_url: Some("https://bscscan.com"),
    native_symbol: "BNB",
    decimals: 18,
    fee_model: FeeModel::Legacy,
};

const LOCALHOST: NetworkDefaults = NetworkDefaults {
    key: "localhost",
    display_name: "Local Development Node",
    chain_id: 31_337,
    rpc_url: "http://127.0.0.1:8545",
    block_explorer_url: None,
    native_symbol: "ETH",
    decimals: 18,
    fee_model: FeeModel::Eip1559,
};

impl Network {
    /// Every supported network, in registry order.
    pub const ALL: [Network; 6] = [
        Network::Ethereum,
        Network::Sepolia,
        Network::Polygon,
        Network::PolygonAmoy,
        Network::Bsc,
        Network::Localhost,
    ];

    fn defaults(self) -> &'static NetworkDefaults {
        match self {
            Network::Ethereum => &ETHEREUM,
            Network::Sepolia => &SEPOLIA,
            Network::Polygon => &POLYGON,
            Network::PolygonAmoy => &POLYGON_AMOY,
            Network::Bsc => &BSC,
            Network::Localhost => &LOCALHOST,
        }
    }

    /// Canonical lowercase key (e.g. `"polygon"`).
    pub fn key(self) -> &'static str {
        self.defaults().key
    }

    /// Chain id used for EIP-155 replay protection.
    pub fn chain_id(self) -> u64 {
        self.defaults().chain_id
    }

    /// Built-in public RPC endpoint used when no override is configured.
    pub fn default_rpc_url(self) -> &'static str {
        self.defaults().rpc_url
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Network {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|network| network.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| GatewayError::UnsupportedNetwork(s.to_string()))
    }
}

/// Resolved, immutable description of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkProfile {
    pub network: Network,
    pub display_name: String,
    pub chain_id: u64,
    /// Never serialized: hosted endpoints usually embed an API key.
    #[serde(skip_serializing)]
    pub rpc_url: String,
    pub block_explorer_url: Option<String>,
    pub native_symbol: String,
    pub decimals: u8,
    pub fee_model: FeeModel,
}

impl NetworkProfile {
    /// Profile with the built-in public RPC endpoint.
    pub fn builtin(network: Network) -> Self {
        let defaults = network.defaults();
        Self {
            network,
            display_name: defaults.display_name.to_string(),
            chain_id: defaults.chain_id,
            rpc_url: defaults.rpc_url.to_string(),
            block_explorer_url: defaults.block_explorer_url.map(str::to_string),
            native_symbol: defaults.native_symbol.to_string(),
            decimals: defaults.decimals,
            fee_model: defaults.fee_model,
        }
    }

    /// Profile with the configured RPC override applied, if any.
    pub fn from_config(network: Network, config: &GatewayConfig) -> Self {
        let mut profile = Self::builtin(network);
        if let Some(url) = config.rpc_override(network) {
            profile.rpc_url = url.to_string();
        }
        profile
    }

    /// Whether this profile still points at the public fallback endpoint.
    pub fn uses_fallback_rpc(&self) -> bool {
        self.rpc_url == self.network.default_rpc_url()
    }

    /// Explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.block_explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }

    /// Explorer link for an account or contract address.
    pub fn explorer_address_url(&self, address: &str) -> Option<String> {
        self.block_explorer_url
            .as_ref()
            .map(|base| format!("{}/address/{}", base.trim_end_matches('/'), address))
    }
}

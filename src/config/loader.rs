//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{GatewayConfig, NetworkOverride};
use crate::config::validation::{validate_config, ValidationError};
use crate::network::Network;

/// Selects the default network.
pub const DEFAULT_NETWORK_ENV_VAR: &str = "GATEWAY_DEFAULT_NETWORK";

/// Prefix of per-network RPC URL overrides, e.g. `GATEWAY_RPC_URL_POLYGON`.
pub const RPC_URL_ENV_PREFIX: &str = "GATEWAY_RPC_URL_";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load a TOML file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config, std::env::vars());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, validated.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();

    apply_env_overrides(&mut config, std::env::vars());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `GATEWAY_*` variables on top of a loaded config.
pub fn apply_env_overrides<I>(config: &mut GatewayConfig, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in vars {
        if name == DEFAULT_NETWORK_ENV_VAR {
            config.default_network = value;
            continue;
        }

        let Some(suffix) = name.strip_prefix(RPC_URL_ENV_PREFIX) else {
            continue;
        };
        match suffix.parse::<Network>() {
            Ok(network) => {
                config
                    .networks
                    .entry(network.key().to_string())
                    .or_insert_with(NetworkOverride::default)
                    .rpc_url = Some(value);
            }
            Err(_) => tracing::warn!(variable = %name, "Ignoring RPC override for unknown network"),
        }
    }
}

//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is used to build connections

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::network::Network;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown default network '{0}'")]
    UnknownDefaultNetwork(String),

    #[error("override for unknown network '{0}'")]
    UnknownNetworkOverride(String),

    #[error("invalid RPC URL for {network}: {reason}")]
    InvalidRpcUrl { network: String, reason: String },

    #[error("confirmation_poll_ms must be greater than 0")]
    ZeroPollInterval,

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.default_network.parse::<Network>().is_err() {
        errors.push(ValidationError::UnknownDefaultNetwork(
            config.default_network.clone(),
        ));
    }

    for (key, over) in &config.networks {
        if key.parse::<Network>().is_err() {
            errors.push(ValidationError::UnknownNetworkOverride(key.clone()));
            continue;
        }

        if let Some(rpc_url) = &over.rpc_url {
            if let Err(reason) = check_rpc_url(rpc_url) {
                errors.push(ValidationError::InvalidRpcUrl {
                    network: key.clone(),
                    reason,
                });
            }
        }
    }

    if config.confirmation_poll_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_rpc_url(rpc_url: &str) -> Result<(), String> {
    let url = Url::parse(rpc_url).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

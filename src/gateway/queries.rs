//! Read-only queries and gas estimation.

use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::{Transaction, TransactionRequest};
use futures_util::future::join_all;
use std::str::FromStr;

use crate::gateway::types::{
    FeeData, FeeEstimate, GatewayError, GatewayResult, NetworkInfo, NetworkStatus, WalletBalance,
};
use crate::gateway::{Gateway, NetworkEntry};
use crate::network::{AmountValue, NetworkProfile};
use crate::observability::metrics;
use crate::rpc::FeeRates;

/// Parse a `0x`-prefixed 20-byte address.
pub fn parse_address(address: &str) -> GatewayResult<Address> {
    Address::from_str(address.trim())
        .map_err(|e| GatewayError::InvalidInput(format!("invalid address '{}': {}", address, e)))
}

/// Parse a `0x`-prefixed 32-byte transaction hash.
pub fn parse_tx_hash(tx_hash: &str) -> GatewayResult<TxHash> {
    let trimmed = tx_hash.trim();
    let well_formed = trimmed.len() == 66
        && trimmed.starts_with("0x")
        && trimmed[2..].chars().all(|c| c.is_ascii_hexdigit());
    if !well_formed {
        return Err(GatewayError::InvalidInput(format!(
            "invalid transaction hash '{}': expected 0x followed by 64 hex digits",
            tx_hash
        )));
    }

    TxHash::from_str(trimmed)
        .map_err(|e| GatewayError::InvalidInput(format!("invalid transaction hash: {}", e)))
}

pub(crate) fn fee_data(rates: FeeRates, profile: &NetworkProfile) -> FeeData {
    let amount = |wei: u128| AmountValue::from_u128(wei, profile.decimals);
    FeeData {
        gas_price: rates.gas_price.map(amount),
        max_fee_per_gas: rates.max_fee_per_gas.map(amount),
        max_priority_fee_per_gas: rates.max_priority_fee_per_gas.map(amount),
    }
}

impl Gateway {
    /// Latest block of a network, folded into a status. Never fails on
    /// upstream errors; only an unknown network key is an error.
    pub async fn get_network_status(&self, network: Option<&str>) -> GatewayResult<NetworkStatus> {
        let entry = self.entry(network)?;
        Ok(status_of(entry).await)
    }

    /// Status of every registered network, checked concurrently.
    pub async fn get_all_network_status(&self) -> Vec<NetworkStatus> {
        join_all(self.entries.values().map(status_of)).await
    }

    /// Latest block number.
    pub async fn get_block_number(&self, network: Option<&str>) -> GatewayResult<u64> {
        let entry = self.entry(network)?;
        entry
            .observe("eth_blockNumber", entry.connection.block_number())
            .await
            .map_err(|e| GatewayError::upstream(entry.profile.network, e))
    }

    /// Native balance in both smallest and base units.
    pub async fn get_wallet_balance(
        &self,
        address: &str,
        network: Option<&str>,
    ) -> GatewayResult<WalletBalance> {
        let entry = self.entry(network)?;
        let address = parse_address(address)?;

        let raw: U256 = entry
            .observe("eth_getBalance", entry.connection.balance(address))
            .await
            .map_err(|e| GatewayError::upstream(entry.profile.network, e))?;

        Ok(WalletBalance {
            address,
            network: entry.profile.network,
            symbol: entry.profile.native_symbol.clone(),
            balance: AmountValue::new(raw, entry.profile.decimals),
        })
    }

    /// Transaction record, or `None` if the network does not know the hash.
    pub async fn get_transaction_details(
        &self,
        tx_hash: &str,
        network: Option<&str>,
    ) -> GatewayResult<Option<Transaction>> {
        let entry = self.entry(network)?;
        let tx_hash = parse_tx_hash(tx_hash)?;

        entry
            .observe("eth_getTransactionByHash", entry.connection.transaction(tx_hash))
            .await
            .map_err(|e| GatewayError::upstream(entry.profile.network, e))
    }

    /// Profile, block height, and fee data; both lookups run concurrently.
    pub async fn get_network_info(&self, network: Option<&str>) -> GatewayResult<NetworkInfo> {
        let entry = self.entry(network)?;
        let net = entry.profile.network;

        let (block_number, rates) = tokio::try_join!(
            async {
                entry
                    .observe("eth_blockNumber", entry.connection.block_number())
                    .await
                    .map_err(|e| GatewayError::upstream(net, e))
            },
            async {
                entry
                    .observe("fee_data", entry.connection.fee_rates())
                    .await
                    .map_err(|e| GatewayError::upstream(net, e))
            },
        )?;

        Ok(NetworkInfo {
            profile: entry.profile.as_ref().clone(),
            block_number,
            fees: fee_data(rates, &entry.profile),
        })
    }

    /// Estimate gas units and price them at current fee rates.
    ///
    /// A rejected estimate (usually a revert) fails with
    /// [`GatewayError::GasEstimation`] carrying the node's message unchanged.
    pub async fn estimate_gas_cost(
        &self,
        request: &TransactionRequest,
        network: Option<&str>,
    ) -> GatewayResult<FeeEstimate> {
        let entry = self.entry(network)?;
        let net = entry.profile.network;

        let (gas_units, rates) = tokio::join!(
            entry.observe("eth_estimateGas", entry.connection.estimate_gas(request)),
            entry.observe("fee_data", entry.connection.fee_rates()),
        );
        // A revert reason outranks a failed fee lookup.
        let gas_units = gas_units.map_err(|e| GatewayError::gas_estimation(net, e))?;
        let rates = rates.map_err(|e| GatewayError::upstream(net, e))?;

        let unit_price = rates.max_fee_per_gas.or(rates.gas_price);
        let estimated_cost = unit_price.map(|price| {
            AmountValue::new(
                U256::from(gas_units) * U256::from(price),
                entry.profile.decimals,
            )
        });

        Ok(FeeEstimate {
            gas_units,
            fees: fee_data(rates, &entry.profile),
            estimated_cost,
        })
    }
}

async fn status_of(entry: &NetworkEntry) -> NetworkStatus {
    let profile = entry.profile.as_ref().clone();
    let result = entry
        .observe("eth_blockNumber", entry.connection.block_number())
        .await;
    metrics::record_network_up(profile.network.key(), result.is_ok());

    match result {
        Ok(latest_block) => NetworkStatus::Online {
            profile,
            latest_block,
        },
        Err(e) => NetworkStatus::Error {
            profile,
            error_message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tx_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(parse_tx_hash(&hash).is_ok());
    }

    #[test]
    fn test_parse_tx_hash_rejects_malformed() {
        let cases = vec![
            String::new(),
            "0x1234".to_string(),
            "ab".repeat(32),
            format!("0x{}", "zz".repeat(32)),
            format!("0x{}", "ab".repeat(33)),
        ];
        for bad in &cases {
            let err = parse_tx_hash(bad).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidInput(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_ok());
        assert!(matches!(
            parse_address("0x1234"),
            Err(GatewayError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_fee_data_keeps_absent_fields_absent() {
        let profile = NetworkProfile::builtin(crate::network::Network::Bsc);
        let fees = fee_data(
            FeeRates {
                gas_price: Some(0),
                ..FeeRates::default()
            },
            &profile,
        );
        assert_eq!(fees.gas_price.map(|a| a.formatted()), Some("0.0".to_string()));
        assert!(fees.max_fee_per_gas.is_none());
        assert!(fees.max_priority_fee_per_gas.is_none());
    }
}

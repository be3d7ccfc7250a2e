//! Alloy HTTP implementation of [`RpcConnection`].
//!
//! # Responsibilities
//! - Hold one read provider per network, built once
//! - Build a short-lived signing provider per submission
//! - Poll receipts when a caller explicitly waits for confirmation

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Transaction, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};
use url::Url;

use crate::network::{FeeModel, NetworkProfile};
use crate::rpc::{Confirmation, FeeRates, RpcConnection, RpcFailure};

/// JSON-RPC connection to one network over HTTP.
#[derive(Clone)]
pub struct HttpConnection {
    url: Url,
    provider: Arc<dyn Provider + Send + Sync>,
    fee_model: FeeModel,
    poll_interval: Duration,
}

impl HttpConnection {
    /// Create a connection for a profile.
    ///
    /// Fails when the profile's RPC URL does not parse or `poll_interval` is
    /// zero; no request is sent.
    pub fn new(profile: &NetworkProfile, poll_interval: Duration) -> Result<Self, RpcFailure> {
        if poll_interval.is_zero() {
            return Err(RpcFailure::Unavailable(format!(
                "receipt poll interval for {} must be greater than zero",
                profile.network
            )));
        }

        let url: Url = profile.rpc_url.parse().map_err(|e| {
            RpcFailure::Unavailable(format!("invalid RPC URL for {}: {}", profile.network, e))
        })?;

        let provider = Arc::new(ProviderBuilder::new().connect_http(url.clone()))
            as Arc<dyn Provider + Send + Sync>;

        Ok(Self {
            url,
            provider,
            fee_model: profile.fee_model,
            poll_interval,
        })
    }

    async fn poll_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<Confirmation, RpcFailure> {
        let mut ticker = interval(self.poll_interval);

        loop {
            ticker.tick().await;

            let receipt = match self.provider.get_transaction_receipt(tx_hash).await? {
                Some(r) => r,
                None => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
            };

            if !receipt.status() {
                return Ok(Confirmation {
                    tx_hash,
                    block_number: receipt.block_number,
                    gas_used: receipt.gas_used,
                    success: false,
                });
            }

            let current_block = self.provider.get_block_number().await?;
            let tx_block = receipt.block_number.unwrap_or(current_block);
            // The inclusion block counts as the first confirmation.
            let depth = current_block.saturating_sub(tx_block) + 1;

            if depth >= confirmations {
                return Ok(Confirmation {
                    tx_hash,
                    block_number: Some(tx_block),
                    gas_used: receipt.gas_used,
                    success: true,
                });
            }

            tracing::debug!(
                tx_hash = %tx_hash,
                confirmations = depth,
                required = confirmations,
                "Waiting for confirmations"
            );
        }
    }
}

#[async_trait]
impl RpcConnection for HttpConnection {
    async fn chain_id(&self) -> Result<u64, RpcFailure> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn block_number(&self) -> Result<u64, RpcFailure> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn balance(&self, address: Address) -> Result<U256, RpcFailure> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn transaction(&self, tx_hash: TxHash) -> Result<Option<Transaction>, RpcFailure> {
        Ok(self.provider.get_transaction_by_hash(tx_hash).await?)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, RpcFailure> {
        Ok(self.provider.estimate_gas(request.clone()).await?)
    }

    async fn fee_rates(&self) -> Result<FeeRates, RpcFailure> {
        match self.fee_model {
            FeeModel::Legacy => Ok(FeeRates {
                gas_price: Some(self.provider.get_gas_price().await?),
                ..FeeRates::default()
            }),
            FeeModel::Eip1559 => {
                let (gas_price, eip1559) = tokio::join!(
                    self.provider.get_gas_price(),
                    self.provider.estimate_eip1559_fees()
                );
                let gas_price = gas_price?;

                // Nodes without a base fee cannot price EIP-1559 transactions;
                // report the pair as absent rather than failing the lookup.
                let eip1559 = match eip1559 {
                    Ok(estimate) => Some(estimate),
                    Err(e) => {
                        tracing::debug!(error = %e, "EIP-1559 fee estimation unavailable");
                        None
                    }
                };

                Ok(FeeRates {
                    gas_price: Some(gas_price),
                    max_fee_per_gas: eip1559.as_ref().map(|e| e.max_fee_per_gas),
                    max_priority_fee_per_gas: eip1559.as_ref().map(|e| e.max_priority_fee_per_gas),
                })
            }
        }
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes, RpcFailure> {
        Ok(self.provider.call(request.clone()).await?)
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
        signer: &PrivateKeySigner,
    ) -> Result<TxHash, RpcFailure> {
        // The signing provider lives only for this call.
        let wallet = EthereumWallet::from(signer.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.url.clone());

        let pending = provider.send_transaction(request).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
        timeout_after: Option<Duration>,
    ) -> Result<Confirmation, RpcFailure> {
        match timeout_after {
            Some(limit) => timeout(limit, self.poll_receipt(tx_hash, confirmations))
                .await
                .map_err(|_| confirmation_timeout(limit))?,
            None => self.poll_receipt(tx_hash, confirmations).await,
        }
    }
}

fn confirmation_timeout(limit: Duration) -> RpcFailure {
    RpcFailure::Unavailable(format!("not confirmed within {:?}", limit))
}

impl std::fmt::Debug for HttpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection")
            .field("host", &self.url.host_str())
            .field("fee_model", &self.fee_model)
            .finish()
    }
}

//! Transaction submission and explicit confirmation.
//!
//! # Responsibilities
//! - Submit through a wallet that lives only for the call
//! - Hand back the hash immediately
//! - Wait for mining only when the caller asks

use alloy::primitives::TxHash;
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;

use crate::gateway::types::{GatewayError, GatewayResult};
use crate::gateway::{Gateway, NetworkEntry};
use crate::network::Network;
use crate::rpc::Confirmation;

/// A transaction accepted by a node but not necessarily mined.
pub struct PendingTransaction {
    tx_hash: TxHash,
    entry: NetworkEntry,
}

impl PendingTransaction {
    pub(crate) fn new(tx_hash: TxHash, entry: NetworkEntry) -> Self {
        Self { tx_hash, entry }
    }

    pub fn hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn network(&self) -> Network {
        self.entry.profile.network
    }

    pub fn explorer_url(&self) -> Option<String> {
        self.entry.profile.explorer_tx_url(&self.tx_hash.to_string())
    }

    /// Block until the transaction is mined with `confirmations` blocks of depth.
    ///
    /// # Arguments
    /// * `confirmations` - Required depth; the inclusion block counts as one
    /// * `timeout` - Optional deadline for the whole wait
    ///
    /// # Errors
    /// [`GatewayError::Reverted`] when it was mined with a failure status,
    /// [`GatewayError::Confirmation`] when the wait times out or the node fails.
    pub async fn wait(
        &self,
        confirmations: u64,
        timeout: Option<Duration>,
    ) -> GatewayResult<Confirmation> {
        let confirmation = self
            .entry
            .observe(
                "wait_for_confirmation",
                self.entry.connection.wait_for_confirmation(
                    self.tx_hash,
                    confirmations.max(1),
                    timeout,
                ),
            )
            .await
            .map_err(|e| GatewayError::Confirmation {
                tx_hash: self.tx_hash,
                message: e.to_string(),
            })?;

        if !confirmation.success {
            return Err(GatewayError::Reverted {
                tx_hash: self.tx_hash,
                block_number: confirmation.block_number,
            });
        }

        tracing::info!(
            tx_hash = %self.tx_hash,
            network = %self.entry.profile.network,
            block_number = confirmation.block_number,
            "Transaction confirmed"
        );
        Ok(confirmation)
    }
}

impl std::fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("tx_hash", &self.tx_hash)
            .field("network", &self.entry.profile.network)
            .finish()
    }
}

impl Gateway {
    /// Sign and submit a transaction without waiting for it to be mined.
    ///
    /// The signer exists only for the duration of this call.
    pub async fn send_transaction(
        &self,
        request: TransactionRequest,
        signing_key: &str,
        network: Option<&str>,
    ) -> GatewayResult<PendingTransaction> {
        let wallet = self.create_wallet(signing_key, network)?;
        wallet.send_transaction(request).await
    }
}

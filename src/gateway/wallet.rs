//! Network-bound signers.
//!
//! # Security
//! - Keys arrive per call and are parsed straight into a signer
//! - Signers are never logged, serialized, or cloned out of a wallet
//! - Parse errors never echo any part of the key

use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, Signer};

use crate::gateway::transaction::PendingTransaction;
use crate::gateway::types::{GatewayError, GatewayResult};
use crate::gateway::{Gateway, NetworkEntry};
use crate::network::{Network, NetworkProfile};

/// Parse a hex private key (with or without `0x`).
pub(crate) fn parse_signing_key(signing_key: &str) -> GatewayResult<PrivateKeySigner> {
    let trimmed = signing_key.trim();
    let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    if key_hex.len() != 64 {
        return Err(GatewayError::InvalidKey(
            "expected 32 bytes of hex-encoded key material".to_string(),
        ));
    }

    key_hex.parse::<PrivateKeySigner>().map_err(|_| {
        GatewayError::InvalidKey("key is not valid hex-encoded secp256k1 key material".to_string())
    })
}

/// A signer bound to exactly one network.
pub struct NetworkWallet {
    signer: PrivateKeySigner,
    entry: NetworkEntry,
}

impl NetworkWallet {
    pub(crate) fn new(signing_key: &str, entry: &NetworkEntry) -> GatewayResult<Self> {
        let signer = parse_signing_key(signing_key)?
            .with_chain_id(Some(entry.profile.chain_id));

        tracing::debug!(
            address = %signer.address(),
            network = %entry.profile.network,
            "Wallet created"
        );

        Ok(Self {
            signer,
            entry: entry.clone(),
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn network(&self) -> Network {
        self.entry.profile.network
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.entry.profile
    }

    /// Sign and submit a transaction on this wallet's network.
    ///
    /// Returns once the node accepts the transaction. The chain id is filled
    /// from the network profile when the request leaves it unset.
    pub async fn send_transaction(
        &self,
        mut request: TransactionRequest,
    ) -> GatewayResult<PendingTransaction> {
        let profile = &self.entry.profile;
        let network = profile.network;
        if request.chain_id.is_none() {
            request.chain_id = Some(profile.chain_id);
        }
        if request.from.is_none() {
            request.from = Some(self.address());
        }

        let tx_hash = self
            .entry
            .observe(
                "eth_sendRawTransaction",
                self.entry.connection.send_transaction(request, &self.signer),
            )
            .await
            .map_err(|e| GatewayError::submission(network, e))?;

        tracing::info!(
            tx_hash = %tx_hash,
            network = %network,
            from = %self.address(),
            "Transaction submitted"
        );

        Ok(PendingTransaction::new(tx_hash, self.entry.clone()))
    }

    /// Sign arbitrary message bytes (EIP-191 prefixed).
    pub async fn sign_message(&self, message: &[u8]) -> GatewayResult<Signature> {
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| GatewayError::InvalidInput(format!("message signing failed: {}", e)))
    }
}

impl std::fmt::Debug for NetworkWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkWallet")
            .field("address", &self.address())
            .field("network", &self.entry.profile.network)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Bind a signing key to a network.
    ///
    /// Fails with [`GatewayError::InvalidKey`] when the key is malformed.
    pub fn create_wallet(
        &self,
        signing_key: &str,
        network: Option<&str>,
    ) -> GatewayResult<NetworkWallet> {
        let entry = self.entry(network)?;
        NetworkWallet::new(signing_key, entry)
    }
}

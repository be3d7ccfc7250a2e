//! Crop NFT and escrow payment operations.
//!
//! No contract is wired to these yet. Each operation fails with
//! [`GatewayError::NotImplemented`] before touching the network unless a
//! binding is plugged in with [`Gateway::with_nft_binding`] or
//! [`Gateway::with_escrow_binding`].

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::gateway::contract::ContractHandle;
use crate::gateway::queries::parse_address;
use crate::gateway::transaction::PendingTransaction;
use crate::gateway::types::{GatewayError, GatewayResult};
use crate::gateway::wallet::NetworkWallet;
use crate::gateway::{Gateway, NetworkEntry};
use crate::network::NetworkProfile;
use crate::rpc::RpcConnection;

const NFT_MISSING: &str = "no crop NFT contract binding is configured";
const ESCROW_MISSING: &str = "no escrow payment contract binding is configured";

/// Request to mint a crop NFT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropNftMint {
    pub recipient: Address,
    /// Metadata URI (typically an IPFS link produced upstream).
    pub token_uri: String,
}

/// On-chain state of a crop NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftDetails {
    pub token_id: U256,
    pub owner: Address,
    pub token_uri: String,
}

/// Request to lock a payment in escrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowPayment {
    /// Id of the payment record persisted by the caller.
    pub payment_record_id: String,
    pub payee: Address,
    /// Amount in the network's smallest unit.
    pub amount: U256,
}

/// What a binding sees of the resolved network.
#[derive(Clone)]
pub struct BindingContext {
    entry: NetworkEntry,
}

impl BindingContext {
    pub fn profile(&self) -> &NetworkProfile {
        &self.entry.profile
    }

    pub fn connection(&self) -> &Arc<dyn RpcConnection> {
        &self.entry.connection
    }

    /// Read-only handle to a contract on this network.
    pub fn contract(&self, address: Address, abi: JsonAbi) -> ContractHandle {
        ContractHandle::new(address, abi, self.entry.clone())
    }
}

/// Contract wiring for crop NFTs.
#[async_trait]
pub trait CropNftBinding: Send + Sync {
    async fn mint(
        &self,
        ctx: &BindingContext,
        wallet: &NetworkWallet,
        request: &CropNftMint,
    ) -> GatewayResult<PendingTransaction>;

    /// `None` when the token does not exist.
    async fn details(&self, ctx: &BindingContext, token_id: U256)
        -> GatewayResult<Option<NftDetails>>;

    async fn transfer(
        &self,
        ctx: &BindingContext,
        wallet: &NetworkWallet,
        token_id: U256,
        to: Address,
    ) -> GatewayResult<PendingTransaction>;
}

/// Contract wiring for escrowed payments.
#[async_trait]
pub trait EscrowBinding: Send + Sync {
    async fn create_payment(
        &self,
        ctx: &BindingContext,
        wallet: &NetworkWallet,
        payment: &EscrowPayment,
    ) -> GatewayResult<PendingTransaction>;

    async fn release_payment(
        &self,
        ctx: &BindingContext,
        wallet: &NetworkWallet,
        payment_record_id: &str,
    ) -> GatewayResult<PendingTransaction>;
}

impl Gateway {
    fn nft_binding(&self, capability: &'static str) -> GatewayResult<&Arc<dyn CropNftBinding>> {
        self.nft_binding.as_ref().ok_or(GatewayError::NotImplemented {
            capability,
            missing: NFT_MISSING,
        })
    }

    fn escrow_binding(&self, capability: &'static str) -> GatewayResult<&Arc<dyn EscrowBinding>> {
        self.escrow_binding.as_ref().ok_or(GatewayError::NotImplemented {
            capability,
            missing: ESCROW_MISSING,
        })
    }

    fn binding_context(&self, network: Option<&str>) -> GatewayResult<BindingContext> {
        Ok(BindingContext {
            entry: self.entry(network)?.clone(),
        })
    }

    /// Mint a crop NFT to `request.recipient`.
    pub async fn mint_crop_nft(
        &self,
        request: &CropNftMint,
        signing_key: &str,
        network: Option<&str>,
    ) -> GatewayResult<PendingTransaction> {
        let binding = self.nft_binding("crop NFT minting")?;
        let ctx = self.binding_context(network)?;
        let wallet = self.create_wallet(signing_key, network)?;
        binding.mint(&ctx, &wallet, request).await
    }

    /// Look up a crop NFT by token id.
    pub async fn get_nft_details(
        &self,
        token_id: U256,
        network: Option<&str>,
    ) -> GatewayResult<Option<NftDetails>> {
        let binding = self.nft_binding("crop NFT lookup")?;
        let ctx = self.binding_context(network)?;
        binding.details(&ctx, token_id).await
    }

    /// Transfer a crop NFT owned by the signing key's account.
    pub async fn transfer_nft(
        &self,
        token_id: U256,
        to: &str,
        signing_key: &str,
        network: Option<&str>,
    ) -> GatewayResult<PendingTransaction> {
        let binding = self.nft_binding("crop NFT transfer")?;
        let ctx = self.binding_context(network)?;
        let to = parse_address(to)?;
        let wallet = self.create_wallet(signing_key, network)?;
        binding.transfer(&ctx, &wallet, token_id, to).await
    }

    /// Lock a payment in the escrow contract.
    pub async fn create_blockchain_payment(
        &self,
        payment: &EscrowPayment,
        signing_key: &str,
        network: Option<&str>,
    ) -> GatewayResult<PendingTransaction> {
        let binding = self.escrow_binding("blockchain escrow payment creation")?;
        let ctx = self.binding_context(network)?;
        let wallet = self.create_wallet(signing_key, network)?;
        binding.create_payment(&ctx, &wallet, payment).await
    }

    /// Release an escrowed payment to its payee.
    pub async fn release_blockchain_payment(
        &self,
        payment_record_id: &str,
        signing_key: &str,
        network: Option<&str>,
    ) -> GatewayResult<PendingTransaction> {
        let binding = self.escrow_binding("blockchain escrow payment release")?;
        let ctx = self.binding_context(network)?;
        let wallet = self.create_wallet(signing_key, network)?;
        binding.release_payment(&ctx, &wallet, payment_record_id).await
    }
}

//! ABI-bound contract handles.

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;

use crate::gateway::queries::parse_address;
use crate::gateway::transaction::PendingTransaction;
use crate::gateway::types::{GatewayError, GatewayResult};
use crate::gateway::wallet::NetworkWallet;
use crate::gateway::{Gateway, NetworkEntry};
use crate::network::Network;

/// Read-only handle to a deployed contract on one network.
#[derive(Clone)]
pub struct ContractHandle {
    address: Address,
    abi: Arc<JsonAbi>,
    entry: NetworkEntry,
}

impl ContractHandle {
    pub(crate) fn new(address: Address, abi: JsonAbi, entry: NetworkEntry) -> Self {
        Self {
            address,
            abi: Arc::new(abi),
            entry,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn network(&self) -> Network {
        self.entry.profile.network
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    fn function(&self, name: &str, args: &[DynSolValue]) -> GatewayResult<&Function> {
        let overloads = self.abi.function(name).ok_or_else(|| {
            GatewayError::InvalidInput(format!("function '{}' not found in ABI", name))
        })?;

        overloads
            .iter()
            .find(|f| f.inputs.len() == args.len())
            .ok_or_else(|| {
                GatewayError::InvalidInput(format!(
                    "function '{}' does not take {} arguments",
                    name,
                    args.len()
                ))
            })
    }

    fn encode(&self, function: &Function, args: &[DynSolValue]) -> GatewayResult<TransactionRequest> {
        let input = function.abi_encode_input(args).map_err(|e| {
            GatewayError::InvalidInput(format!("cannot encode '{}' arguments: {}", function.name, e))
        })?;

        Ok(TransactionRequest::default()
            .with_to(self.address)
            .with_input(input))
    }

    /// Execute a view function and decode its outputs.
    pub async fn call(&self, name: &str, args: &[DynSolValue]) -> GatewayResult<Vec<DynSolValue>> {
        let function = self.function(name, args)?;
        let request = self.encode(function, args)?;
        let network = self.entry.profile.network;

        let output = self
            .entry
            .observe("eth_call", self.entry.connection.call(&request))
            .await
            .map_err(|e| GatewayError::contract_call(network, e))?;

        function
            .abi_decode_output(&output)
            .map_err(|e| GatewayError::ContractCall {
                network,
                message: format!("cannot decode '{}' output: {}", name, e),
            })
    }

    /// Submit a state-changing call signed by `wallet`.
    ///
    /// The wallet must be bound to the same network as this handle.
    pub async fn send(
        &self,
        wallet: &NetworkWallet,
        name: &str,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> GatewayResult<PendingTransaction> {
        if wallet.network() != self.network() {
            return Err(GatewayError::InvalidInput(format!(
                "wallet is bound to {} but contract is on {}",
                wallet.network(),
                self.network()
            )));
        }

        let function = self.function(name, args)?;
        let mut request = self.encode(function, args)?;
        if let Some(value) = value {
            request.set_value(value);
        }
        wallet.send_transaction(request).await
    }
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("network", &self.entry.profile.network)
            .field("functions", &self.abi.functions.len())
            .finish()
    }
}

impl Gateway {
    /// Bind an ABI and address to a network. No signer is attached.
    pub fn create_contract(
        &self,
        address: &str,
        abi: JsonAbi,
        network: Option<&str>,
    ) -> GatewayResult<ContractHandle> {
        let entry = self.entry(network)?;
        let address = parse_address(address)?;
        Ok(ContractHandle::new(address, abi, entry.clone()))
    }
}

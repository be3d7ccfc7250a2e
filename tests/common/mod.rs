//! Shared mock connection for integration tests.

#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::{Transaction, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chain_gateway::network::{Network, NetworkProfile};
use chain_gateway::rpc::{Confirmation, FeeRates, RpcConnection, RpcFailure};
use chain_gateway::Gateway;

/// Anvil's first account; publicly known, never holds real funds.
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Behaviour of the mock when confirmation is awaited.
#[derive(Clone)]
pub enum WaitBehaviour {
    Never,
    Mined(Confirmation),
    Fail(RpcFailure),
}

/// Programmable [`RpcConnection`].
pub struct MockConnection {
    pub chain_id: u64,
    pub block_number: Result<u64, RpcFailure>,
    pub block_delay: Duration,
    pub balance: U256,
    pub gas: Result<u64, RpcFailure>,
    pub fees: Result<FeeRates, RpcFailure>,
    pub fee_delay: Duration,
    pub call_output: Result<Bytes, RpcFailure>,
    pub send_result: Result<TxHash, RpcFailure>,
    pub wait: WaitBehaviour,
    pub calls: AtomicUsize,
    pub sent: Mutex<Vec<TransactionRequest>>,
    pub signers: Mutex<Vec<Address>>,
}

impl Default for MockConnection {
    fn default() -> Self {
        Self {
            chain_id: 137,
            block_number: Ok(1_000),
            block_delay: Duration::ZERO,
            balance: U256::ZERO,
            gas: Ok(21_000),
            fees: Ok(FeeRates {
                gas_price: Some(30_000_000_000),
                max_fee_per_gas: Some(40_000_000_000),
                max_priority_fee_per_gas: Some(2_000_000_000),
            }),
            fee_delay: Duration::ZERO,
            call_output: Ok(Bytes::new()),
            send_result: Ok(TxHash::repeat_byte(0xab)),
            wait: WaitBehaviour::Never,
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            signers: Mutex::new(Vec::new()),
        }
    }
}

impl MockConnection {
    /// Number of upstream calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn signers(&self) -> Vec<Address> {
        self.signers.lock().unwrap().clone()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RpcConnection for MockConnection {
    async fn chain_id(&self) -> Result<u64, RpcFailure> {
        self.hit();
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64, RpcFailure> {
        self.hit();
        tokio::time::sleep(self.block_delay).await;
        self.block_number.clone()
    }

    async fn balance(&self, _address: Address) -> Result<U256, RpcFailure> {
        self.hit();
        Ok(self.balance)
    }

    async fn transaction(&self, _tx_hash: TxHash) -> Result<Option<Transaction>, RpcFailure> {
        self.hit();
        Ok(None)
    }

    async fn estimate_gas(&self, _request: &TransactionRequest) -> Result<u64, RpcFailure> {
        self.hit();
        self.gas.clone()
    }

    async fn fee_rates(&self) -> Result<FeeRates, RpcFailure> {
        self.hit();
        tokio::time::sleep(self.fee_delay).await;
        self.fees.clone()
    }

    async fn call(&self, _request: &TransactionRequest) -> Result<Bytes, RpcFailure> {
        self.hit();
        self.call_output.clone()
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest,
        signer: &PrivateKeySigner,
    ) -> Result<TxHash, RpcFailure> {
        self.hit();
        self.sent.lock().unwrap().push(request);
        self.signers.lock().unwrap().push(signer.address());
        self.send_result.clone()
    }

    async fn wait_for_confirmation(
        &self,
        _tx_hash: TxHash,
        _confirmations: u64,
        _timeout: Option<Duration>,
    ) -> Result<Confirmation, RpcFailure> {
        self.hit();
        match &self.wait {
            WaitBehaviour::Never => std::future::pending().await,
            WaitBehaviour::Mined(confirmation) => Ok(confirmation.clone()),
            WaitBehaviour::Fail(failure) => Err(failure.clone()),
        }
    }
}

/// Gateway with a single Polygon network backed by `mock`.
pub fn polygon_gateway(mock: MockConnection) -> (Gateway, Arc<MockConnection>) {
    let mock = Arc::new(mock);
    let gateway = Gateway::new(
        Network::Polygon,
        [(
            NetworkProfile::builtin(Network::Polygon),
            mock.clone() as Arc<dyn RpcConnection>,
        )],
    )
    .unwrap();
    (gateway, mock)
}

/// Gateway with a default-behaviour mock for every network.
pub fn full_gateway() -> (Gateway, Vec<Arc<MockConnection>>) {
    let mocks: Vec<Arc<MockConnection>> = Network::ALL
        .iter()
        .map(|network| {
            Arc::new(MockConnection {
                chain_id: network.chain_id(),
                ..MockConnection::default()
            })
        })
        .collect();

    let connections = Network::ALL.iter().zip(&mocks).map(|(network, mock)| {
        (
            NetworkProfile::builtin(*network),
            mock.clone() as Arc<dyn RpcConnection>,
        )
    });

    (Gateway::new(Network::Polygon, connections).unwrap(), mocks)
}

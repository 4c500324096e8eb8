use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportError;
use async_trait::async_trait;
use color_eyre::eyre::Result;
use tracing::{debug, info};

use crate::data::contract;
use crate::data::gateway::{ContractGateway, ReceiptStatus};
use crate::data::types::{ContractCall, Contracts, Room};
use crate::error::GatewayError;

/// EIP-1193 "user rejected request", returned by remote signers.
const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC gateway over a boxed alloy provider, with an optional local signer
/// filling and signing writes.
pub struct RpcGateway {
    provider: Box<dyn Provider + Send + Sync>,
    chain_id: u64,
    contracts: Contracts,
    account: Option<Address>,
}

impl RpcGateway {
    /// Connect to a node via HTTP RPC. Without a key the gateway is read-only.
    pub async fn connect(
        rpc_url: &str,
        private_key: Option<&str>,
        contracts: Contracts,
    ) -> Result<Self> {
        let url = rpc_url.parse()?;

        let (provider, account): (Box<dyn Provider + Send + Sync>, Option<Address>) =
            match private_key {
                Some(key) => {
                    let signer: PrivateKeySigner = key.trim().parse()?;
                    let account = signer.address();
                    let provider = ProviderBuilder::new()
                        .wallet(EthereumWallet::from(signer))
                        .on_http(url);
                    (Box::new(provider), Some(account))
                }
                None => (Box::new(ProviderBuilder::new().on_http(url)), None),
            };

        let chain_id = provider.get_chain_id().await?;
        info!(chain_id, ?account, "connected to {rpc_url}");

        Ok(Self {
            provider,
            chain_id,
            contracts,
            account,
        })
    }

    async fn read(&self, to: Address, calldata: Bytes) -> Result<Bytes, GatewayError> {
        let tx = TransactionRequest::default().to(to).input(calldata.into());
        self.provider
            .call(tx)
            .await
            .map_err(|e| GatewayError::Read(e.to_string()))
    }
}

#[async_trait]
impl ContractGateway for RpcGateway {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn contracts(&self) -> Contracts {
        self.contracts
    }

    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn get_all_rooms(&self) -> Result<Vec<Room>, GatewayError> {
        let data = self
            .read(self.contracts.booking, contract::get_all_rooms_calldata())
            .await?;
        contract::decode_rooms(&data)
    }

    async fn owner(&self) -> Result<Address, GatewayError> {
        let data = self
            .read(self.contracts.booking, contract::owner_calldata())
            .await?;
        contract::decode_owner(&data)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, GatewayError> {
        let data = self
            .read(
                self.contracts.token,
                contract::allowance_calldata(owner, spender),
            )
            .await?;
        contract::decode_allowance(&data)
    }

    async fn submit(&self, call: &ContractCall) -> Result<B256, GatewayError> {
        let from = self
            .account
            .ok_or_else(|| GatewayError::Submission("no signing key configured".to_string()))?;

        let tx = TransactionRequest::default()
            .from(from)
            .to(call.target(&self.contracts))
            .input(contract::encode_call(call).into());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(submission_error)?;
        let hash = *pending.tx_hash();
        debug!(%hash, function = call.function_name(), "transaction accepted by node");
        Ok(hash)
    }

    async fn receipt(&self, hash: B256) -> Result<ReceiptStatus, GatewayError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| GatewayError::Read(e.to_string()))?;
        Ok(match receipt {
            None => ReceiptStatus::NotFound,
            Some(r) if r.status() => ReceiptStatus::Success,
            Some(_) => ReceiptStatus::Reverted,
        })
    }
}

fn submission_error(err: TransportError) -> GatewayError {
    match err.as_error_resp() {
        Some(payload) if payload.code == USER_REJECTED_CODE => GatewayError::UserRejected,
        _ => GatewayError::Submission(err.to_string()),
    }
}

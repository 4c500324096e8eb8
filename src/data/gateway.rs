use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::data::types::{ContractCall, Contracts, Room};
use crate::error::GatewayError;

/// Outcome of one receipt lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// Not mined yet.
    NotFound,
    Success,
    Reverted,
}

/// Read/write surface of the booking contract and its payment token.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    fn chain_id(&self) -> u64;

    fn contracts(&self) -> Contracts;

    /// Account that signs writes, if a signer is configured.
    fn account(&self) -> Option<Address>;

    async fn get_all_rooms(&self) -> Result<Vec<Room>, GatewayError>;

    async fn owner(&self) -> Result<Address, GatewayError>;

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, GatewayError>;

    /// Sign and submit a write, returning the transaction hash.
    async fn submit(&self, call: &ContractCall) -> Result<B256, GatewayError>;

    async fn receipt(&self, hash: B256) -> Result<ReceiptStatus, GatewayError>;
}

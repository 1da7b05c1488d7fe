//! Chain collaborator: the issuing contract as seen from one signing account.

use alloy::primitives::{Address, Bytes, Log, B256};
use async_trait::async_trait;

use crate::error::ChainError;
use crate::fhe::{CiphertextHandle, EncryptedInput};
use crate::TokenId;

/// Confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub success: bool,
    pub logs: Vec<Log>,
}

/// Confirmed mint. `token_id` is set when the client could read the mint
/// call's return value; otherwise the workflow inspects `receipt.logs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub receipt: TxReceipt,
    pub token_id: Option<TokenId>,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Account that signs and submits transactions
    fn account(&self) -> Address;

    /// Address of the issuing contract
    fn contract(&self) -> Address;

    /// Sign and broadcast `mint(handle, proof, imageURI)`
    async fn send_mint(&self, input: &EncryptedInput, image_uri: &str) -> Result<B256, ChainError>;

    /// Sign and broadcast `transferFrom(from, to, tokenId)`
    async fn send_transfer(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<B256, ChainError>;

    /// Block until `tx_hash` is included
    async fn confirm(&self, tx_hash: B256) -> Result<TxReceipt, ChainError>;

    async fn confirm_mint(&self, tx_hash: B256) -> Result<MintReceipt, ChainError> {
        let receipt = self.confirm(tx_hash).await?;
        Ok(MintReceipt {
            receipt,
            token_id: None,
        })
    }

    /// Fails with [`ChainError::NotInitialized`] when the contract has no
    /// message for the token.
    async fn encrypted_message(&self, token_id: TokenId) -> Result<CiphertextHandle, ChainError>;

    async fn image_uri(&self, token_id: TokenId) -> Result<String, ChainError>;

    async fn tokens_owned_by(&self, owner: Address) -> Result<Vec<TokenId>, ChainError>;

    /// Sign a 32-byte digest with the account key
    async fn sign_hash(&self, hash: B256) -> Result<Bytes, ChainError>;
}

//! [`ChainClient`] over an alloy provider with a local signing key.

use std::fmt::Display;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use tracing::{debug, info};

use sealmint_lib::contract::{token_id_from_u256, IEncryptedNft};
use sealmint_lib::{ChainClient, ChainError, CiphertextHandle, EncryptedInput, TokenId, TxReceipt};

/// How long to wait for a receipt before giving up
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

pub struct AlloyChain {
    provider: DynProvider,
    signer: PrivateKeySigner,
    contract: Address,
    confirmations: u64,
    timeout: Duration,
}

impl AlloyChain {
    pub async fn connect(
        rpc_url: &str,
        signer: PrivateKeySigner,
        contract: Address,
    ) -> Result<Self, ChainError> {
        let provider = ProviderBuilder::new()
            .wallet(signer.clone())
            .connect(rpc_url)
            .await
            .map_err(|e| ChainError::Rpc(format!("cannot connect to {rpc_url}: {e}")))?
            .erased();

        info!(account = %signer.address(), %contract, "connected to {}", rpc_url);
        Ok(Self {
            provider,
            signer,
            contract,
            confirmations: 1,
            timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        })
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn nft(&self) -> IEncryptedNft::IEncryptedNftInstance<DynProvider> {
        IEncryptedNft::new(self.contract, self.provider.clone())
    }
}

/// Sort a send failure into the wallet-facing categories.
pub fn classify_send_error(err: impl Display) -> ChainError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("rejected") || lower.contains("denied") {
        ChainError::Rejected(message)
    } else if lower.contains("revert") {
        ChainError::Reverted(message)
    } else {
        ChainError::Rpc(message)
    }
}

/// Sort a view-call failure; an unset message reverts with "not initialized".
pub fn classify_read_error(token_id: TokenId, err: impl Display) -> ChainError {
    let message = err.to_string();
    if message.to_lowercase().contains("not initialized") {
        ChainError::NotInitialized(token_id)
    } else {
        ChainError::Rpc(message)
    }
}

#[async_trait]
impl ChainClient for AlloyChain {
    fn account(&self) -> Address {
        self.signer.address()
    }

    fn contract(&self) -> Address {
        self.contract
    }

    async fn send_mint(&self, input: &EncryptedInput, image_uri: &str) -> Result<B256, ChainError> {
        let pending = self
            .nft()
            .mint(input.handle.0, input.proof.clone(), image_uri.to_string())
            .send()
            .await
            .map_err(classify_send_error)?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "mint broadcast");
        Ok(tx_hash)
    }

    async fn send_transfer(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<B256, ChainError> {
        let pending = self
            .nft()
            .transferFrom(from, to, U256::from(token_id))
            .send()
            .await
            .map_err(classify_send_error)?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, token_id, "transfer broadcast");
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: B256) -> Result<TxReceipt, ChainError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(format!("waiting for {tx_hash}: {e}")))?;

        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect();
        Ok(TxReceipt {
            tx_hash,
            success: receipt.status(),
            logs,
        })
    }

    async fn encrypted_message(&self, token_id: TokenId) -> Result<CiphertextHandle, ChainError> {
        let handle = self
            .nft()
            .getEncryptedMessage(U256::from(token_id))
            .call()
            .await
            .map_err(|e| classify_read_error(token_id, e))?;
        Ok(CiphertextHandle(handle))
    }

    async fn image_uri(&self, token_id: TokenId) -> Result<String, ChainError> {
        self.nft()
            .getImageURI(U256::from(token_id))
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn tokens_owned_by(&self, owner: Address) -> Result<Vec<TokenId>, ChainError> {
        let ids = self
            .nft()
            .tokensOwnedBy(owner)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        ids.into_iter()
            .map(|id| {
                token_id_from_u256(id)
                    .ok_or_else(|| ChainError::Rpc(format!("token id {id} does not fit in 64 bits")))
            })
            .collect()
    }

    async fn sign_hash(&self, hash: B256) -> Result<Bytes, ChainError> {
        let signature = self
            .signer
            .sign_hash(&hash)
            .await
            .map_err(|e| ChainError::Rejected(e.to_string()))?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}

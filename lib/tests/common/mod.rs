//! In-memory collaborators for workflow tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, Log, B256, U256};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;

use sealmint_lib::contract::IEncryptedNft;
use sealmint_lib::fhe::{Authorization, KeyPair, SignedAuthorization, ValidityWindow};
use sealmint_lib::{
    CiphertextHandle, ChainClient, ChainError, EncryptedInput, FheClient, FheError, ImageFile,
    ImageHost, KeyValueStore, MintReceipt, StoreError, TokenId, TxReceipt, UploadError,
    UploadResult,
};

pub const NFT: Address = address!("1111111111111111111111111111111111111111");
pub const VERIFIER: Address = address!("2222222222222222222222222222222222222222");
pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");
pub const BOB_HEX: &str = "0x0000000000000000000000000000000000000b0b";

/// A PNG-looking image of exactly `size` bytes
pub fn png(size: usize) -> ImageFile {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    bytes.resize(size, 0);
    ImageFile::new("art.png", "image/png", bytes)
}

#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub owner: Address,
    pub handle: CiphertextHandle,
    pub image_uri: String,
}

enum PendingTx {
    Mint {
        owner: Address,
        handle: CiphertextHandle,
        image_uri: String,
    },
    Transfer {
        to: Address,
        token_id: TokenId,
    },
}

#[derive(Default)]
struct ChainState {
    tokens: BTreeMap<TokenId, TokenRecord>,
    pending: HashMap<B256, PendingTx>,
    next_token: TokenId,
    sent: usize,
    handle_reads: usize,
    revert_next: bool,
}

/// Contract simulation shared by several accounts
#[derive(Clone)]
pub struct MockChain {
    account: Address,
    state: Arc<Mutex<ChainState>>,
    tx_counter: Arc<AtomicU64>,
    /// Report the minted id directly instead of only through logs
    pub returns_token_id: bool,
}

impl MockChain {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            state: Arc::new(Mutex::new(ChainState {
                next_token: 1,
                ..Default::default()
            })),
            tx_counter: Arc::new(AtomicU64::new(0)),
            returns_token_id: true,
        }
    }

    /// Same chain, different signing account
    pub fn as_account(&self, account: Address) -> Self {
        Self {
            account,
            ..self.clone()
        }
    }

    pub fn logs_only(mut self) -> Self {
        self.returns_token_id = false;
        self
    }

    pub fn insert_token(&self, token_id: TokenId, owner: Address, handle: CiphertextHandle) {
        self.state.lock().unwrap().tokens.insert(
            token_id,
            TokenRecord {
                owner,
                handle,
                image_uri: "ipfs://seeded".into(),
            },
        );
    }

    pub fn token(&self, token_id: TokenId) -> Option<TokenRecord> {
        self.state.lock().unwrap().tokens.get(&token_id).cloned()
    }

    pub fn sent_transactions(&self) -> usize {
        self.state.lock().unwrap().sent
    }

    /// Number of `encrypted_message` calls so far
    pub fn handle_reads(&self) -> usize {
        self.state.lock().unwrap().handle_reads
    }

    pub fn revert_next(&self) {
        self.state.lock().unwrap().revert_next = true;
    }

    fn next_hash(&self) -> B256 {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        B256::from(U256::from(n))
    }

    fn transfer_log(from: Address, to: Address, token_id: TokenId) -> Log {
        let event = IEncryptedNft::Transfer {
            from,
            to,
            tokenId: U256::from(token_id),
        };
        Log {
            address: NFT,
            data: event.encode_log_data(),
        }
    }

    /// Apply a pending transaction; returns the receipt and any minted id
    fn settle(&self, tx_hash: B256) -> Result<(TxReceipt, Option<TokenId>), ChainError> {
        let mut state = self.state.lock().unwrap();
        let pending = state
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| ChainError::Rpc(format!("unknown transaction {tx_hash}")))?;

        if std::mem::take(&mut state.revert_next) {
            let receipt = TxReceipt {
                tx_hash,
                success: false,
                logs: vec![],
            };
            return Ok((receipt, None));
        }

        let (logs, minted) = match pending {
            PendingTx::Mint {
                owner,
                handle,
                image_uri,
            } => {
                let token_id = state.next_token;
                state.next_token += 1;
                state.tokens.insert(
                    token_id,
                    TokenRecord {
                        owner,
                        handle,
                        image_uri,
                    },
                );
                (vec![Self::transfer_log(Address::ZERO, owner, token_id)], Some(token_id))
            }
            PendingTx::Transfer { to, token_id } => {
                let record = state
                    .tokens
                    .get_mut(&token_id)
                    .ok_or_else(|| ChainError::Reverted("ERC721NonexistentToken".into()))?;
                let from = record.owner;
                record.owner = to;
                (vec![Self::transfer_log(from, to, token_id)], None)
            }
        };

        let receipt = TxReceipt {
            tx_hash,
            success: true,
            logs,
        };
        Ok((receipt, minted))
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn account(&self) -> Address {
        self.account
    }

    fn contract(&self) -> Address {
        NFT
    }

    async fn send_mint(&self, input: &EncryptedInput, image_uri: &str) -> Result<B256, ChainError> {
        tokio::task::yield_now().await;
        let tx_hash = self.next_hash();
        let mut state = self.state.lock().unwrap();
        state.sent += 1;
        state.pending.insert(
            tx_hash,
            PendingTx::Mint {
                owner: self.account,
                handle: input.handle,
                image_uri: image_uri.to_string(),
            },
        );
        Ok(tx_hash)
    }

    async fn send_transfer(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<B256, ChainError> {
        tokio::task::yield_now().await;
        let tx_hash = self.next_hash();
        let mut state = self.state.lock().unwrap();
        match state.tokens.get(&token_id) {
            Some(record) if record.owner == from => {}
            _ => return Err(ChainError::Rejected("ERC721IncorrectOwner".into())),
        }
        state.sent += 1;
        state
            .pending
            .insert(tx_hash, PendingTx::Transfer { to, token_id });
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: B256) -> Result<TxReceipt, ChainError> {
        tokio::task::yield_now().await;
        self.settle(tx_hash).map(|(receipt, _)| receipt)
    }

    async fn confirm_mint(&self, tx_hash: B256) -> Result<MintReceipt, ChainError> {
        tokio::task::yield_now().await;
        let (receipt, minted) = self.settle(tx_hash)?;
        Ok(MintReceipt {
            receipt,
            token_id: if self.returns_token_id { minted } else { None },
        })
    }

    async fn encrypted_message(&self, token_id: TokenId) -> Result<CiphertextHandle, ChainError> {
        self.state.lock().unwrap().handle_reads += 1;
        self.token(token_id)
            .map(|record| record.handle)
            .ok_or(ChainError::NotInitialized(token_id))
    }

    async fn image_uri(&self, token_id: TokenId) -> Result<String, ChainError> {
        self.token(token_id)
            .map(|record| record.image_uri)
            .ok_or_else(|| ChainError::Reverted("ERC721NonexistentToken".into()))
    }

    async fn tokens_owned_by(&self, owner: Address) -> Result<Vec<TokenId>, ChainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tokens
            .iter()
            .filter(|(_, record)| record.owner == owner)
            .map(|(id, _)| *id)
            .collect())
    }

    async fn sign_hash(&self, hash: B256) -> Result<Bytes, ChainError> {
        let mut signature = hash.to_vec();
        signature.push(27);
        Ok(signature.into())
    }
}

/// FHE service double. Handles carry the packed value in the clear so that
/// "decryption" can recover it.
pub struct MockFhe {
    pub encrypt_calls: AtomicUsize,
    pub decrypt_calls: AtomicUsize,
    /// When false, decrypt reports the service as unavailable
    pub decrypt_enabled: bool,
    pub fail_encrypt: bool,
    pub decrypt_delay: Duration,
}

impl MockFhe {
    pub fn new() -> Self {
        Self {
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
            decrypt_enabled: false,
            fail_encrypt: false,
            decrypt_delay: Duration::ZERO,
        }
    }

    pub fn with_decrypt(mut self, delay: Duration) -> Self {
        self.decrypt_enabled = true;
        self.decrypt_delay = delay;
        self
    }

    pub fn failing_encrypt(mut self) -> Self {
        self.fail_encrypt = true;
        self
    }

    pub fn encrypts(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    pub fn decrypts(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FheClient for MockFhe {
    async fn encrypt(
        &self,
        value: U256,
        _contract: Address,
        _account: Address,
    ) -> Result<EncryptedInput, FheError> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_encrypt {
            return Err(FheError::Failed("relayer returned 500".into()));
        }
        Ok(EncryptedInput {
            handle: CiphertextHandle(B256::from(value)),
            proof: Bytes::from_static(b"proof"),
        })
    }

    fn generate_keypair(&self) -> Result<KeyPair, FheError> {
        Ok(KeyPair {
            public_key: Bytes::from_static(b"public"),
            private_key: Bytes::from_static(b"private"),
        })
    }

    fn build_authorization(
        &self,
        public_key: Bytes,
        contracts: &[Address],
        window: ValidityWindow,
    ) -> Authorization {
        Authorization::new(public_key, contracts, window, 31337, VERIFIER)
    }

    async fn decrypt(
        &self,
        handle: CiphertextHandle,
        _contract: Address,
        authorization: &SignedAuthorization,
    ) -> Result<U256, FheError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.decrypt_delay).await;
        if !self.decrypt_enabled {
            return Err(FheError::Unavailable("user decryption not implemented".into()));
        }
        assert_eq!(authorization.signature.len(), 33);
        Ok(U256::from_be_bytes(handle.0 .0))
    }
}

/// Store whose writes always fail; reads see nothing
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

/// Image host that counts calls and either succeeds or fails
pub struct CountingHost {
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
}

impl CountingHost {
    /// Host plus a handle on its call counter
    pub fn new(fail: bool) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let host = Self {
            calls: Arc::clone(&calls),
            fail,
        };
        (host, calls)
    }
}

#[async_trait]
impl ImageHost for CountingHost {
    fn name(&self) -> &str {
        "counting"
    }

    async fn upload(&self, file: &ImageFile) -> Result<UploadResult, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(UploadError::Host("401 Unauthorized".into()));
        }
        Ok(UploadResult {
            on_chain_uri: format!("ipfs://cid-{}", file.size()),
            preview_url: format!("https://gateway.test/ipfs/cid-{}", file.size()),
        })
    }
}

//! Mint / transfer / reveal workflow
//!
//! [`Workflow`] sequences the collaborators and owns the local message cache.
//! A mint runs upload → encrypt → submit → confirm → cache-write, strictly in
//! that order, and aborts at the first failing stage. A reveal answers from
//! the cache when it can, otherwise decrypts remotely, and degrades to a
//! placeholder when remote decryption is not possible.
//!
//! Each operation publishes its state on a `watch` channel so a presentation
//! layer can follow along without driving the workflow.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use tokio::sync::{watch, Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::cache::MessageCache;
use crate::chain::ChainClient;
use crate::contract::minted_token_id;
use crate::error::{ChainError, FheError, Result, WorkflowError};
use crate::fhe::{
    decode_message, encode_message, CiphertextHandle, FheClient, SignedAuthorization,
    ValidityWindow, DEFAULT_VALIDITY_DAYS,
};
use crate::status::{MintStatus, RevealStatus, TransferStatus};
use crate::upload::{ImageFile, ImageUploader, UploadResult};
use crate::validation::{parse_address, validate_message};
use crate::TokenId;

/// Shown instead of the message when this device cannot reveal it
pub const PLACEHOLDER_MESSAGE: &str = "Encrypted: only the owning device can reveal this message";

/// Whether a cache miss may fall through to remote decryption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealMode {
    /// Cache only; a miss shows the placeholder
    LocalOnly,
    #[default]
    Remote,
}

impl FromStr for RevealMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "local-only" => Ok(RevealMode::LocalOnly),
            "remote" => Ok(RevealMode::Remote),
            other => Err(format!("unknown reveal mode {other:?}, expected local or remote")),
        }
    }
}

/// Outcome of a reveal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reveal {
    /// Plaintext remembered by this device at mint time
    Cached(String),
    /// Plaintext recovered through the FHE service
    Decrypted(String),
    Placeholder,
}

impl Reveal {
    pub fn plaintext(&self) -> Option<&str> {
        match self {
            Reveal::Cached(text) | Reveal::Decrypted(text) => Some(text),
            Reveal::Placeholder => None,
        }
    }

    pub fn display_text(&self) -> &str {
        self.plaintext().unwrap_or(PLACEHOLDER_MESSAGE)
    }

    fn status(&self) -> RevealStatus {
        match self {
            Reveal::Cached(text) => RevealStatus::CacheHit(text.clone()),
            Reveal::Decrypted(text) => RevealStatus::Revealed(text.clone()),
            Reveal::Placeholder => RevealStatus::EncryptedPlaceholder,
        }
    }
}

/// Result of a successful mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minted {
    pub token_id: TokenId,
    pub tx_hash: B256,
    pub upload: UploadResult,
}

/// One gallery entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenView {
    pub token_id: TokenId,
    pub image_uri: String,
    pub status: RevealStatus,
}

type RevealOutcome = Result<Reveal>;

pub struct Workflow<'a> {
    chain: &'a dyn ChainClient,
    fhe: &'a dyn FheClient,
    uploader: &'a ImageUploader,
    cache: MessageCache,
    mode: RevealMode,
    validity_days: u64,
    mint_status: watch::Sender<MintStatus>,
    transfer_status: watch::Sender<TransferStatus>,
    reveals: watch::Sender<HashMap<TokenId, RevealStatus>>,
    in_flight: Mutex<HashMap<TokenId, Arc<OnceCell<RevealOutcome>>>>,
}

impl<'a> Workflow<'a> {
    pub fn new(
        chain: &'a dyn ChainClient,
        fhe: &'a dyn FheClient,
        uploader: &'a ImageUploader,
        cache: MessageCache,
    ) -> Self {
        Self {
            chain,
            fhe,
            uploader,
            cache,
            mode: RevealMode::default(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            mint_status: watch::channel(MintStatus::Idle).0,
            transfer_status: watch::channel(TransferStatus::Idle).0,
            reveals: watch::channel(HashMap::new()).0,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_reveal_mode(mut self, mode: RevealMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_validity_days(mut self, days: u64) -> Self {
        self.validity_days = days;
        self
    }

    pub fn account(&self) -> Address {
        self.chain.account()
    }

    pub fn subscribe_mint(&self) -> watch::Receiver<MintStatus> {
        self.mint_status.subscribe()
    }

    pub fn subscribe_transfer(&self) -> watch::Receiver<TransferStatus> {
        self.transfer_status.subscribe()
    }

    pub fn subscribe_reveals(&self) -> watch::Receiver<HashMap<TokenId, RevealStatus>> {
        self.reveals.subscribe()
    }

    pub fn mint_status(&self) -> MintStatus {
        self.mint_status.borrow().clone()
    }

    pub fn transfer_status(&self) -> TransferStatus {
        self.transfer_status.borrow().clone()
    }

    pub fn reveal_status(&self, token_id: TokenId) -> RevealStatus {
        self.reveals
            .borrow()
            .get(&token_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Plaintext this device remembers for one of the account's tokens
    pub fn cached_message(&self, token_id: TokenId) -> Option<String> {
        self.cache.get(self.account(), token_id)
    }

    // ---------------------------------------------------------------------
    // Mint
    // ---------------------------------------------------------------------

    /// Mint a token carrying `message` encrypted and `image` as its picture.
    pub async fn mint(&self, message: &str, image: &ImageFile) -> Result<Minted> {
        let outcome = self.run_mint(message, image).await;
        match &outcome {
            Ok(minted) => {
                info!(token_id = minted.token_id, tx = %minted.tx_hash, "mint confirmed");
                self.set_mint(MintStatus::Minted(minted.token_id));
            }
            Err(e) => {
                warn!(error = %e, "mint failed");
                self.set_mint(MintStatus::Failed(e.to_string()));
            }
        }
        outcome
    }

    async fn run_mint(&self, message: &str, image: &ImageFile) -> Result<Minted> {
        validate_message(message)?;
        image.validate()?;

        let account = self.chain.account();
        let contract = self.chain.contract();

        self.set_mint(MintStatus::Uploading);
        let upload = self.uploader.upload(image).await?;

        self.set_mint(MintStatus::Encrypting);
        let input = self
            .fhe
            .encrypt(encode_message(message), contract, account)
            .await
            .map_err(WorkflowError::Encryption)?;
        debug!(handle = %input.handle, "message encrypted");

        self.set_mint(MintStatus::AwaitingSignature);
        let tx_hash = self
            .chain
            .send_mint(&input, &upload.on_chain_uri)
            .await
            .map_err(WorkflowError::Transaction)?;
        info!(tx = %tx_hash, "mint submitted");

        self.set_mint(MintStatus::AwaitingConfirmation);
        let minted = self
            .chain
            .confirm_mint(tx_hash)
            .await
            .map_err(WorkflowError::Transaction)?;
        if !minted.receipt.success {
            return Err(WorkflowError::Transaction(ChainError::Reverted(format!(
                "mint transaction {tx_hash} reverted"
            ))));
        }

        let token_id = minted
            .token_id
            .or_else(|| minted_token_id(contract, &minted.receipt.logs))
            .ok_or_else(|| WorkflowError::MissingTokenId(tx_hash.to_string()))?;

        self.cache.remember(account, token_id, message);

        Ok(Minted {
            token_id,
            tx_hash,
            upload,
        })
    }

    // ---------------------------------------------------------------------
    // Transfer
    // ---------------------------------------------------------------------

    /// Transfer one of the account's tokens to `to`, then drop this device's
    /// cached plaintext for it.
    pub async fn transfer(&self, to: &str, token_id: TokenId) -> Result<B256> {
        let outcome = self.run_transfer(to, token_id).await;
        match &outcome {
            Ok(tx_hash) => {
                info!(token_id, tx = %tx_hash, "transfer confirmed");
                self.set_transfer(TransferStatus::Transferred(token_id));
            }
            Err(e) => {
                warn!(token_id, error = %e, "transfer failed");
                self.set_transfer(TransferStatus::Failed(e.to_string()));
            }
        }
        outcome
    }

    async fn run_transfer(&self, to: &str, token_id: TokenId) -> Result<B256> {
        let to = parse_address(to)?;
        let account = self.chain.account();

        self.set_transfer(TransferStatus::AwaitingSignature);
        let tx_hash = self
            .chain
            .send_transfer(account, to, token_id)
            .await
            .map_err(WorkflowError::Transaction)?;

        self.set_transfer(TransferStatus::AwaitingConfirmation);
        let receipt = self
            .chain
            .confirm(tx_hash)
            .await
            .map_err(WorkflowError::Transaction)?;
        if !receipt.success {
            return Err(WorkflowError::Transaction(ChainError::Reverted(format!(
                "transfer transaction {tx_hash} reverted"
            ))));
        }

        self.cache.forget(account, token_id);
        self.set_reveal(token_id, RevealStatus::Hidden);
        Ok(tx_hash)
    }

    // ---------------------------------------------------------------------
    // Reveal
    // ---------------------------------------------------------------------

    /// Reveal a token's message: cache first, then remote decryption, then the
    /// placeholder. Concurrent reveals of one token share a single decryption.
    /// In [`RevealMode::LocalOnly`] a cache miss is the placeholder and the
    /// chain is never read.
    pub async fn reveal(&self, token_id: TokenId) -> Result<Reveal> {
        let account = self.chain.account();

        if let Some(text) = self.cache.get(account, token_id) {
            debug!(token_id, "reveal served from cache");
            let reveal = Reveal::Cached(text);
            self.set_reveal(token_id, reveal.status());
            return Ok(reveal);
        }

        if self.mode == RevealMode::LocalOnly {
            debug!(token_id, "cache miss, remote decryption disabled");
            let reveal = Reveal::Placeholder;
            self.set_reveal(token_id, reveal.status());
            return Ok(reveal);
        }

        self.set_reveal(token_id, RevealStatus::RemoteDecrypting);
        let outcome = self.reveal_single_flight(token_id).await;
        match &outcome {
            Ok(reveal) => self.set_reveal(token_id, reveal.status()),
            Err(_) => self.set_reveal(token_id, RevealStatus::Hidden),
        }
        outcome
    }

    /// Reset a token's display state without touching the cache
    pub fn hide(&self, token_id: TokenId) {
        self.set_reveal(token_id, RevealStatus::Hidden);
    }

    /// Drop this device's cached plaintext for a token
    pub fn forget(&self, token_id: TokenId) -> bool {
        let removed = self.cache.forget(self.account(), token_id);
        self.hide(token_id);
        removed
    }

    async fn reveal_single_flight(&self, token_id: TokenId) -> RevealOutcome {
        let cell = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(in_flight.entry(token_id).or_default())
        };

        let outcome = cell
            .get_or_init(|| self.reveal_remote(token_id))
            .await
            .clone();

        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(&token_id)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            in_flight.remove(&token_id);
        }
        outcome
    }

    async fn reveal_remote(&self, token_id: TokenId) -> RevealOutcome {
        let handle = match self.chain.encrypted_message(token_id).await {
            Ok(handle) => handle,
            Err(ChainError::NotInitialized(_)) => return Err(WorkflowError::NotInitialized(token_id)),
            Err(e) => return Err(WorkflowError::Chain(e)),
        };
        if handle.is_uninitialized() {
            return Err(WorkflowError::NotInitialized(token_id));
        }

        match self.decrypt(handle).await {
            Ok(value) => {
                info!(token_id, "message decrypted remotely");
                Ok(Reveal::Decrypted(decode_message(value)))
            }
            Err(e) => {
                warn!(token_id, error = %e, "remote decryption unavailable, showing placeholder");
                Ok(Reveal::Placeholder)
            }
        }
    }

    async fn decrypt(&self, handle: CiphertextHandle) -> std::result::Result<U256, FheError> {
        let contract = self.chain.contract();
        let keypair = self.fhe.generate_keypair()?;
        let authorization = self.fhe.build_authorization(
            keypair.public_key.clone(),
            &[contract],
            ValidityWindow::starting_now(self.validity_days),
        );
        let signature = self
            .chain
            .sign_hash(authorization.signing_hash())
            .await
            .map_err(|e| FheError::Failed(format!("authorization signing failed: {e}")))?;

        let signed = SignedAuthorization {
            authorization,
            keypair,
            signer: self.chain.account(),
            signature,
        };
        self.fhe.decrypt(handle, contract, &signed).await
    }

    // ---------------------------------------------------------------------
    // Gallery
    // ---------------------------------------------------------------------

    /// Tokens held by `owner` with their image and current display state.
    pub async fn gallery(&self, owner: Address) -> Result<Vec<TokenView>> {
        let ids = self
            .chain
            .tokens_owned_by(owner)
            .await
            .map_err(WorkflowError::Chain)?;

        let mut views = Vec::with_capacity(ids.len());
        for token_id in ids {
            let image_uri = self
                .chain
                .image_uri(token_id)
                .await
                .map_err(WorkflowError::Chain)?;
            views.push(TokenView {
                token_id,
                image_uri,
                status: self.reveal_status(token_id),
            });
        }
        Ok(views)
    }

    fn set_mint(&self, status: MintStatus) {
        self.mint_status.send_replace(status);
    }

    fn set_transfer(&self, status: TransferStatus) {
        self.transfer_status.send_replace(status);
    }

    fn set_reveal(&self, token_id: TokenId, status: RevealStatus) {
        self.reveals.send_modify(|states| {
            states.insert(token_id, status);
        });
    }
}

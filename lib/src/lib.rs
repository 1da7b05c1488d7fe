//! SealMint client library
//!
//! Everything needed to mint, transfer and reveal ERC-721 tokens whose message
//! is stored on-chain as an FHE ciphertext handle:
//!
//! - Contract bindings and token-id recovery from receipt logs
//! - Input validation for messages, images, addresses and token ids
//! - Image upload with a content-addressed host and an inline fallback
//! - The local plaintext cache keyed by (account, token id)
//! - The mint / transfer / reveal workflow state machine
//!
//! Network access is behind the [`chain::ChainClient`], [`fhe::FheClient`]
//! and [`upload::ImageHost`] traits; the `sealmint` binary provides the
//! concrete implementations.

pub mod cache;
pub mod chain;
pub mod contract;
pub mod error;
pub mod fhe;
pub mod status;
pub mod store;
pub mod upload;
pub mod validation;
pub mod workflow;

/// Token identifier as assigned by the issuing contract.
pub type TokenId = u64;

pub use cache::{MessageCache, DEFAULT_NAMESPACE};
pub use chain::{ChainClient, MintReceipt, TxReceipt};
pub use error::{ChainError, FheError, StoreError, UploadError, ValidationError, WorkflowError};
pub use fhe::{CiphertextHandle, EncryptedInput, FheClient};
pub use status::{MintStatus, RevealStatus, TransferStatus};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use upload::{ImageFile, ImageHost, ImageUploader, UploadResult};
pub use workflow::{Minted, Reveal, RevealMode, TokenView, Workflow, PLACEHOLDER_MESSAGE};

//! Error types for the SealMint workflow
//!
//! Each collaborator has its own error enum; [`WorkflowError`] wraps them so
//! the caller can tell which stage of an operation failed.

use thiserror::Error;

use crate::TokenId;

/// Bad input, detected before any collaborator is called
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Message is {len} characters, the limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("File type {0:?} is not an image")]
    NotAnImage(String),

    #[error("Image is empty")]
    EmptyImage,

    #[error("Image is {size} bytes, the limit is {max} bytes")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Invalid address {0:?}: expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    #[error("Invalid token id {0:?}: expected a non-negative integer")]
    InvalidTokenId(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Image host request failed: {0}")]
    Host(String),

    /// The inline fallback is charged on-chain, so its ceiling is much lower
    #[error("Image is {size} bytes; inline storage requires less than {max} bytes")]
    InlineTooLarge { size: usize, max: usize },

    #[error("Image upload failed ({host}); inline fallback failed ({inline})")]
    Exhausted { host: String, inline: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FheError {
    /// Remote decryption is not reachable or not implemented by the service
    #[error("Decryption unavailable: {0}")]
    Unavailable(String),

    #[error("FHE service error: {0}")]
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Message not initialized for token {0}")]
    NotInitialized(TokenId),

    #[error("RPC error: {0}")]
    Rpc(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Stage-distinguishing error returned by the workflow operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Encryption failed: {0}")]
    Encryption(FheError),

    #[error("Transaction failed: {0}")]
    Transaction(ChainError),

    #[error("Message not initialized for token {0}")]
    NotInitialized(TokenId),

    #[error("Chain query failed: {0}")]
    Chain(ChainError),

    #[error("Mint confirmed in {0} but no token id was found")]
    MissingTokenId(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

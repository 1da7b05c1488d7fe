//! Observable status of each workflow operation.

use std::fmt;

use crate::TokenId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MintStatus {
    #[default]
    Idle,
    Uploading,
    Encrypting,
    AwaitingSignature,
    AwaitingConfirmation,
    Minted(TokenId),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransferStatus {
    #[default]
    Idle,
    AwaitingSignature,
    AwaitingConfirmation,
    Transferred(TokenId),
    Failed(String),
}

/// Display state of one token's message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RevealStatus {
    #[default]
    Hidden,
    CacheHit(String),
    RemoteDecrypting,
    Revealed(String),
    EncryptedPlaceholder,
}

impl RevealStatus {
    /// Plaintext, if this state shows one
    pub fn plaintext(&self) -> Option<&str> {
        match self {
            RevealStatus::CacheHit(text) | RevealStatus::Revealed(text) => Some(text),
            _ => None,
        }
    }
}

impl MintStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MintStatus::Minted(_) | MintStatus::Failed(_))
    }
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Transferred(_) | TransferStatus::Failed(_))
    }
}

impl fmt::Display for MintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintStatus::Idle => write!(f, "Ready"),
            MintStatus::Uploading => write!(f, "Uploading image..."),
            MintStatus::Encrypting => write!(f, "Encrypting message..."),
            MintStatus::AwaitingSignature => write!(f, "Waiting for signature..."),
            MintStatus::AwaitingConfirmation => write!(f, "Waiting for confirmation..."),
            MintStatus::Minted(id) => write!(f, "Minted token #{id}"),
            MintStatus::Failed(reason) => write!(f, "Mint failed: {reason}"),
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Idle => write!(f, "Ready"),
            TransferStatus::AwaitingSignature => write!(f, "Waiting for signature..."),
            TransferStatus::AwaitingConfirmation => write!(f, "Waiting for confirmation..."),
            TransferStatus::Transferred(id) => write!(f, "Transferred token #{id}"),
            TransferStatus::Failed(reason) => write!(f, "Transfer failed: {reason}"),
        }
    }
}

//! Local plaintext cache
//!
//! The minting device remembers each message it encrypted, keyed by
//! `<namespace>_<account>_<tokenId>`. The cache is a convenience: it is not
//! derived from chain state, and losing an entry only means the reveal falls
//! back to remote decryption.

use alloy::primitives::Address;
use tracing::{debug, warn};

use crate::store::KeyValueStore;
use crate::TokenId;

/// Key prefix shared by every cache entry
pub const DEFAULT_NAMESPACE: &str = "encryptedNFT_message";

pub struct MessageCache {
    store: Box<dyn KeyValueStore>,
    namespace: String,
}

impl MessageCache {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(store: Box<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// Cache key for (account, token). The address is rendered as lowercase
    /// hex so checksummed and plain inputs share one entry.
    pub fn key(&self, account: Address, token_id: TokenId) -> String {
        format!(
            "{}_0x{}_{}",
            self.namespace,
            hex::encode(account.as_slice()),
            token_id
        )
    }

    pub fn get(&self, account: Address, token_id: TokenId) -> Option<String> {
        self.store.get(&self.key(account, token_id))
    }

    /// Best-effort write; a failing store is logged, never propagated.
    pub fn remember(&self, account: Address, token_id: TokenId, message: &str) -> bool {
        let key = self.key(account, token_id);
        match self.store.set(&key, message) {
            Ok(()) => {
                debug!(%key, "cached plaintext");
                true
            }
            Err(e) => {
                warn!(%key, error = %e, "failed to cache plaintext");
                false
            }
        }
    }

    /// Best-effort delete, same policy as [`MessageCache::remember`].
    pub fn forget(&self, account: Address, token_id: TokenId) -> bool {
        let key = self.key(account, token_id);
        match self.store.delete(&key) {
            Ok(()) => {
                debug!(%key, "purged cached plaintext");
                true
            }
            Err(e) => {
                warn!(%key, error = %e, "failed to purge cached plaintext");
                false
            }
        }
    }
}

//! FHE collaborator interface
//!
//! The workflow never touches ciphertexts directly: it asks an [`FheClient`]
//! to encrypt a value bound to (contract, account), and to decrypt a handle
//! under an EIP-712 authorization signed by the account.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::Eip712Domain;
use alloy_sol_types::SolStruct;
use async_trait::async_trait;

use crate::error::FheError;

/// Default lifetime of a decryption authorization
pub const DEFAULT_VALIDITY_DAYS: u64 = 10;

/// Bytes of message that fit in one encrypted 256-bit value
pub const PACKED_MESSAGE_BYTES: usize = 32;

const SECONDS_PER_DAY: u64 = 86_400;

sol! {
    /// EIP-712 payload the account signs to allow user decryption.
    #[derive(Debug, PartialEq, Eq)]
    struct UserDecryptRequestVerification {
        bytes publicKey;
        address[] contractAddresses;
        uint256 startTimestamp;
        uint256 durationDays;
    }
}

/// Opaque on-chain reference to an encrypted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CiphertextHandle(pub B256);

impl CiphertextHandle {
    /// An all-zero handle means the contract never stored a message.
    pub fn is_uninitialized(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encrypted input ready to be passed to the mint entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    pub handle: CiphertextHandle,
    /// Validity proof bound to (contract, submitting account)
    pub proof: Bytes,
}

/// Ephemeral key pair used for one user-decryption request
#[derive(Clone)]
pub struct KeyPair {
    pub public_key: Bytes,
    pub private_key: Bytes,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Time window during which an authorization is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub start_timestamp: u64,
    pub duration_days: u64,
}

impl ValidityWindow {
    pub fn starting_now(duration_days: u64) -> Self {
        let start_timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            start_timestamp,
            duration_days,
        }
    }

    pub fn expires_at(&self) -> u64 {
        self.start_timestamp
            .saturating_add(self.duration_days.saturating_mul(SECONDS_PER_DAY))
    }
}

/// An unsigned user-decryption authorization and the domain it is signed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub request: UserDecryptRequestVerification,
    pub domain: Eip712Domain,
}

impl Authorization {
    /// Build the request for `contracts` under the relayer's decryption domain.
    pub fn new(
        public_key: Bytes,
        contracts: &[Address],
        window: ValidityWindow,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        let request = UserDecryptRequestVerification {
            publicKey: public_key,
            contractAddresses: contracts.to_vec(),
            startTimestamp: U256::from(window.start_timestamp),
            durationDays: U256::from(window.duration_days),
        };
        let domain = Eip712Domain::new(
            Some("Decryption".into()),
            Some("1".into()),
            Some(U256::from(chain_id)),
            Some(verifying_contract),
            None,
        );
        Self { request, domain }
    }

    /// Digest the account signs
    pub fn signing_hash(&self) -> B256 {
        self.request.eip712_signing_hash(&self.domain)
    }
}

/// Authorization plus the account's signature over [`Authorization::signing_hash`]
#[derive(Debug, Clone)]
pub struct SignedAuthorization {
    pub authorization: Authorization,
    pub keypair: KeyPair,
    pub signer: Address,
    pub signature: Bytes,
}

#[async_trait]
pub trait FheClient: Send + Sync {
    /// Encrypt `value` for use by `account` in a call to `contract`
    async fn encrypt(
        &self,
        value: U256,
        contract: Address,
        account: Address,
    ) -> Result<EncryptedInput, FheError>;

    fn generate_keypair(&self) -> Result<KeyPair, FheError>;

    fn build_authorization(
        &self,
        public_key: Bytes,
        contracts: &[Address],
        window: ValidityWindow,
    ) -> Authorization;

    /// Decrypt `handle` held by `contract`. Implementations without a working
    /// decryption service return [`FheError::Unavailable`].
    async fn decrypt(
        &self,
        handle: CiphertextHandle,
        contract: Address,
        authorization: &SignedAuthorization,
    ) -> Result<U256, FheError>;
}

/// Pack a message into one 256-bit value: UTF-8 bytes, big-endian,
/// right-padded, cut on a character boundary at 32 bytes.
pub fn encode_message(message: &str) -> U256 {
    let mut end = message.len().min(PACKED_MESSAGE_BYTES);
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    let mut word = [0u8; PACKED_MESSAGE_BYTES];
    word[..end].copy_from_slice(&message.as_bytes()[..end]);
    U256::from_be_bytes(word)
}

/// Inverse of [`encode_message`]; trailing zero bytes are padding.
pub fn decode_message(value: U256) -> String {
    let word = value.to_be_bytes::<PACKED_MESSAGE_BYTES>();
    let end = word.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&word[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_message_packing() {
        assert_eq!(decode_message(encode_message("hello")), "hello");
        assert_eq!(encode_message(""), U256::ZERO);

        let long = "x".repeat(100);
        assert_eq!(decode_message(encode_message(&long)), "x".repeat(32));
    }

    #[test]
    fn test_packing_never_splits_a_character() {
        // 31 ASCII bytes followed by a 2-byte character straddling the limit
        let msg = format!("{}é", "a".repeat(31));
        assert_eq!(decode_message(encode_message(&msg)), "a".repeat(31));
    }

    #[test]
    fn test_uninitialized_handle() {
        assert!(CiphertextHandle(B256::ZERO).is_uninitialized());
        assert!(!CiphertextHandle(B256::repeat_byte(1)).is_uninitialized());
    }

    #[test]
    fn test_authorization_hash_depends_on_scope() {
        let nft = address!("1111111111111111111111111111111111111111");
        let verifier = address!("2222222222222222222222222222222222222222");
        let window = ValidityWindow {
            start_timestamp: 1_700_000_000,
            duration_days: DEFAULT_VALIDITY_DAYS,
        };
        let key = Bytes::from_static(b"pk");

        let a = Authorization::new(key.clone(), &[nft], window, 11155111, verifier);
        let b = Authorization::new(key.clone(), &[nft], window, 11155111, verifier);
        assert_eq!(a.signing_hash(), b.signing_hash());

        let other_chain = Authorization::new(key.clone(), &[nft], window, 1, verifier);
        assert_ne!(a.signing_hash(), other_chain.signing_hash());

        let longer = ValidityWindow {
            duration_days: 30,
            ..window
        };
        let c = Authorization::new(key, &[nft], longer, 11155111, verifier);
        assert_ne!(a.signing_hash(), c.signing_hash());
    }

    #[test]
    fn test_window_expiry() {
        let window = ValidityWindow {
            start_timestamp: 100,
            duration_days: 2,
        };
        assert_eq!(window.expires_at(), 100 + 2 * 86_400);
    }

    #[test]
    fn test_keypair_debug_redacts_private_key() {
        let kp = KeyPair {
            public_key: Bytes::from_static(&[1, 2]),
            private_key: Bytes::from_static(&[0xde, 0xad]),
        };
        let shown = format!("{kp:?}");
        assert!(shown.contains("redacted"));
        assert!(!shown.contains("dead"));
    }
}

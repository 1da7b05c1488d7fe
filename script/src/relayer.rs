//! HTTP relayer client
//!
//! The relayer fronts the FHE coprocessor. It produces encrypted inputs with
//! their validity proofs, and performs user decryption once it has checked
//! the account's EIP-712 authorization.
//!
//! ```text
//! POST {relayer}/v1/input-proof   -> { handle, inputProof }
//! POST {relayer}/v1/user-decrypt  -> { value }
//! ```
//!
//! The input-proof request carries the packed message word in the clear:
//! the relayer encrypts it, so it must be trusted with the plaintext. Only
//! the handle and proof it returns go on-chain.
//!
//! Without a relayer URL, or when the relayer answers 404/501 for user
//! decryption, [`FheError::Unavailable`] is returned and the workflow shows
//! the encrypted placeholder.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sealmint_lib::fhe::{Authorization, KeyPair, SignedAuthorization, ValidityWindow};
use sealmint_lib::{CiphertextHandle, EncryptedInput, FheClient, FheError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputProofRequest {
    contract_address: String,
    user_address: String,
    /// 0x-prefixed, 32-byte big-endian
    value: String,
    bits: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputProofResponse {
    handle: String,
    input_proof: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserDecryptRequest {
    handle: String,
    contract_address: String,
    user_address: String,
    public_key: String,
    signature: String,
    contract_addresses: Vec<String>,
    start_timestamp: String,
    duration_days: String,
}

#[derive(Debug, Deserialize)]
struct UserDecryptResponse {
    value: String,
}

pub struct RelayerClient {
    client: reqwest::Client,
    base_url: Option<String>,
    chain_id: u64,
    verifier: Address,
}

impl RelayerClient {
    pub fn new(base_url: Option<String>, chain_id: u64, verifier: Address) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            chain_id,
            verifier,
        }
    }

    fn endpoint(&self, path: &str) -> Option<String> {
        self.base_url.as_ref().map(|base| format!("{base}/v1/{path}"))
    }
}

fn hex_word(value: U256) -> String {
    format!("0x{}", hex::encode(value.to_be_bytes::<32>()))
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, FheError> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| FheError::Failed(format!("relayer sent invalid {field}: {e}")))
}

fn parse_handle(value: &str) -> Result<CiphertextHandle, FheError> {
    let bytes = decode_hex("handle", value)?;
    if bytes.len() != 32 {
        return Err(FheError::Failed(format!(
            "relayer sent a {}-byte handle",
            bytes.len()
        )));
    }
    Ok(CiphertextHandle(B256::from_slice(&bytes)))
}

fn parse_value(value: &str) -> Result<U256, FheError> {
    let bytes = decode_hex("value", value)?;
    if bytes.len() > 32 {
        return Err(FheError::Failed(format!(
            "relayer sent a {}-byte value",
            bytes.len()
        )));
    }
    Ok(U256::from_be_slice(&bytes))
}

#[async_trait]
impl FheClient for RelayerClient {
    async fn encrypt(
        &self,
        value: U256,
        contract: Address,
        account: Address,
    ) -> Result<EncryptedInput, FheError> {
        let url = self
            .endpoint("input-proof")
            .ok_or_else(|| FheError::Failed("no relayer configured for encryption".into()))?;
        let request = InputProofRequest {
            contract_address: contract.to_string(),
            user_address: account.to_string(),
            value: hex_word(value),
            bits: 256,
        };

        debug!(%contract, %account, "requesting encrypted input");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| FheError::Failed(format!("cannot reach relayer: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FheError::Failed(format!("relayer returned {status}: {body}")));
        }

        let body: InputProofResponse = response
            .json()
            .await
            .map_err(|e| FheError::Failed(format!("unexpected relayer response: {e}")))?;
        Ok(EncryptedInput {
            handle: parse_handle(&body.handle)?,
            proof: Bytes::from(decode_hex("inputProof", &body.input_proof)?),
        })
    }

    /// Fresh secp256k1 pair; the public key is the uncompressed SEC1 point.
    fn generate_keypair(&self) -> Result<KeyPair, FheError> {
        let ephemeral = PrivateKeySigner::random();
        let public_key = ephemeral
            .credential()
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec();
        Ok(KeyPair {
            public_key: Bytes::from(public_key),
            private_key: Bytes::from(ephemeral.to_bytes().to_vec()),
        })
    }

    fn build_authorization(
        &self,
        public_key: Bytes,
        contracts: &[Address],
        window: ValidityWindow,
    ) -> Authorization {
        Authorization::new(public_key, contracts, window, self.chain_id, self.verifier)
    }

    async fn decrypt(
        &self,
        handle: CiphertextHandle,
        contract: Address,
        authorization: &SignedAuthorization,
    ) -> Result<U256, FheError> {
        let url = self
            .endpoint("user-decrypt")
            .ok_or_else(|| FheError::Unavailable("no relayer configured".into()))?;
        let request_fields = &authorization.authorization.request;
        let request = UserDecryptRequest {
            handle: handle.to_string(),
            contract_address: contract.to_string(),
            user_address: authorization.signer.to_string(),
            public_key: authorization.keypair.public_key.to_string(),
            signature: authorization.signature.to_string(),
            contract_addresses: request_fields
                .contractAddresses
                .iter()
                .map(Address::to_string)
                .collect(),
            start_timestamp: request_fields.startTimestamp.to_string(),
            duration_days: request_fields.durationDays.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| FheError::Unavailable(format!("cannot reach relayer: {e}")))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND | StatusCode::NOT_IMPLEMENTED => {
                warn!("relayer does not offer user decryption");
                return Err(FheError::Unavailable(format!(
                    "relayer returned {}",
                    response.status()
                )));
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(FheError::Failed(format!("relayer returned {status}: {body}")));
            }
        }

        let body: UserDecryptResponse = response
            .json()
            .await
            .map_err(|e| FheError::Failed(format!("unexpected relayer response: {e}")))?;
        parse_value(&body.value)
    }
}

//! Pinata pinning service as an [`ImageHost`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use sealmint_lib::{ImageFile, ImageHost, UploadError, UploadResult};

pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway.pinata.cloud";

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

pub struct PinataHost {
    client: reqwest::Client,
    api_url: String,
    gateway: String,
    jwt: String,
}

impl PinataHost {
    pub fn new(jwt: impl Into<String>, api_url: &str, gateway: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            gateway: gateway.trim_end_matches('/').to_string(),
            jwt: jwt.into(),
        }
    }

    fn pin_url(&self) -> String {
        format!("{}/pinning/pinFileToIPFS", self.api_url)
    }

    /// Both URIs for a pinned content id
    pub fn result_for(&self, cid: &str) -> UploadResult {
        UploadResult {
            on_chain_uri: format!("ipfs://{cid}"),
            preview_url: format!("{}/ipfs/{cid}", self.gateway),
        }
    }
}

#[async_trait]
impl ImageHost for PinataHost {
    fn name(&self) -> &str {
        "pinata"
    }

    async fn upload(&self, file: &ImageFile) -> Result<UploadResult, UploadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| UploadError::Host(e.to_string()))?;
        let form = Form::new().part("file", part);

        debug!(name = %file.name, size = file.size(), "pinning image");
        let response = self
            .client
            .post(self.pin_url())
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Host(format!("cannot reach pinning service: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Host(format!("pinning service returned {status}: {body}")));
        }

        let pinned: PinFileResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Host(format!("unexpected pinning response: {e}")))?;
        info!(cid = %pinned.ipfs_hash, "image pinned");
        Ok(self.result_for(&pinned.ipfs_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uris_for_cid() {
        let host = PinataHost::new("jwt", "https://api.example/", "https://gw.example/");
        assert_eq!(host.pin_url(), "https://api.example/pinning/pinFileToIPFS");

        let result = host.result_for("bafycid");
        assert_eq!(result.on_chain_uri, "ipfs://bafycid");
        assert_eq!(result.preview_url, "https://gw.example/ipfs/bafycid");
        assert!(!result.is_inline());
    }

    #[test]
    fn test_pin_response_shape() {
        let body = r#"{"IpfsHash":"QmHash","PinSize":1234,"Timestamp":"2024-01-01T00:00:00Z"}"#;
        let parsed: PinFileResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.ipfs_hash, "QmHash");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_host_error() {
        let host = PinataHost::new("jwt", "http://127.0.0.1:1", DEFAULT_IPFS_GATEWAY);
        let file = ImageFile::new("a.png", "image/png", vec![1, 2, 3]);
        let err = host.upload(&file).await.unwrap_err();
        assert!(matches!(err, UploadError::Host(_)));
    }
}

//! Image upload with fallback
//!
//! A content-addressed host is preferred. When no host is configured, or the
//! host call fails, the image is embedded in the token URI as a base64 data
//! URI. Inline storage is paid for on-chain, so it only accepts images below
//! [`MAX_INLINE_BYTES`].

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};

use crate::error::{UploadError, ValidationError};
use crate::validation::{validate_image, MAX_INLINE_BYTES};

/// An image selected for minting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read an image from disk, inferring its MIME type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_from_extension(path).to_string();
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_image(&self.mime_type, self.size())
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Result of one upload: what goes on-chain and what the client shows now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub on_chain_uri: String,
    pub preview_url: String,
}

impl UploadResult {
    pub fn is_inline(&self) -> bool {
        self.on_chain_uri.starts_with("data:")
    }
}

/// A content-addressed image host
#[async_trait]
pub trait ImageHost: Send + Sync {
    fn name(&self) -> &str;

    async fn upload(&self, file: &ImageFile) -> Result<UploadResult, UploadError>;
}

/// Embed an image as a `data:` URI, usable both on-chain and as a preview.
pub fn inline_encode(file: &ImageFile) -> Result<UploadResult, UploadError> {
    if file.size() >= MAX_INLINE_BYTES {
        return Err(UploadError::InlineTooLarge {
            size: file.size(),
            max: MAX_INLINE_BYTES,
        });
    }
    let uri = format!("data:{};base64,{}", file.mime_type, STANDARD.encode(&file.bytes));
    Ok(UploadResult {
        on_chain_uri: uri.clone(),
        preview_url: uri,
    })
}

/// Applies the host-then-inline policy
pub struct ImageUploader {
    host: Option<Box<dyn ImageHost>>,
}

impl ImageUploader {
    pub fn new(host: Option<Box<dyn ImageHost>>) -> Self {
        Self { host }
    }

    /// Uploader without a content-addressed host: every image goes inline
    pub fn inline_only() -> Self {
        Self { host: None }
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    pub async fn upload(&self, file: &ImageFile) -> Result<UploadResult, UploadError> {
        let Some(host) = &self.host else {
            info!(size = file.size(), "no image host configured, storing inline");
            return inline_encode(file);
        };

        let host_error = match host.upload(file).await {
            Ok(result) => {
                info!(host = host.name(), uri = %result.on_chain_uri, "image uploaded");
                return Ok(result);
            }
            Err(e) => e,
        };
        warn!(host = host.name(), error = %host_error, "image host failed, falling back to inline");

        inline_encode(file).map_err(|inline_error| UploadError::Exhausted {
            host: host_error.to_string(),
            inline: inline_error.to_string(),
        })
    }
}

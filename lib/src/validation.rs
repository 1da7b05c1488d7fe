//! Input checks run before any collaborator is contacted.

use alloy::primitives::Address;

use crate::error::ValidationError;
use crate::TokenId;

/// Maximum message length in characters
pub const MAX_MESSAGE_CHARS: usize = 100;

/// Ceiling for images sent to the content-addressed host
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Ceiling for images stored inline as a data URI (strictly below)
pub const MAX_INLINE_BYTES: usize = 100 * 1024;

/// Ethereum address length in hex characters, without the 0x prefix
const ADDRESS_HEX_LEN: usize = 40;

/// Check a mint message: non-blank and at most [`MAX_MESSAGE_CHARS`] characters.
pub fn validate_message(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    let len = message.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong {
            len,
            max: MAX_MESSAGE_CHARS,
        });
    }
    Ok(())
}

/// Check an image's declared MIME type and size.
pub fn validate_image(mime_type: &str, size: usize) -> Result<(), ValidationError> {
    if !mime_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage(mime_type.to_string()));
    }
    if size == 0 {
        return Err(ValidationError::EmptyImage);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Parse an address matching `^0x[0-9a-fA-F]{40}$`.
///
/// Mixed case is accepted without checksum verification, matching what
/// browser wallets hand out.
pub fn parse_address(input: &str) -> Result<Address, ValidationError> {
    let invalid = || ValidationError::InvalidAddress(input.to_string());

    let hex_part = input.strip_prefix("0x").ok_or_else(invalid)?;
    if hex_part.len() != ADDRESS_HEX_LEN || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    input.parse::<Address>().map_err(|_| invalid())
}

/// Parse a decimal token id.
pub fn parse_token_id(input: &str) -> Result<TokenId, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidTokenId(input.to_string()));
    }
    trimmed
        .parse::<TokenId>()
        .map_err(|_| ValidationError::InvalidTokenId(input.to_string()))
}

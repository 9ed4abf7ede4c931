//! Base64 transcoding for image payloads.
//!
//! No format validation happens here: the bytes go to the vision API as-is.
use base64::{Engine, engine::general_purpose::STANDARD};

use imageguard_core::GuardError;

/// Media type announced in the data URL sent upstream.
pub const IMAGE_MEDIA_TYPE: &str = "image/jpeg";

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a caller-supplied base64 image.
///
/// Surrounding whitespace and a leading `data:<mime>;base64,` prefix are
/// tolerated. An empty payload is rejected.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, GuardError> {
    let trimmed = encoded.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| GuardError::InvalidInput("'image' data URL is not base64".into()))?,
        None => trimmed,
    };
    if payload.is_empty() {
        return Err(GuardError::InvalidInput("'image' is empty".into()));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| GuardError::InvalidInput(format!("'image' is not valid base64 ({e})")))
}

/// `data:image/jpeg;base64,<b64>` for inline delivery in a chat message.
pub fn jpeg_data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", IMAGE_MEDIA_TYPE, encode_base64(bytes))
}

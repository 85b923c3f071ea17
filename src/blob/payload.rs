//! Data-URL payload validation and decoding.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;

use crate::error::{EphemeraError, Result};

/// A decoded blob: raw bytes plus the media type they were declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Declared media type, e.g. `image/png`
    pub media_type: String,
    /// Decoded payload bytes
    pub content: Bytes,
}

/// Decode a `data:<mime>;base64,<payload>` string into raw bytes.
///
/// Returns [`EphemeraError::InvalidPayload`] if the input does not match
/// that structure or the payload is not valid base64. The embedded mime is
/// validated for shape only; which media type the blob is served under is
/// the caller's declaration.
pub(crate) fn decode_data_url(input: &str) -> Result<Bytes> {
    let rest = input
        .strip_prefix("data:")
        .ok_or_else(|| EphemeraError::InvalidPayload("missing data: prefix".to_string()))?;

    let (media_type, payload) = rest.split_once(";base64,").ok_or_else(|| {
        EphemeraError::InvalidPayload("expected ;base64, separator".to_string())
    })?;

    if media_type.is_empty() || !media_type.contains('/') {
        return Err(EphemeraError::InvalidPayload(format!(
            "malformed media type: {media_type:?}"
        )));
    }

    let decoded = BASE64
        .decode(payload)
        .map_err(|e| EphemeraError::InvalidPayload(format!("base64 decode failed: {e}")))?;

    Ok(Bytes::from(decoded))
}

//! JSON text decoder.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;

/// Decodes JSON text produced by [`crate::to_json_string`].
///
/// Both escaped (pure ASCII) and raw UTF-8 text are accepted, so stores
/// written with either encoder setting read back identically.
///
/// # Errors
///
/// Returns [`CodecError::DecodingFailed`] with the failing position if the
/// text is not valid JSON for `T`.
pub fn from_json_str<T: DeserializeOwned>(text: &str) -> CodecResult<T> {
    serde_json::from_str(text).map_err(|e| CodecError::decoding_failed(&e))
}

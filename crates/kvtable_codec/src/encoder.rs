//! JSON text encoder.

use crate::error::{CodecError, CodecResult};
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter};
use std::io;

/// Options controlling how documents are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Write every non-ASCII character as a `\uXXXX` escape.
    ///
    /// The resulting text is pure ASCII, which keeps it intact in stores
    /// that only round-trip single-byte strings.
    pub escape_non_ascii: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            escape_non_ascii: true,
        }
    }
}

impl EncodeOptions {
    /// Options that write UTF-8 text unchanged.
    #[must_use]
    pub const fn utf8() -> Self {
        Self {
            escape_non_ascii: false,
        }
    }

    /// Options that escape all non-ASCII characters.
    #[must_use]
    pub const fn ascii() -> Self {
        Self {
            escape_non_ascii: true,
        }
    }
}

/// Compact formatter that escapes everything outside ASCII.
///
/// Characters beyond the Basic Multilingual Plane are written as
/// UTF-16 surrogate pairs, the only form JSON allows for them.
#[derive(Debug, Default)]
pub struct AsciiFormatter {
    inner: CompactFormatter,
}

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return self.inner.write_string_fragment(writer, fragment);
        }

        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Encodes `value` as compact JSON text.
///
/// # Errors
///
/// Returns [`CodecError::EncodingFailed`] if `value` cannot be represented
/// as JSON (for example a map with non-string keys).
pub fn to_json_string<T>(value: &T, options: &EncodeOptions) -> CodecResult<String>
where
    T: Serialize + ?Sized,
{
    if !options.escape_non_ascii {
        return serde_json::to_string(value)
            .map_err(|e| CodecError::encoding_failed(e.to_string()));
    }

    let mut out = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter::default());
    value
        .serialize(&mut ser)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;

    String::from_utf8(out).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

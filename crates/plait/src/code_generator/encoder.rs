//! Compression of module sources into embeddable string literals.
//!
//! A payload is the zlib stream of the UTF-8 source, base64 encoded. The
//! prelude reverses it with `zlib.decompress(base64.b64decode(payload))`.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};

/// Compress `source` into a base64 payload.
pub fn encode(source: &str) -> Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(source.as_bytes())
        .context("Failed to compress module source")?;
    let compressed = encoder
        .finish()
        .context("Failed to finish compressed module source")?;
    Ok(STANDARD.encode(compressed))
}

/// Inverse of [`encode`].
pub fn decode(payload: &str) -> Result<String> {
    let compressed = STANDARD
        .decode(payload)
        .context("Payload is not valid base64")?;
    let mut source = String::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_string(&mut source)
        .context("Payload is not a valid UTF-8 zlib stream")?;
    Ok(source)
}

/// Render `value` as a double-quoted Python string literal.
pub fn python_string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            // Cc characters all fit in one byte
            c if c.is_control() => literal.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_round_trip_preserves_text() -> Result<()> {
        let samples = [
            "",
            "import helpers\nprint(helpers.VALUE)\n",
            "tabs\tand\r\nwindows newlines\r\n",
            "\u{0}\u{1}\u{7}\u{1b}[0m control bytes \u{7f}",
            "unicodé ✓ 雪 🐍",
            "\"\"\"docstring with 'quotes' and \\ backslashes\"\"\"",
        ];
        for sample in samples {
            assert_eq!(decode(&encode(sample)?)?, sample);
        }
        Ok(())
    }

    #[test]
    fn test_large_repetitive_source_shrinks() -> Result<()> {
        let source = "def handler():\n    return 42\n\n".repeat(500);
        let payload = encode(&source)?;
        assert!(payload.len() < source.len() / 10);
        assert_eq!(decode(&payload)?, source);
        Ok(())
    }

    #[test]
    fn test_payload_is_plain_base64() -> Result<()> {
        let payload = encode("x = 1\n")?;
        assert!(
            payload
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        );
        Ok(())
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not base64!").is_err());
        assert!(decode(&STANDARD.encode(b"not zlib")).is_err());
    }

    #[test]
    fn test_python_string_literal_escapes() {
        assert_eq!(python_string_literal("pkg/__init__"), "\"pkg/__init__\"");
        assert_eq!(
            python_string_literal("a\"b\\c\nd\u{1}"),
            "\"a\\\"b\\\\c\\nd\\x01\""
        );
        assert_eq!(python_string_literal("naïve"), "\"naïve\"");
    }
}

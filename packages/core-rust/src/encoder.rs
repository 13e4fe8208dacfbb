//! Bidirectional key escaping for transports with restricted identifiers.
//!
//! Attribute keys use `-` as a word separator (`favorite-zone`), but some
//! transports only allow identifier characters in property names. The encoder
//! rewrites the separator to a transport-safe character on the way out and
//! back on the way in, refusing keys that stray outside the allowed alphabet.

/// Bidirectional character-escaping transform over attribute keys.
///
/// Implementations guarantee `decode(encode(k)) == k` for every key drawn
/// from the source alphabet.
pub trait KeyEncoder: Send + Sync {
    /// Rewrites `key` into the transport-identifier domain.
    ///
    /// # Errors
    ///
    /// Fails when `key` contains a character outside the source alphabet.
    fn encode(&self, key: &str) -> Result<String, EncodeError>;

    /// Inverse of [`KeyEncoder::encode`].
    ///
    /// # Errors
    ///
    /// Fails when `key` contains a character outside the transport alphabet.
    fn decode(&self, key: &str) -> Result<String, EncodeError>;
}

/// A key contained a character outside the allowed alphabet.
///
/// This is a configuration error: the offending key was configured for
/// propagation but cannot be represented on the transport. It is surfaced,
/// never silently truncated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("key `{key}` contains illegal character `{character}` at byte {position}")]
pub struct EncodeError {
    /// The full key being transformed.
    pub key: String,
    /// The first character outside the allowed alphabet.
    pub character: char,
    /// Byte offset of the illegal character.
    pub position: usize,
}

// ---------------------------------------------------------------------------
// SeparatorEncoder
// ---------------------------------------------------------------------------

/// Encoder that swaps one separator character for another.
///
/// The allowed alphabet on each side is ASCII letters, digits, underscore,
/// plus that side's separator. The default maps `-` (attribute-key domain)
/// to `$` (transport-identifier domain, where `-` is illegal).
#[derive(Debug, Clone, Copy)]
pub struct SeparatorEncoder {
    plain: char,
    encoded: char,
}

impl SeparatorEncoder {
    /// Builds an encoder mapping `plain` in keys to `encoded` on the transport.
    #[must_use]
    pub fn new(plain: char, encoded: char) -> Self {
        Self { plain, encoded }
    }

    fn rewrite(key: &str, from: char, to: char) -> Result<String, EncodeError> {
        let mut out = String::with_capacity(key.len());
        for (position, ch) in key.char_indices() {
            if ch == from {
                out.push(to);
            } else if ch.is_ascii_alphanumeric() || ch == '_' {
                out.push(ch);
            } else {
                return Err(EncodeError {
                    key: key.to_string(),
                    character: ch,
                    position,
                });
            }
        }
        Ok(out)
    }
}

impl Default for SeparatorEncoder {
    fn default() -> Self {
        Self::new('-', '$')
    }
}

impl KeyEncoder for SeparatorEncoder {
    fn encode(&self, key: &str) -> Result<String, EncodeError> {
        Self::rewrite(key, self.plain, self.encoded)
    }

    fn decode(&self, key: &str) -> Result<String, EncodeError> {
        Self::rewrite(key, self.encoded, self.plain)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    // -- encode --

    #[test]
    fn encode_rewrites_separator() {
        let enc = SeparatorEncoder::default();
        assert_eq!(enc.encode("favorite-zone").unwrap(), "favorite$zone");
        assert_eq!(enc.encode("plain_key1").unwrap(), "plain_key1");
    }

    #[test]
    fn encode_rejects_illegal_character() {
        let enc = SeparatorEncoder::default();
        let err = enc.encode("bad*key").unwrap_err();
        assert_eq!(err.character, '*');
        assert_eq!(err.position, 3);
    }

    #[test]
    fn encode_rejects_transport_separator_in_source_key() {
        // `$` is not part of the attribute-key alphabet, so a round trip can
        // never be ambiguous.
        let enc = SeparatorEncoder::default();
        assert!(enc.encode("sneaky$key").is_err());
    }

    // -- decode --

    #[test]
    fn decode_rewrites_separator_back() {
        let enc = SeparatorEncoder::default();
        assert_eq!(enc.decode("favorite$zone").unwrap(), "favorite-zone");
    }

    #[test]
    fn decode_rejects_source_separator() {
        // `-` is illegal in the transport-identifier domain.
        let enc = SeparatorEncoder::default();
        assert!(enc.decode("favorite-zone").is_err());
    }

    // -- round trip --

    proptest! {
        #[test]
        fn round_trip_over_source_alphabet(key in "[A-Za-z0-9_-]{0,32}") {
            let enc = SeparatorEncoder::default();
            let encoded = enc.encode(&key).unwrap();
            prop_assert_eq!(enc.decode(&encoded).unwrap(), key);
        }

        #[test]
        fn encode_never_emits_source_separator(key in "[A-Za-z0-9_-]{0,32}") {
            let enc = SeparatorEncoder::default();
            prop_assert!(!enc.encode(&key).unwrap().contains('-'));
        }
    }
}

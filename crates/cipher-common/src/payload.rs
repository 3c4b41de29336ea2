//! The at-rest string form of an encrypted token.
//!
//! ```text
//! <base64(nonce)>:<base64(tag)>:<base64(ciphertext)>
//! ```
//!
//! Each segment uses the standard base64 alphabet. Encoding always pads;
//! decoding accepts unpadded input and non-canonical trailing bits, so payloads
//! written by other base64 implementations still parse.

use std::fmt;
use std::str::FromStr;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::error::CipherError;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Separator between the three payload segments.
pub const DELIMITER: char = ':';

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A parsed encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw authentication tag bytes.
    pub tag: [u8; TAG_LEN],
    /// Raw ciphertext bytes, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

impl fmt::Display for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}",
            BASE64.encode(self.nonce),
            BASE64.encode(self.tag),
            BASE64.encode(&self.ciphertext),
        )
    }
}

impl FromStr for EncryptedPayload {
    type Err = CipherError;

    /// Parse a `nonce:tag:ciphertext` string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedPayload`] if the string does not have
    /// exactly three non-empty segments, a segment is not base64, or the nonce
    /// or tag decodes to the wrong length.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(DELIMITER).collect();
        let [nonce, tag, ciphertext] = parts.as_slice() else {
            return Err(CipherError::MalformedPayload(
                "expected three colon-delimited segments",
            ));
        };
        if nonce.is_empty() || tag.is_empty() || ciphertext.is_empty() {
            return Err(CipherError::MalformedPayload("empty segment"));
        }

        let nonce = decode_fixed::<NONCE_LEN>(nonce, "nonce must be 12 bytes")?;
        let tag = decode_fixed::<TAG_LEN>(tag, "tag must be 16 bytes")?;
        let ciphertext = decode(ciphertext)?;

        Ok(Self {
            nonce,
            tag,
            ciphertext,
        })
    }
}

fn decode(segment: &str) -> Result<Vec<u8>, CipherError> {
    BASE64
        .decode(segment)
        .map_err(|_| CipherError::MalformedPayload("segment is not valid base64"))
}

fn decode_fixed<const N: usize>(
    segment: &str,
    wrong_len: &'static str,
) -> Result<[u8; N], CipherError> {
    decode(segment)?
        .try_into()
        .map_err(|_| CipherError::MalformedPayload(wrong_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample() -> EncryptedPayload {
        EncryptedPayload {
            nonce: [0x11; NONCE_LEN],
            tag: [0x22; TAG_LEN],
            ciphertext: b"opaque".to_vec(),
        }
    }

    fn kind_of(s: &str) -> ErrorKind {
        s.parse::<EncryptedPayload>().unwrap_err().kind()
    }

    #[test]
    fn display_uses_three_padded_segments() {
        let s = sample().to_string();
        let parts: Vec<&str> = s.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ERERERERERERERER");
        assert_eq!(parts[2], "b3BhcXVl");
        assert_eq!(s.parse::<EncryptedPayload>().unwrap(), sample());
    }

    #[test]
    fn rejects_too_few_segments() {
        assert_eq!(kind_of("not:enough"), ErrorKind::MalformedPayload);
        assert_eq!(kind_of("single"), ErrorKind::MalformedPayload);
        assert_eq!(kind_of(""), ErrorKind::MalformedPayload);
    }

    #[test]
    fn rejects_too_many_segments() {
        assert_eq!(kind_of("a:b:c:d"), ErrorKind::MalformedPayload);
    }

    #[test]
    fn rejects_empty_nonce_or_tag() {
        assert_eq!(kind_of("::"), ErrorKind::MalformedPayload);
        assert_eq!(kind_of(":ERERERERERERERERERERIg==:b3BhcXVl"), ErrorKind::MalformedPayload);
        assert_eq!(kind_of("ERERERERERERERER::b3BhcXVl"), ErrorKind::MalformedPayload);
    }

    #[test]
    fn rejects_bad_base64() {
        let good = sample().to_string();
        let bad = good.replacen("b3BhcXVl", "!!!", 1);
        assert_eq!(kind_of(&bad), ErrorKind::MalformedPayload);
    }

    #[test]
    fn rejects_wrong_nonce_length() {
        let err = "AAAA:IiIiIiIiIiIiIiIiIiIiIg==:b3BhcXVl"
            .parse::<EncryptedPayload>()
            .unwrap_err();
        assert!(err.to_string().contains("nonce must be 12 bytes"));
    }

    #[test]
    fn rejects_wrong_tag_length() {
        let err = "ERERERERERERERER:AAAA:b3BhcXVl"
            .parse::<EncryptedPayload>()
            .unwrap_err();
        assert!(err.to_string().contains("tag must be 16 bytes"));
    }

    #[test]
    fn accepts_unpadded_segments() {
        let parsed: EncryptedPayload = "ERERERERERERERER:IiIiIiIiIiIiIiIiIiIiIg:b3BhcXVl"
            .parse()
            .unwrap();
        assert_eq!(parsed.tag, [0x22; TAG_LEN]);
    }

    #[test]
    fn rejects_empty_ciphertext_segment() {
        let err = "AAAAAAAAAAAAAAAA:AAAAAAAAAAAAAAAAAAAAAA==:"
            .parse::<EncryptedPayload>()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
        assert!(err.to_string().contains("empty segment"));
    }
}

//! Reversible obfuscation of the serialized parameter segment.
//!
//! # Token Layout
//! ```text
//! hex( tag[8] || plaintext XOR keystream(tag) )
//! tag = keyed-blake3(mac_key, plaintext)[..8]
//! ```
//!
//! # Design Decisions
//! - Deterministic: the tag doubles as the IV, so the same key and plaintext
//!   always produce the same token and generated links stay stable
//! - Any tampering or a wrong key fails tag verification and is reported as
//!   `CryptoError::InvalidToken`, never decoded into a wrong value
//! - Tokens are lowercase hex, safe inside every URL grammar without escaping
//! - This hides raw values from the visible URL; it is not meant as a
//!   cryptographic-strength guarantee

use crate::error::CryptoError;

const TAG_LEN: usize = 8;
const MAC_CONTEXT: &str = "route-codec 2024 url params mac";
const STREAM_CONTEXT: &str = "route-codec 2024 url params stream";

/// Parameter cipher bound to one key.
#[derive(Clone)]
pub struct Cipher {
    mac_key: [u8; 32],
    stream_key: [u8; 32],
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

impl Cipher {
    /// Derive independent MAC and keystream keys from the configured key.
    pub fn new(key: &str) -> Self {
        Self {
            mac_key: blake3::derive_key(MAC_CONTEXT, key.as_bytes()),
            stream_key: blake3::derive_key(STREAM_CONTEXT, key.as_bytes()),
        }
    }

    /// Encrypt a parameter segment into an opaque hex token.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let tag = self.tag(plaintext.as_bytes());
        let mut body = plaintext.as_bytes().to_vec();
        self.apply_keystream(&tag, &mut body);

        let mut token = Vec::with_capacity(TAG_LEN + body.len());
        token.extend_from_slice(&tag);
        token.extend_from_slice(&body);
        hex::encode(token)
    }

    /// Recover the parameter segment from a token produced by [`Cipher::encrypt`].
    pub fn decrypt(&self, token: &str) -> Result<String, CryptoError> {
        let raw = hex::decode(token).map_err(|_| CryptoError::InvalidToken)?;
        if raw.len() < TAG_LEN {
            return Err(CryptoError::InvalidToken);
        }

        let (tag, body) = raw.split_at(TAG_LEN);
        let mut tag_arr = [0u8; TAG_LEN];
        tag_arr.copy_from_slice(tag);

        let mut plaintext = body.to_vec();
        self.apply_keystream(&tag_arr, &mut plaintext);

        if self.tag(&plaintext) != tag_arr {
            return Err(CryptoError::InvalidToken);
        }
        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidToken)
    }

    fn tag(&self, data: &[u8]) -> [u8; TAG_LEN] {
        let hash = blake3::keyed_hash(&self.mac_key, data);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&hash.as_bytes()[..TAG_LEN]);
        tag
    }

    fn apply_keystream(&self, tag: &[u8; TAG_LEN], data: &mut [u8]) {
        let mut hasher = blake3::Hasher::new_keyed(&self.stream_key);
        hasher.update(tag);
        let mut reader = hasher.finalize_xof();

        let mut stream = vec![0u8; data.len()];
        reader.fill(&mut stream);
        for (byte, k) in data.iter_mut().zip(stream) {
            *byte ^= k;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let cipher = Cipher::new("secret");
        let token = cipher.encrypt("p1/1/p2/2");
        assert_ne!(token, "p1/1/p2/2");
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(cipher.decrypt(&token).unwrap(), "p1/1/p2/2");
    }

    #[test]
    fn test_deterministic() {
        let a = Cipher::new("secret");
        let b = Cipher::new("secret");
        assert_eq!(a.encrypt("1/2/3"), b.encrypt("1/2/3"));
        assert_ne!(a.encrypt("1/2/3"), a.encrypt("1/2/4"));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = Cipher::new("secret").encrypt("1/2/3");
        assert_eq!(
            Cipher::new("other").decrypt(&token),
            Err(CryptoError::InvalidToken)
        );
    }

    #[test]
    fn test_tampered_token_rejected() {
        let cipher = Cipher::new("secret");
        let token = cipher.encrypt("id=7");
        let mut bytes = hex::decode(&token).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert_eq!(
            cipher.decrypt(&hex::encode(bytes)),
            Err(CryptoError::InvalidToken)
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let cipher = Cipher::new("secret");
        assert_eq!(cipher.decrypt("not-hex"), Err(CryptoError::InvalidToken));
        assert_eq!(cipher.decrypt("abcd"), Err(CryptoError::InvalidToken));
        assert_eq!(cipher.decrypt(""), Err(CryptoError::InvalidToken));
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = Cipher::new("secret");
        let token = cipher.encrypt("");
        assert_eq!(token.len(), TAG_LEN * 2);
        assert_eq!(cipher.decrypt(&token).unwrap(), "");
    }
}

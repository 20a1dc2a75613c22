use std::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;

const AVATAR_KEY_LEN: usize = 64;

/// Content-derived storage key: the lowercase hex SHA-256 of the normalized
/// avatar bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AvatarKey(String);

#[derive(Debug, Error, PartialEq)]
#[error("invalid avatar key '{0}': expected 64 lowercase hex characters")]
pub struct InvalidAvatarKey(String);

impl AvatarKey {
    /// Derive the key for the given content.
    pub fn compute(content: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(content)))
    }

    pub fn parse(value: &str) -> Result<Self, InvalidAvatarKey> {
        let valid = value.len() == AVATAR_KEY_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidAvatarKey(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First two hex characters, used as the shard directory.
    pub fn shard_prefix(&self) -> &str {
        &self.0[..2]
    }

    /// Remaining 62 hex characters, used as the file name within a shard.
    pub fn shard_suffix(&self) -> &str {
        &self.0[2..]
    }
}

impl fmt::Debug for AvatarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AvatarKey({})", self.0)
    }
}

impl fmt::Display for AvatarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AvatarKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AvatarImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Normalized avatar content together with its content-derived key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAvatar {
    pub key: AvatarKey,
    pub image: AvatarImage,
}

impl NormalizedAvatar {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            key: AvatarKey::compute(&bytes),
            image: AvatarImage::new(bytes, mime_type),
        }
    }
}

/// A blob held by a content store, as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: AvatarKey,
    pub modified_at: OffsetDateTime,
}

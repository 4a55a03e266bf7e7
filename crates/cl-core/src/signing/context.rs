//! Session-scoped signing key material

use crate::error::{LotteryError, Result};

/// Positions picked from `img_key + sub_key` to build the mix key
pub const MIX_KEY_TABLE: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19,
    29, 28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40, 61, 26, 17, 0, 1, 60, 51, 30, 4,
    22, 25, 54, 21, 56, 59, 6, 63, 57, 62, 11, 36, 20, 34, 44, 52,
];

const MIX_KEY_LEN: usize = 32;

/// Key material for one authenticated session, with its derived mix key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    img_key: String,
    sub_key: String,
    mix_key: String,
}

impl SigningContext {
    /// Derive the mix key from the two key strings.
    ///
    /// The concatenation must hold at least 64 characters, otherwise the
    /// permutation would read past its end.
    pub fn new(img_key: impl Into<String>, sub_key: impl Into<String>) -> Result<Self> {
        let img_key = img_key.into();
        let sub_key = sub_key.into();

        let raw: Vec<char> = img_key.chars().chain(sub_key.chars()).collect();
        if raw.len() < MIX_KEY_TABLE.len() {
            return Err(LotteryError::Precondition(format!(
                "signing key material must be at least {} characters, got {}",
                MIX_KEY_TABLE.len(),
                raw.len()
            )));
        }

        let mix_key: String = MIX_KEY_TABLE
            .iter()
            .map(|&index| raw[index])
            .take(MIX_KEY_LEN)
            .collect();

        Ok(Self {
            img_key,
            sub_key,
            mix_key,
        })
    }

    /// Build from the two image URLs published by `nav`
    pub fn from_urls(img_url: &str, sub_url: &str) -> Result<Self> {
        Self::new(key_from_url(img_url), key_from_url(sub_url))
    }

    pub fn img_key(&self) -> &str {
        &self.img_key
    }

    pub fn sub_key(&self) -> &str {
        &self.sub_key
    }

    /// The 32-character derived key appended before hashing
    pub fn mix_key(&self) -> &str {
        &self.mix_key
    }
}

/// File stem of a URL: the text after the last `/`, up to the first `.`
pub fn key_from_url(url: &str) -> &str {
    let file = url.rsplit('/').next().unwrap_or(url);
    file.split('.').next().unwrap_or(file)
}

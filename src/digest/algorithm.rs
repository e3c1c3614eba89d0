//! Digest algorithms behind a single capability interface.
//!
//! Each supported algorithm has one adapter implementing [`Hasher`]; names are
//! resolved through a lookup table built once per process.

use crate::errors::{DbError, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use once_cell::sync::Lazy;
use sha2::digest::{Digest, FixedOutputReset};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Accumulate-then-extract hashing state.
///
/// Every `finalize_*` call returns the digest of everything fed since the
/// previous extraction and leaves the hasher reset.
pub trait Hasher: Send {
    fn algorithm(&self) -> Algorithm;

    fn update(&mut self, data: &[u8]);

    fn finalize_raw(&mut self) -> Vec<u8>;

    /// Lowercase hexadecimal digest.
    fn hexdigest(&mut self) -> String {
        hex::encode(self.finalize_raw())
    }

    /// Standard (RFC 4648, padded) base64 digest.
    fn b64digest(&mut self) -> String {
        STANDARD.encode(self.finalize_raw())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    #[default]
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Crc32,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Crc32,
    ];

    /// Canonical name, as returned by `set_algorithm`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha1 => "SHA-1",
            Algorithm::Sha224 => "SHA-224",
            Algorithm::Sha256 => "SHA-256",
            Algorithm::Sha384 => "SHA-384",
            Algorithm::Sha512 => "SHA-512",
            Algorithm::Crc32 => "CRC-32",
        }
    }

    /// Digest size in bytes.
    #[must_use]
    pub fn output_len(self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
            Algorithm::Crc32 => 4,
        }
    }

    /// Builds a fresh hasher with empty state.
    #[must_use]
    pub fn hasher(self) -> Box<dyn Hasher> {
        match self {
            Algorithm::Md5 => Box::new(RustCryptoHasher::new(self, md5::Md5::new())),
            Algorithm::Sha1 => Box::new(RustCryptoHasher::new(self, sha1::Sha1::new())),
            Algorithm::Sha224 => Box::new(RustCryptoHasher::new(self, sha2::Sha224::new())),
            Algorithm::Sha256 => Box::new(RustCryptoHasher::new(self, sha2::Sha256::new())),
            Algorithm::Sha384 => Box::new(RustCryptoHasher::new(self, sha2::Sha384::new())),
            Algorithm::Sha512 => Box::new(RustCryptoHasher::new(self, sha2::Sha512::new())),
            Algorithm::Crc32 => Box::new(Crc32Hasher::default()),
        }
    }

    /// Resolves an algorithm name. Case and `-`/`_` separators are ignored.
    pub fn lookup(name: &str) -> Result<Self> {
        let key = normalize(name);
        if key.is_empty() {
            return Err(DbError::UnsupportedAlgorithm {
                name: name.to_string(),
                reason: "algorithm name is empty".into(),
            });
        }
        REGISTRY.get(&key).copied().ok_or_else(|| DbError::UnsupportedAlgorithm {
            name: name.to_string(),
            reason: format!("no digest adapter registered (known: {})", known_names()),
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::lookup(s)
    }
}

static REGISTRY: Lazy<HashMap<String, Algorithm>> =
    Lazy::new(|| Algorithm::ALL.iter().map(|a| (normalize(a.name()), *a)).collect());

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn known_names() -> String {
    Algorithm::ALL.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")
}

struct RustCryptoHasher<D> {
    algorithm: Algorithm,
    inner: D,
}

impl<D> RustCryptoHasher<D> {
    fn new(algorithm: Algorithm, inner: D) -> Self {
        Self { algorithm, inner }
    }
}

impl<D> Hasher for RustCryptoHasher<D>
where
    D: Digest + FixedOutputReset + Send,
{
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize_raw(&mut self) -> Vec<u8> {
        Digest::finalize_reset(&mut self.inner).to_vec()
    }
}

struct Crc32Hasher {
    inner: crc32fast::Hasher,
}

impl Default for Crc32Hasher {
    fn default() -> Self {
        Self { inner: crc32fast::Hasher::new() }
    }
}

impl Hasher for Crc32Hasher {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Crc32
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    // Big-endian so the hex form reads like the usual CRC-32 checksum.
    fn finalize_raw(&mut self) -> Vec<u8> {
        let done = std::mem::replace(&mut self.inner, crc32fast::Hasher::new());
        done.finalize().to_be_bytes().to_vec()
    }
}

//! Field digesting: algorithms, encodings and the per-entity policy.

pub mod algorithm;
pub mod config;
pub mod encoding;

pub use algorithm::{Algorithm, Hasher};
pub use config::{DigestConfig, DigestOptions};
pub use encoding::{DigestValue, Encoding};

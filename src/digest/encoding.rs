use crate::errors::{DbError, Result};
use bson::{Binary, Bson, spec::BinarySubtype};
use std::fmt;
use std::str::FromStr;

/// Representation of a digest once extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    Binary,
    #[default]
    Hex,
    Base64,
}

impl Encoding {
    /// Accepts exactly `binary`, `hex` or `base64`.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "binary" => Ok(Encoding::Binary),
            "hex" => Ok(Encoding::Hex),
            "base64" => Ok(Encoding::Base64),
            other => Err(DbError::UnsupportedEncoding(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Binary => "binary",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        Encoding::parse(s)
    }
}

/// An encoded digest, ready to be written back into a document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestValue {
    Binary(Vec<u8>),
    Text(String),
}

impl DigestValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DigestValue::Text(s) => Some(s),
            DigestValue::Binary(_) => None,
        }
    }

    /// True when `stored` holds this digest (string for text encodings, generic binary otherwise).
    #[must_use]
    pub fn matches_bson(&self, stored: &Bson) -> bool {
        match (self, stored) {
            (DigestValue::Text(a), Bson::String(b)) => a == b,
            (DigestValue::Binary(a), Bson::Binary(b)) => a == &b.bytes,
            _ => false,
        }
    }
}

impl From<DigestValue> for Bson {
    fn from(value: DigestValue) -> Self {
        match value {
            DigestValue::Text(s) => Bson::String(s),
            DigestValue::Binary(bytes) => {
                Bson::Binary(Binary { subtype: BinarySubtype::Generic, bytes })
            }
        }
    }
}

impl fmt::Display for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestValue::Text(s) => f.write_str(s),
            DigestValue::Binary(bytes) => write!(f, "{}", hex::encode(bytes)),
        }
    }
}

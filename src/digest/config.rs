//! Per-entity digest policy: which columns, which algorithm, which encoding,
//! and whether saves digest automatically.

use super::algorithm::Algorithm;
use super::encoding::{DigestValue, Encoding};
use crate::errors::{DbError, Result};
use bson::Bson;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    columns: Vec<String>,
    algorithm: Algorithm,
    encoding: Encoding,
    auto: bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            algorithm: Algorithm::Md5,
            encoding: Encoding::Hex,
            auto: true,
        }
    }
}

/// Partial configuration. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigestOptions {
    pub columns: Option<Vec<String>>,
    pub algorithm: Option<String>,
    pub encoding: Option<String>,
    pub auto: Option<bool>,
}

impl DigestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn algorithm(mut self, name: &str) -> Self {
        self.algorithm = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn encoding(mut self, name: &str) -> Self {
        self.encoding = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn auto(mut self, enabled: bool) -> Self {
        self.auto = Some(enabled);
        self
    }
}

impl DigestConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[must_use]
    pub fn auto(&self) -> bool {
        self.auto
    }

    /// Replaces the column list. Callers validate names against the schema first.
    pub(crate) fn replace_columns(&mut self, columns: Vec<String>) {
        let mut deduped: Vec<String> = Vec::with_capacity(columns.len());
        for c in columns {
            if !deduped.contains(&c) {
                deduped.push(c);
            }
        }
        self.columns = deduped;
    }

    /// Switches algorithm. On error the current algorithm stays in place.
    pub fn set_algorithm(&mut self, name: &str) -> Result<&'static str> {
        let algorithm = match Algorithm::lookup(name) {
            Ok(a) => a,
            Err(e) => {
                log::warn!("rejected digest algorithm '{name}': {e}");
                return Err(e);
            }
        };
        // Build once so a broken adapter fails here rather than on the first save.
        let probe = algorithm.hasher();
        if probe.algorithm() != algorithm {
            return Err(DbError::UnsupportedAlgorithm {
                name: name.to_string(),
                reason: format!("adapter reports {}", probe.algorithm()),
            });
        }
        self.algorithm = algorithm;
        log::debug!("digest algorithm set to {}", algorithm.name());
        Ok(algorithm.name())
    }

    pub fn set_encoding(&mut self, name: &str) -> Result<Encoding> {
        let encoding = Encoding::parse(name).inspect_err(|e| {
            log::warn!("rejected digest encoding: {e}");
        })?;
        self.encoding = encoding;
        log::debug!("digest encoding set to {encoding}");
        Ok(encoding)
    }

    pub fn set_auto(&mut self, enabled: bool) {
        self.auto = enabled;
        log::debug!("auto digest {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Digest `value` with a fresh hasher and encode it.
    pub fn digest(&self, value: &[u8]) -> Result<DigestValue> {
        let mut hasher = self.algorithm.hasher();
        if hasher.algorithm() != self.algorithm {
            return Err(DbError::DigestProduction(format!(
                "hasher for {} reports {}",
                self.algorithm,
                hasher.algorithm()
            )));
        }
        hasher.update(value);
        let size = self.algorithm.output_len();
        let (out, expected_len) = match self.encoding {
            Encoding::Binary => (DigestValue::Binary(hasher.finalize_raw()), size),
            Encoding::Hex => (DigestValue::Text(hasher.hexdigest()), size * 2),
            Encoding::Base64 => (DigestValue::Text(hasher.b64digest()), size.div_ceil(3) * 4),
        };
        let got = match &out {
            DigestValue::Binary(b) => b.len(),
            DigestValue::Text(s) => s.len(),
        };
        if got != expected_len {
            return Err(DbError::DigestProduction(format!(
                "{} {} output is {got} long, expected {expected_len}",
                self.algorithm, self.encoding
            )));
        }
        Ok(out)
    }

    pub fn digest_str(&self, value: &str) -> Result<DigestValue> {
        self.digest(value.as_bytes())
    }

    /// Digest a single BSON value. `Ok(None)` for null.
    pub fn digest_bson(&self, field: &str, value: &Bson) -> Result<Option<DigestValue>> {
        match digest_input(field, value)? {
            Some(bytes) => self.digest(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Pre-save step: digests the configured columns when auto is on.
    /// Returns how many fields were replaced.
    pub fn apply(&self, doc: &mut bson::Document) -> Result<usize> {
        if !self.auto {
            return Ok(0);
        }
        self.digest_fields(doc)
    }

    /// Digests every configured, non-null column regardless of `auto`.
    /// Nothing is written back unless all columns succeed.
    pub fn digest_fields(&self, doc: &mut bson::Document) -> Result<usize> {
        let mut staged: Vec<(String, Bson)> = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let Some(value) = doc.get(column) else { continue };
            if let Some(d) = self.digest_bson(column, value)? {
                staged.push((column.clone(), d.into()));
            }
        }
        let replaced = staged.len();
        for (column, value) in staged {
            doc.insert(column, value);
        }
        Ok(replaced)
    }
}

fn digest_input(field: &str, value: &Bson) -> Result<Option<Vec<u8>>> {
    let bytes = match value {
        Bson::Null => return Ok(None),
        Bson::String(s) => s.as_bytes().to_vec(),
        Bson::Int32(i) => i.to_string().into_bytes(),
        Bson::Int64(i) => i.to_string().into_bytes(),
        Bson::Double(f) => f.to_string().into_bytes(),
        Bson::Boolean(b) => b.to_string().into_bytes(),
        Bson::Binary(b) => b.bytes.clone(),
        other => {
            return Err(DbError::UnsupportedValue {
                field: field.to_string(),
                kind: format!("{:?}", other.element_type()),
            });
        }
    };
    Ok(Some(bytes))
}

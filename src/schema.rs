//! Entity-type descriptors. Each type owns its digest configuration.

use crate::digest::{DigestConfig, DigestOptions, DigestValue, Encoding};
use crate::document::Document;
use crate::errors::{DbError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    fields: Vec<String>,
    digest: DigestConfig,
}

impl EntityType {
    pub fn new<I, S>(name: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known: Vec<String> = Vec::new();
        for f in fields {
            let f = f.into();
            if !known.contains(&f) {
                known.push(f);
            }
        }
        Self { name: name.to_string(), fields: known, digest: DigestConfig::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    pub fn digest_config(&self) -> &DigestConfig {
        &self.digest
    }

    /// Every name must be a known field, otherwise nothing changes.
    pub fn set_columns<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(bad) = names.iter().find(|n| !self.has_field(n)) {
            log::warn!("entity '{}' has no column '{bad}'", self.name);
            return Err(DbError::UnknownColumn { entity: self.name.clone(), column: bad.clone() });
        }
        self.digest.replace_columns(names);
        log::debug!("entity '{}' digest columns: {:?}", self.name, self.digest.columns());
        Ok(())
    }

    pub fn set_algorithm(&mut self, name: &str) -> Result<&'static str> {
        self.digest.set_algorithm(name)
    }

    pub fn set_encoding(&mut self, name: &str) -> Result<Encoding> {
        self.digest.set_encoding(name)
    }

    pub fn set_auto(&mut self, enabled: bool) {
        self.digest.set_auto(enabled);
    }

    /// Applies the given options in the order columns, algorithm, encoding, auto.
    /// Stops at the first failing step.
    pub fn configure(&mut self, opts: DigestOptions) -> Result<()> {
        if let Some(columns) = opts.columns {
            self.set_columns(columns)?;
        }
        if let Some(algorithm) = opts.algorithm.as_deref() {
            self.set_algorithm(algorithm)?;
        }
        if let Some(encoding) = opts.encoding.as_deref() {
            self.set_encoding(encoding)?;
        }
        if let Some(auto) = opts.auto {
            self.set_auto(auto);
        }
        Ok(())
    }

    /// Builder form of [`EntityType::configure`].
    pub fn with_digest(mut self, opts: DigestOptions) -> Result<Self> {
        self.configure(opts)?;
        Ok(self)
    }

    /// Pre-save hook shared by insert and update.
    pub fn before_save(&self, doc: &mut Document) -> Result<usize> {
        self.digest.apply(&mut doc.data)
    }

    /// Manual digesting, independent of the auto flag.
    pub fn digest_document(&self, doc: &mut Document) -> Result<usize> {
        self.digest.digest_fields(&mut doc.data)
    }

    pub fn digest_value(&self, value: &str) -> Result<DigestValue> {
        self.digest.digest_str(value)
    }
}

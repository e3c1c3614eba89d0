use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown column '{column}' for entity '{entity}'")]
    UnknownColumn { entity: String, column: String },

    #[error("Unsupported digest algorithm '{name}': {reason}")]
    UnsupportedAlgorithm { name: String, reason: String },

    #[error("Unsupported digest encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Digest production failed: {0}")]
    DigestProduction(String),

    #[error("Cannot digest field '{field}' holding a {kind} value")]
    UnsupportedValue { field: String, kind: String },

    #[error("Field '{field}' is not a digest column of entity '{entity}'")]
    UnknownField { entity: String, field: String },

    #[error("Collection not found: {0}")]
    NoSuchCollection(String),

    #[error("Collection already exists: {0}")]
    CollectionAlreadyExists(String),

    #[error("Document not found: {0}")]
    NoSuchDocument(String),

    #[error("Document already exists: {0}")]
    DocumentAlreadyExists(String),

    #[error("Logger already initialized")]
    LoggerAlreadySet,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        DbError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

pub mod collection;
pub mod digest;
pub mod document;
pub mod engine;
pub mod errors;
pub mod logger;
pub mod schema;
pub mod settings;
pub mod storage;
pub mod telemetry;
pub mod types;

pub use collection::Collection;
pub use digest::{Algorithm, DigestConfig, DigestOptions, DigestValue, Encoding};
pub use document::Document;
pub use engine::Engine;
pub use errors::{DbError, Result};
pub use schema::EntityType;
pub use settings::Settings;

/// Loads settings (explicit path, `DOCDIGEST_CONFIG`, `./docdigest.toml`), starts logging
/// and registers one collection per configured entity.
pub fn init(config: Option<&std::path::Path>) -> Result<Engine> {
    let settings = Settings::load(config)?;
    // A logger installed by the host application wins.
    match settings.init_logging() {
        Ok(()) | Err(DbError::LoggerAlreadySet) => {}
        Err(e) => return Err(e),
    }
    Engine::from_settings(&settings)
}

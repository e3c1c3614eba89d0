//! TOML settings: entity types, their digest options and logging.

use crate::digest::DigestOptions;
use crate::errors::{DbError, Result};
use crate::schema::EntityType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DOCDIGEST_CONFIG";
pub const CONFIG_FILE: &str = "docdigest.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    /// log4rs config file; when set the other fields are ignored.
    pub config: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub level: Option<String>,
    pub retention: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySettings {
    pub name: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub digest: DigestOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntitySettings>,
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(s)?;
        let mut seen: Vec<&str> = Vec::new();
        for e in &settings.entities {
            if seen.contains(&e.name.as_str()) {
                return Err(DbError::Config(format!("entity '{}' declared twice", e.name)));
            }
            seen.push(&e.name);
        }
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s).inspect_err(|e| {
            log::warn!("failed to load settings from {}: {e}", path.display());
        })
    }

    /// Candidate files in precedence order: explicit path, `DOCDIGEST_CONFIG`, `./docdigest.toml`.
    pub fn find_config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        Self::config_paths_from(
            explicit,
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::current_dir().ok(),
        )
    }

    pub fn config_paths_from(
        explicit: Option<&Path>,
        env_path: Option<PathBuf>,
        cwd: Option<PathBuf>,
    ) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = vec![];
        if let Some(p) = explicit {
            paths.push(p.to_path_buf());
        }
        if let Some(p) = env_path {
            paths.push(p);
        }
        if let Some(cur) = cwd {
            paths.push(cur.join(CONFIG_FILE));
        }
        paths
    }

    /// Loads the first existing candidate file, or defaults when none exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match Self::find_config_paths(explicit).into_iter().find(|p| p.exists()) {
            Some(p) => {
                log::info!("loading settings from {}", p.display());
                Self::from_path(&p)
            }
            None => Ok(Self::default()),
        }
    }

    /// Builds each entity type through `configure`, so file values get the same validation as setters.
    pub fn entity_types(&self) -> Result<Vec<EntityType>> {
        self.entities
            .iter()
            .map(|e| EntityType::new(&e.name, e.fields.iter().cloned()).with_digest(e.digest.clone()))
            .collect()
    }

    /// Installs the process logger. `LoggerAlreadySet` when one is already in place;
    /// unreadable log4rs files, directories or appenders give `Config`.
    pub fn init_logging(&self) -> Result<()> {
        let res = match &self.log.config {
            Some(path) => crate::logger::init_path(path),
            None => crate::logger::configure_logging(
                self.log.dir.as_deref(),
                self.log.level.as_deref(),
                self.log.retention,
            ),
        };
        res.map_err(|e| {
            if e.downcast_ref::<log::SetLoggerError>().is_some() {
                DbError::LoggerAlreadySet
            } else {
                DbError::Config(format!("logging: {e}"))
            }
        })
    }
}

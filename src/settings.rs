use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// A scenario: one grid and the routes to find on it.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub grid: GridSettings,
    #[serde(default)]
    pub queries: Vec<Query>,
    #[serde(default)]
    pub dump: DumpSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSettings {
    /// One string per row; `.` walkable, `#` blocked.
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Query {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct DumpSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_dump_dir")]
    pub dir: PathBuf,
}

impl Default for DumpSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_dump_dir(),
        }
    }
}

fn default_dump_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Loads a scenario from the TOML file at `path`, with `GRIDWALK_`-prefixed
/// environment variables layered on top (e.g. `GRIDWALK_DUMP__ENABLED=true`).
pub fn load_settings(path: &str) -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix("GRIDWALK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(Config::try_deserialize::<Settings>);

    match settings {
        Ok(settings) => {
            info!(
                rows = settings.grid.rows.len(),
                queries = settings.queries.len(),
                dump = settings.dump.enabled,
                "Successfully loaded configuration"
            );
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

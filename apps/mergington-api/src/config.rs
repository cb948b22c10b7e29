use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_PATHS: [&str; 2] = ["/etc/mergington/api.toml", "./mergington.toml"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_port: u16,
    pub static_dir: String,
    pub log_dir: String,
    /// Where the values came from, for the startup log.
    #[serde(skip)]
    pub source: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://activities.db".to_string(),
            listen_port: 8000,
            static_dir: "apps/mergington-api/static".to_string(),
            log_dir: ".".to_string(),
            source: "defaults".to_string(),
        }
    }
}

impl AppConfig {
    /// An explicit file wins, then the well-known TOML locations, then the
    /// environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            return Self::from_toml(&contents, &path.display().to_string());
        }

        for path in CONFIG_PATHS {
            if let Ok(contents) = fs::read_to_string(path) {
                return Self::from_toml(&contents, path);
            }
        }

        Ok(Self::from_vars(|key| std::env::var(key).ok()))
    }

    fn from_toml(contents: &str, source: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(contents).with_context(|| format!("Invalid config in {}", source))?;
        config.source = source.to_string();
        Ok(config)
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            listen_port: var("LISTEN_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.listen_port),
            static_dir: var("STATIC_DIR").unwrap_or(defaults.static_dir),
            log_dir: var("LOG_DIR").unwrap_or(defaults.log_dir),
            source: "environment".to_string(),
        }
    }
}

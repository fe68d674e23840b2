//! Connection configuration, read from a TOML file
//!
//! Carries the engine selection interface: an engine tag plus host, port,
//! database, user and password. Host and port are meaningless for embedded
//! engines and simply ignored there; user and password are kept for the
//! network engines that would need them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dialect::Engine;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub engine: Engine,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: Engine::Sqlite,
            host: None,
            port: None,
            database: "likegraph.db".to_string(),
            user: None,
            password: None,
        }
    }
}

impl Config {
    /// Host to connect to; embedded engines never read it.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("localhost")
    }

    /// Port to connect to: the configured one, or the engine default for
    /// network engines. Embedded engines have no port; report zero rather
    /// than asking the dialect for one.
    pub fn port(&self) -> u16 {
        match self.port {
            Some(port) => port,
            None if self.engine.is_embedded() => 0,
            None => self.engine.default_port(),
        }
    }

    /// Connection URL for display and diagnostics.
    pub fn url(&self) -> String {
        self.engine.url(self.host(), self.port(), &self.database)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("likegraph.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<Config>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &Config, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_portfolio_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fundbook")
        .join("portfolio.json")
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Emit JSON instead of the fixed-width table by default.
    pub json: bool,
}

/// On-disk configuration (`fundbook.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the portfolio JSON lives. Defaults under the platform data
    /// directory when unset.
    pub portfolio_path: Option<PathBuf>,

    pub display: DisplayConfig,
}

/// Configuration with every default resolved.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub portfolio_path: PathBuf,
    pub display: DisplayConfig,
}

impl ResolvedConfig {
    /// Load the config file, falling back to defaults when it is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config {:?}", path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config {:?}", path));
            }
        };
        Ok(Self::from(config))
    }
}

impl From<Config> for ResolvedConfig {
    fn from(config: Config) -> Self {
        Self {
            portfolio_path: config.portfolio_path.unwrap_or_else(default_portfolio_path),
            display: config.display,
        }
    }
}

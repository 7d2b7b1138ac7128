use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::models::Portfolio;

/// JSON file persistence for a portfolio.
///
/// The file holds the ordered holdings list directly:
/// ```text
/// [
///   {
///     "fund": { "description": "...", "price": 172.14,
///               "date": "2022-11-21", "isin": "GB00BD3RZ582" },
///     "units": 1.0,
///     "target_fraction": 0.6
///   }
/// ]
/// ```
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the portfolio, or `None` when the file does not exist yet.
    ///
    /// Structurally equal funds are coalesced into shared references on the
    /// way in, so holdings over the same fund come back sharing one price
    /// record, just as they did before being persisted.
    pub async fn load(&self) -> Result<Option<Portfolio>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {:?}", self.path));
            }
        };

        let mut portfolio: Portfolio = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse portfolio JSON from {:?}", self.path))?;
        portfolio.share_equal_funds();
        Ok(Some(portfolio))
    }

    /// Write the portfolio as pretty-printed JSON, creating parent
    /// directories as needed.
    pub async fn save(&self, portfolio: &Portfolio) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create directory")?;
        }

        let content =
            serde_json::to_string_pretty(portfolio).context("Failed to serialize portfolio")?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write {:?}", self.path))?;
        Ok(())
    }
}

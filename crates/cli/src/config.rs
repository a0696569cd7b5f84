//! Optional JSON configuration.
//!
//! ```json
//! {
//!     "schema": { "country_function": "pa_rep_cust_fns.fn_getaccappcntry" },
//!     "properties": { "chunk_size": 500 },
//!     "catalog": { "customeraccount_rtab": ["acct_id", "title"] }
//! }
//! ```
//!
//! Every section is optional and falls back to the built-in defaults.

use crate::error::CliError;
use planner::{catalog::StaticCatalog, properties::PropertyLayout, schema::AccountSchema};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub schema: AccountSchema,
    pub properties: PropertyLayout,
    /// Catalog snapshot used instead of introspecting the database.
    pub catalog: Option<StaticCatalog>,
}

impl AppConfig {
    /// Reads `path` if given, otherwise `~/.acctq/config.json` when it
    /// exists. With neither, the defaults are used.
    pub async fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let source = tokio::fs::read_to_string(&path).await.map_err(|e| {
            CliError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&source).map_err(|e| {
            CliError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".acctq").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner::catalog::SchemaCatalog;

    #[tokio::test]
    async fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "properties": {"chunk_size": 100},
                "catalog": {"REP_DIM_ACCT": ["ACCT_ID", "DAY_BEGUN"]}
            }"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.schema, AccountSchema::default());
        assert_eq!(config.properties.chunk_size, 100);
        assert_eq!(config.properties.sources.len(), 8);

        let catalog = config.catalog.unwrap();
        assert!(catalog.columns_of("rep_dim_acct").unwrap().contains("day_begun"));
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"properties": {"chunk_size": "many"}}"#).unwrap();

        let err = AppConfig::load(Some(&path)).await.unwrap_err();
        assert!(matches!(err, CliError::Config(ref msg) if msg.contains("Failed to parse config")));
    }
}

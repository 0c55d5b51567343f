//! Read-only configuration consumed by query construction.
//!
//! # Design
//! Both keys are optional at parse time so a partial config file still
//! loads; the accessors fail with `ConfigurationMissing` when a query
//! actually needs the absent key. Semantic checks run once at load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{QueryError, Result};

/// Configuration source for query construction.
///
/// ```toml
/// default_page_limit = 25
/// log_file = "log/queries.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    pub default_page_limit: Option<u32>,
    pub log_file: Option<PathBuf>,

    /// Directory a relative `log_file` is resolved against.
    #[serde(skip)]
    root: Option<PathBuf>,
}

impl QueryConfig {
    /// Load and validate configuration from a TOML file. A relative
    /// `log_file` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| QueryError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.root = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: QueryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_page_limit == Some(0) {
            return Err(QueryError::Config(
                "default_page_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_page_limit(&self) -> Result<u32> {
        self.default_page_limit
            .ok_or(QueryError::ConfigurationMissing("default_page_limit"))
    }

    /// Resolved path of the audit log file.
    pub fn log_path(&self) -> Result<PathBuf> {
        let log_file = self
            .log_file
            .as_ref()
            .ok_or(QueryError::ConfigurationMissing("log_file"))?;
        Ok(match &self.root {
            Some(root) if log_file.is_relative() => root.join(log_file),
            _ => log_file.clone(),
        })
    }
}

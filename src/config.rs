// Shelf - Smart shelves for a personal media library
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Configuration
//!
//! Settings are read from an optional JSON file and then overridden by the
//! environment:
//! - `SHELF_DATABASE`: path to the catalog database
//! - `SHELF_USER`: acting user id for queries
//! - `SHELF_LOG`: tracing filter directive (e.g. `shelf_core=debug`)

use crate::error::{Result, ShelfError};
use crate::storage::Database;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE: &str = "SHELF_DATABASE";
pub const ENV_USER: &str = "SHELF_USER";
pub const ENV_LOG: &str = "SHELF_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShelfConfig {
    /// Catalog database; the platform default when unset
    pub database_path: Option<PathBuf>,
    pub default_user_id: i64,
    pub log_filter: String,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            default_user_id: 1,
            log_filter: "info".to_string(),
        }
    }
}

impl ShelfConfig {
    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ShelfError::ConfigurationError(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ShelfError::ConfigurationError(format!("Invalid config: {}", e)))
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE).filter(|v| !v.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(user) = lookup(ENV_USER) {
            self.default_user_id = user.trim().parse().map_err(|_| {
                ShelfError::ConfigurationError(format!("{} must be a user id, got '{}'", ENV_USER, user))
            })?;
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.log_filter = filter;
        }
        Ok(self)
    }

    /// Configured database path, or the platform default
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(Database::get_default_path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = ShelfConfig::from_json(r#"{ "defaultUserId": 4 }"#).unwrap();
        assert_eq!(config.default_user_id, 4);
        assert_eq!(config.log_filter, "info");
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let config = ShelfConfig::default()
            .with_overrides(env(&[
                (ENV_DATABASE, "/tmp/shelf.db"),
                (ENV_USER, " 7 "),
                (ENV_LOG, "shelf_core=debug"),
            ]))
            .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/shelf.db"));
        assert_eq!(config.default_user_id, 7);
        assert_eq!(config.log_filter, "shelf_core=debug");
    }

    #[test]
    fn test_bad_user_override_is_rejected() {
        let result = ShelfConfig::default().with_overrides(env(&[(ENV_USER, "alice")]));
        assert!(matches!(result, Err(ShelfError::ConfigurationError(_))));
    }

    #[test]
    fn test_default_database_path() {
        let config = ShelfConfig::default();
        assert_eq!(config.database_path(), Database::get_default_path());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shelf.json");
        let config = ShelfConfig {
            database_path: Some(dir.path().join("library.db")),
            default_user_id: 3,
            log_filter: "warn".to_string(),
        };

        config.save(&path).unwrap();
        assert_eq!(ShelfConfig::from_file(&path).unwrap(), config);
    }
}

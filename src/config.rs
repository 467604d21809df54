//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/kitree/kitree.toml`
//! 3. Environment variables: `KITREE_*` prefix
//!
//! CLI flags override everything (applied in the command layer).

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::record::FieldSpec;

/// Configuration error.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Message(String),
}

/// Unified configuration for kitree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Field holding each record's own identifier
    pub id_field: String,
    /// Field holding the parent reference
    pub parent_field: String,
    /// JSON literal for the "no parent" value (e.g. `null`, `0`, `"root"`)
    pub root_marker: String,
    /// Field used for display labels
    pub label_field: String,
}

impl Default for Settings {
    fn default() -> Self {
        let fields = FieldSpec::default();
        Self {
            id_field: fields.id_field,
            parent_field: fields.parent_field,
            root_marker: fields.root_marker.to_string(),
            label_field: fields.label_field,
        }
    }
}

/// Get the XDG config directory for kitree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kitree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("kitree.toml"))
}

impl Settings {
    /// Load settings with layered precedence (defaults, global config file,
    /// `KITREE_*` environment variables).
    pub fn load() -> Result<Self, SettingsError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("id_field", defaults.id_field)
            .map_err(config_err)?
            .set_default("parent_field", defaults.parent_field)
            .map_err(config_err)?
            .set_default("root_marker", defaults.root_marker)
            .map_err(config_err)?
            .set_default("label_field", defaults.label_field)
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        builder = builder.add_source(Environment::with_prefix("KITREE"));

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Resolve into the domain-level field spec, parsing the root marker as
    /// a JSON literal.
    pub fn field_spec(&self) -> Result<FieldSpec, SettingsError> {
        let root_marker = serde_json::from_str(&self.root_marker).map_err(|e| {
            SettingsError::Message(format!(
                "root_marker {:?} is not a JSON literal: {}",
                self.root_marker, e
            ))
        })?;
        Ok(FieldSpec {
            id_field: self.id_field.clone(),
            parent_field: self.parent_field.clone(),
            root_marker,
            label_field: self.label_field.clone(),
        })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Message(e.to_string()))
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# kitree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/kitree/kitree.toml
#   Env:    KITREE_* environment variables
#   Flags:  --id-field / --parent-field / --root-marker / --label-field

# Field holding each record's own identifier
# id_field = "id"

# Field holding the parent reference
# parent_field = "parent"

# JSON literal marking top-level records ('null', '0', '"root"')
# root_marker = "null"

# Field used for display labels (falls back to the id)
# label_field = "name"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> SettingsError {
    SettingsError::Message(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load().expect("load defaults");
        assert_eq!(settings.id_field, "id");
        assert_eq!(settings.parent_field, "parent");
        assert_eq!(settings.root_marker, "null");
    }

    #[test]
    fn given_default_settings_when_resolving_then_marker_is_null() {
        let fields = Settings::default().field_spec().expect("resolve");
        assert_eq!(fields.root_marker, Value::Null);
    }

    #[test]
    fn given_string_marker_when_resolving_then_parses_json_literal() {
        let settings = Settings {
            root_marker: "\"root\"".to_string(),
            ..Settings::default()
        };
        let fields = settings.field_spec().expect("resolve");
        assert_eq!(fields.root_marker, Value::String("root".to_string()));
    }

    #[test]
    fn given_garbage_marker_when_resolving_then_errors() {
        let settings = Settings {
            root_marker: "not json".to_string(),
            ..Settings::default()
        };
        assert!(settings.field_spec().is_err());
    }
}

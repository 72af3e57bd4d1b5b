//! Configuration management module.
//!
//! This module handles loading, saving, and managing application configuration,
//! including the backend URL and token, where the draft lives, field rule
//! overrides and the initial list query.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use crate::form::{FieldName, FieldRules, FieldRulesSpec, RuleSet};
use crate::query::GroupListQuery;
use log::*;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

const FILE_NAME: &str = "config.yml";
const DRAFT_FILE_NAME: &str = "draft.yml";
const THUMBNAIL_FILE_NAME: &str = "thumbnail";
const DEFAULT_DIRECTORY_PATH: &str = ".config/trip-recruit";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub draft_file: Option<PathBuf>,
    pub thumbnail_file: Option<PathBuf>,
    pub field_rules: BTreeMap<FieldName, FieldRulesSpec>,
    pub list_defaults: GroupListQuery,
    file_path: Option<PathBuf>,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_file: Option<PathBuf>,
    #[serde(default)]
    pub field_rules: BTreeMap<FieldName, FieldRulesSpec>,
    #[serde(default)]
    pub list_defaults: GroupListQuery,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Return a new empty instance.
    ///
    pub fn new() -> Config {
        Config {
            api_base_url: default_api_base_url(),
            access_token: None,
            draft_file: None,
            thumbnail_file: None,
            field_rules: BTreeMap::new(),
            list_defaults: GroupListQuery::default(),
            file_path: None,
        }
    }

    /// Try to load an existing configuration from the disk using the custom
    /// directory if provided. The directory is created if missing; when the
    /// file does not exist the defaults are kept.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };

        if !dir_path.exists() {
            fs::create_dir_all(&dir_path).map_err(|e| ConfigError::CreateDirectoryFailed {
                path: dir_path.clone(),
                source: e,
            })?;
        }

        self.file_path = Some(dir_path.join(Path::new(FILE_NAME)));
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;

        if file_path.exists() {
            let contents = fs::read_to_string(file_path).map_err(|e| ConfigError::LoadFailed {
                path: file_path.clone(),
                message: format!("IO error: {}", e),
            })?;
            let data: FileSpec = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
            self.api_base_url = data.api_base_url;
            self.access_token = data.access_token;
            self.draft_file = data.draft_file;
            self.thumbnail_file = data.thumbnail_file;
            self.field_rules = data.field_rules;
            self.list_defaults = data.list_defaults;
            debug!("Loaded configuration from {}.", file_path.display());
        } else {
            debug!(
                "No configuration at {}, using defaults.",
                file_path.display()
            );
        }

        Ok(())
    }

    /// Serialize the current configuration and write it to the disk.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;
        let data = FileSpec {
            api_base_url: self.api_base_url.clone(),
            access_token: self.access_token.clone(),
            draft_file: self.draft_file.clone(),
            thumbnail_file: self.thumbnail_file.clone(),
            field_rules: self.field_rules.clone(),
            list_defaults: self.list_defaults.clone(),
        };
        let content = serde_yaml::to_string(&data)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(file_path).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Returns the directory holding the configuration file, once loaded.
    ///
    pub fn directory(&self) -> Option<&Path> {
        self.file_path.as_deref().and_then(Path::parent)
    }

    /// Returns where the registration draft is persisted.
    ///
    pub fn draft_path(&self) -> Result<PathBuf, ConfigError> {
        self.resolve(&self.draft_file, DRAFT_FILE_NAME)
    }

    /// Returns the file backing the persisted-thumbnail lookup.
    ///
    pub fn thumbnail_path(&self) -> Result<PathBuf, ConfigError> {
        self.resolve(&self.thumbnail_file, THUMBNAIL_FILE_NAME)
    }

    /// Returns the built-in registration rules with the configured
    /// overrides applied.
    ///
    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        let mut rules = RuleSet::registration();
        for (field, spec) in self.field_rules.iter() {
            let compiled = FieldRules::try_from(spec.clone())
                .map_err(|e| ConfigError::InvalidPattern {
                    field: *field,
                    source: e,
                })?;
            debug!("Overriding rules for {}.", field);
            rules.set(*field, compiled);
        }
        Ok(rules)
    }

    fn resolve(&self, configured: &Option<PathBuf>, file_name: &str) -> Result<PathBuf, ConfigError> {
        match configured {
            Some(path) => Ok(path.clone()),
            None => self
                .directory()
                .map(|dir| dir.join(file_name))
                .ok_or(ConfigError::FilePathNotSet),
        }
    }

    /// Returns the path buffer for the default path to the configuration file
    /// or an error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => {
                let home_path = Path::new(&home);
                let default_config_path = Path::new(DEFAULT_DIRECTORY_PATH);
                Ok(home_path.join(default_config_path))
            }
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}

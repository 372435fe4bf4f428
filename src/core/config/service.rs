use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::settings::ResearchSettings;
use super::validation::validate_config;
use crate::core::errors::ResearchError;

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("DEEP_RESEARCHER_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    /// Loads the raw YAML configuration. A missing file yields an empty
    /// object; a file that does not parse is a config error.
    pub fn load_config(&self) -> Result<Value, ResearchError> {
        let config = load_yaml_file(&self.config_path())?;
        validate_config(&config)?;
        Ok(config)
    }

    pub fn load_settings(&self) -> Result<ResearchSettings, ResearchError> {
        let config = self.load_config()?;
        Ok(ResearchSettings::from_value(&config))
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, ResearchError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|err| {
        ResearchError::Config(format!("failed to read {}: {}", path.display(), err))
    })?;
    let value = serde_yaml::from_str::<Value>(&contents).map_err(|err| {
        ResearchError::Config(format!("failed to parse {}: {}", path.display(), err))
    })?;

    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(ResearchError::Config(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
    }
}

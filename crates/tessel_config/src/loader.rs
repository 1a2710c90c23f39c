//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::TesselConfig;
use std::path::Path;

/// Loads and validates `tessel.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<TesselConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join("tessel.toml"))?;
    load_config_from_str(&content)
}

/// Parses and validates a `tessel.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<TesselConfig, ConfigError> {
    let config: TesselConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &TesselConfig) -> Result<(), ConfigError> {
    let import = &config.import;
    if import.all && !import.top.is_empty() {
        return Err(ConfigError::ValidationError(
            "import.all cannot be combined with import.top".to_string(),
        ));
    }
    if !import.all && import.top.is_empty() {
        return Err(ConfigError::MissingField("import.top".to_string()));
    }
    if let Some(empty) = import.top.iter().position(String::is_empty) {
        return Err(ConfigError::ValidationError(format!(
            "import.top[{empty}] is empty"
        )));
    }
    Ok(())
}

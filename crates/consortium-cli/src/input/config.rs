use consortium_core::{ConfigOverrides, SimulationConfig};
use std::path::Path;

use super::file;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Built-in configuration, overlaid with the file at `path` when given.
pub fn load_config(path: Option<&str>) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };

    let (canonical, contents) = file::read_to_string(path)?;
    let config = parse_config(&contents, ConfigFormat::from_path(&canonical))
        .map_err(|e| format!("Invalid config '{}': {}", canonical.display(), e))?;
    log::debug!("loaded config from {}", canonical.display());
    Ok(config)
}

fn parse_config(
    contents: &str,
    format: ConfigFormat,
) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let overrides: ConfigOverrides = match format {
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(overrides.apply()?)
}

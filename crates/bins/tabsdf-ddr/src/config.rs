//! Export settings read from a TOML file.

use base::{error::Error, SourceType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of an export; every field can be overridden on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Largest value of a channel.
    pub max_value: Option<f32>,
    /// Largest directional albedo of a channel.
    pub max_reflectance: Option<f32>,
    /// Free text written in the header of the file.
    pub comment: Option<String>,
    /// Origin of the data written in the header of the file.
    pub source: Option<SourceType>,
}

impl ExportConfig {
    /// Loads the settings from a .toml file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let string = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::parse(&string).map_err(|err| {
            Error::Config(format!(
                "Failed to parse configuration file {}: {}",
                path.display(),
                err
            ))
        })
    }

    fn parse(string: &str) -> Result<Self, toml::de::Error> { toml::from_str(string) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_configuration() {
        let config = ExportConfig::parse("max_value = 2.5\nsource = \"edited\"\n").unwrap();
        assert_eq!(config.max_value, Some(2.5));
        assert_eq!(config.max_reflectance, None);
        assert_eq!(config.source, Some(SourceType::Edited));
        assert_eq!(ExportConfig::parse("").unwrap(), ExportConfig::default());
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(ExportConfig::parse("source = \"scanned\"").is_err());
    }

    #[test]
    fn missing_file() {
        let err = ExportConfig::load(Path::new("/nonexistent/tabsdf.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}

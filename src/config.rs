//! Application configuration: API endpoint, model name, and the catalog
//! location, loaded from a YAML file under the platform config directory.
//!
//! ```yaml
//! api_key: "CHANGEME"
//! api_base: "http://localhost:5001/v1"
//! model: "llama-4-maverick"
//! catalog_path: "menu_catalog.json"
//! ```

use serde::{Deserialize, Serialize};
use std::{error::Error, fs};
use tracing::debug;

/// The application's configuration.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct PalateConfig {
    /// API key used to authenticate requests.
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,

    /// Chat model used for both mood classification and reply generation.
    pub model: String,

    /// Default catalog file; the `--catalog` flag overrides it.
    #[serde(default)]
    pub catalog_path: Option<String>,
}

/// Load the configuration from a YAML file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid YAML for
/// [`PalateConfig`].
pub fn load_config(file: &str) -> Result<PalateConfig, Box<dyn Error>> {
    debug!("loading config from {file}");
    let content = fs::read_to_string(file)?;
    let config: PalateConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
api_key: "example_api_key"
api_base: "http://example.com/v1"
model: "example_model"
catalog_path: "menu_catalog.json"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.api_key, "example_api_key");
        assert_eq!(config.api_base, "http://example.com/v1");
        assert_eq!(config.model, "example_model");
        assert_eq!(config.catalog_path.as_deref(), Some("menu_catalog.json"));
    }

    #[test]
    fn test_catalog_path_is_optional() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
api_key: "k"
api_base: "http://example.com/v1"
model: "m"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_load_config_invalid_file() {
        assert!(load_config("non/existent/path").is_err());
    }

    #[test]
    fn test_load_config_invalid_format() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"invalid: config: format"#).unwrap();
        assert!(load_config(temp_file.path().to_str().unwrap()).is_err());
    }
}

/// Configuration management for the district lineage explorer
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SUPPORTED_FORMATS: [&str; 3] = ["text", "markdown", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub presentation: PresentationSettings,
    pub dataset: DatasetSettings,
    pub output: OutputSettings,
}

/// Controls the synthetic nodes added to the presentation graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationSettings {
    pub synthesize_junctions: bool,
    pub synthesize_remnants: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    /// JSON file to load instead of the embedded dataset.
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// One of `text`, `markdown`, `json`.
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presentation: PresentationSettings {
                synthesize_junctions: true,
                synthesize_remnants: true,
            },
            dataset: DatasetSettings { source: None },
            output: OutputSettings {
                format: "text".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(junctions) = std::env::var("DISTRICT_LINEAGE_JUNCTIONS") {
            self.presentation.synthesize_junctions = junctions.parse()?;
        }

        if let Ok(remnants) = std::env::var("DISTRICT_LINEAGE_REMNANTS") {
            self.presentation.synthesize_remnants = remnants.parse()?;
        }

        if let Ok(source) = std::env::var("DISTRICT_LINEAGE_DATASET") {
            self.dataset.source = Some(PathBuf::from(source));
        }

        if let Ok(format) = std::env::var("DISTRICT_LINEAGE_FORMAT") {
            self.output.format = format;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_FORMATS.contains(&self.output.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Unsupported output format '{}'; expected one of: {}",
                self.output.format,
                SUPPORTED_FORMATS.join(", ")
            ));
        }

        if let Some(source) = &self.dataset.source {
            if source.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("Dataset source path must not be empty"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_save_and_load() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();
        let loaded = Config::load_from_file(temp_file.path()).unwrap();

        assert_eq!(
            config.presentation.synthesize_junctions,
            loaded.presentation.synthesize_junctions
        );
        assert_eq!(config.output.format, loaded.output.format);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.output.format = "csv".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.dataset.source = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_enable_full_synthesis() {
        let config = Config::default();
        assert!(config.presentation.synthesize_junctions);
        assert!(config.presentation.synthesize_remnants);
        assert!(config.dataset.source.is_none());
    }
}

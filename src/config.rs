use crate::etl::csv_parser::{resolve_encoding, DEFAULT_ENCODING};
use crate::etl::{MappingVersion, DEFAULT_ROW_CAP};
use crate::merge::KeyMatch;
use crate::{MergeError, MergeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    pub etl: EtlConfig,
    pub merge: MergeSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    pub row_cap: usize,
    pub delimiter: char,
    pub encoding: String,
    pub parallel_loads: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeSettings {
    pub mapping_version: MappingVersion,
    pub key_match: KeyMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            etl: EtlConfig {
                row_cap: DEFAULT_ROW_CAP,
                delimiter: ',',
                encoding: DEFAULT_ENCODING.into(),
                parallel_loads: false,
            },
            merge: MergeSettings {
                mapping_version: MappingVersion::Full,
                key_match: KeyMatch::Trimmed,
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }
}

impl MergeConfig {
    // Reads a YAML file layered over the defaults, so partial files are accepted.
    pub fn load_from_file(path: &Path) -> MergeResult<Self> {
        let defaults = config::Config::try_from(&MergeConfig::default()).map_err(config_err)?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .build()
            .map_err(config_err)?;

        let config: MergeConfig = settings.try_deserialize().map_err(config_err)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> MergeResult<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| MergeError::Config(format!("Failed to serialize configuration: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| MergeError::Write(format!("Failed to write {}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> MergeResult<()> {
        if self.etl.row_cap == 0 {
            return Err(MergeError::Config("etl.row_cap must be a positive integer".into()));
        }
        if !self.etl.delimiter.is_ascii() {
            return Err(MergeError::Config(format!(
                "etl.delimiter must be an ASCII character, got {:?}",
                self.etl.delimiter
            )));
        }
        resolve_encoding(&self.etl.encoding)?;
        Ok(())
    }
}

fn config_err(e: config::ConfigError) -> MergeError {
    MergeError::Config(e.to_string())
}

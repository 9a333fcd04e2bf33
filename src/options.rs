use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_FILE_SUFFIX: &str = "KotlinLoggingExtensions";
pub const DEFAULT_LOGGER_TYPE: &str = "io.github.oshai.kotlinlogging.KLogger";
pub const DEFAULT_LOGGER_FACTORY: &str = "io.github.oshai.kotlinlogging.KotlinLogging";

/// Generator configuration. Every field falls back to the kotlin-logging
/// defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    /// Appended to the flattened class name to form the output file key
    pub file_suffix: String,
    /// Fully-qualified logger handle type
    pub logger_type: String,
    /// Fully-qualified logger factory; must expose `logger(name: String)`
    pub logger_factory: String,
    /// Name of the generated extension property
    pub property_name: String,
    /// Extension used by filesystem sinks
    pub file_extension: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            logger_type: DEFAULT_LOGGER_TYPE.to_string(),
            logger_factory: DEFAULT_LOGGER_FACTORY.to_string(),
            property_name: "log".to_string(),
            file_extension: "kt".to_string(),
        }
    }
}

impl GeneratorOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Simple name of the logger handle type, as referenced after its import.
    pub fn logger_type_name(&self) -> &str {
        simple_name(&self.logger_type)
    }

    pub fn logger_factory_name(&self) -> &str {
        simple_name(&self.logger_factory)
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

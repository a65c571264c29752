//! Dump configuration via `agentkv.toml`
//!
//! Selects the wire serializer, the root prefix agents publish under and
//! the default filters of a pass. A commented default file can be written
//! on first use; edit it to change settings.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use agentkv_broker::TypedBroker;
use agentkv_core::{BytesBroker, Error, Result, SerializerKind};

use crate::filter::Filters;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "agentkv.toml";

/// Dump configuration loaded from `agentkv.toml`
///
/// # Example
///
/// ```toml
/// serializer = "msgpack"
/// root_prefix = "/vnf-agent/"
///
/// [filters]
/// labels = ["vpp1"]
/// types = ["interfaces"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Wire format: `"msgpack"` or `"json"`
    #[serde(default = "default_serializer")]
    pub serializer: String,
    /// Prefix stripped from keys before classification
    #[serde(default)]
    pub root_prefix: String,
    #[serde(default)]
    pub filters: Filters,
}

fn default_serializer() -> String {
    "msgpack".to_string()
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            serializer: default_serializer(),
            root_prefix: String::new(),
            filters: Filters::default(),
        }
    }
}

impl DumpConfig {
    /// Parse the serializer name
    ///
    /// # Errors
    ///
    /// `Error::Config` if the name is not `"msgpack"` or `"json"`.
    pub fn serializer_kind(&self) -> Result<SerializerKind> {
        SerializerKind::from_name(&self.serializer)
    }

    /// Owning broker over `store` using the configured serializer
    pub fn open_broker(&self, store: Arc<dyn BytesBroker>) -> Result<TypedBroker> {
        Ok(TypedBroker::with_serializer(store, self.serializer_kind()?))
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# agentkv dump configuration
#
# Wire format of stored records: "msgpack" (default) or "json"
serializer = "msgpack"

# Prefix agents publish under; stripped before keys are classified
root_prefix = ""

# Default filters. An empty list matches everything; otherwise a key
# matches when its label (or record type) contains any listed substring.
[filters]
labels = []
types = []
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names an
    /// unknown serializer.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DumpConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.serializer_kind()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

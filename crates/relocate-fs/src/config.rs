//! Format-agnostic configuration loading and saving

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// Serialization formats the store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn detect(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// Loads and saves serde types, picking TOML or JSON from the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a value from `path`.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = Format::detect(path)?;
        let content = io::read_text(path)?;

        let parse_error = |message: String| Error::ConfigParse {
            path: path.to_native(),
            format: format.name().into(),
            message,
        };

        match format {
            Format::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
            Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Save a value to `path` atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let format = Format::detect(path)?;

        let serialize_error = |message: String| Error::ConfigSerialize {
            path: path.to_native(),
            format: format.name().into(),
            message,
        };

        let content = match format {
            Format::Toml => {
                toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))?
            }
            Format::Json => {
                serde_json::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))?
            }
        };

        io::write_atomic(path, content.as_bytes())
    }
}

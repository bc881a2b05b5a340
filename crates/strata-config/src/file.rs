//! Format-agnostic configuration loading and saving

use crate::{Error, HierarchicalConfig, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Loads and saves a [`HierarchicalConfig`] on disk.
///
/// Format is detected from the file extension:
/// - `.toml` -> TOML
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file.
    ///
    /// Nested tables are flattened into dotted paths.
    pub fn load(path: impl AsRef<Path>) -> Result<HierarchicalConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::parse(path, &content)?;
        tracing::debug!(path = %path.display(), entries = config.len(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration text, using `path` only to pick the format.
    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<HierarchicalConfig> {
        let path = path.as_ref();
        let parse_error = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        match extension(path).as_str() {
            "toml" => toml::from_str(content).map_err(|e| parse_error("TOML", e.to_string())),
            "json" => {
                serde_json::from_str(content).map_err(|e| parse_error("JSON", e.to_string()))
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(content).map_err(|e| parse_error("YAML", e.to_string()))
            }
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    /// Save configuration to a file as a flat table keyed by full path.
    ///
    /// Writes to a temporary sibling file first and renames it into place.
    pub fn save(path: impl AsRef<Path>, config: &HierarchicalConfig) -> Result<()> {
        let path = path.as_ref();
        let serialize_error = |format: &str, message: String| Error::ConfigSerialize {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        let content = match extension(path).as_str() {
            "toml" => toml::to_string_pretty(config)
                .map_err(|e| serialize_error("TOML", e.to_string()))?,
            "json" => serde_json::to_string_pretty(config)
                .map_err(|e| serialize_error("JSON", e.to_string()))?,
            "yaml" | "yml" => serde_yaml::to_string(config)
                .map_err(|e| serialize_error("YAML", e.to_string()))?,
            other => {
                return Err(Error::UnsupportedFormat {
                    extension: other.to_string(),
                });
            }
        };

        write_atomic(path, content.as_bytes())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}

use serde_derive::Serialize;
use std::path::PathBuf;

/// A PyArchInit installation found in the plugins directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPlugin {
    pub path: PathBuf,
    pub folder_name: String,
    pub version: Option<String>,
}

impl InstalledPlugin {
    pub fn new(path: PathBuf, folder_name: String, version: Option<String>) -> InstalledPlugin {
        InstalledPlugin {
            path,
            folder_name,
            version,
        }
    }

    pub fn version_or_unknown(&self) -> &str {
        self.version.as_deref().unwrap_or("Unknown")
    }
}

/// `[general]` entries of a QGIS plugin `metadata.txt`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl PluginMetadata {
    pub fn is_installer(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains("installer"))
    }
}

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::InstalledPlugin;
use crate::services::{FileService, MetadataParser};

/// Folder names an existing installation may carry, checked in this order
const KNOWN_FOLDER_NAMES: [&str; 5] = [
    "pyarchinit",
    "pyarchinit-master",
    "pyarchinit-main",
    "pyarchinit-feature-qt6-migration",
    "pyarchinit-dev",
];

/// Folders of the installer itself, never treated as an installation
const INSTALLER_FOLDER_NAMES: [&str; 2] = ["pyarchinit_installer", "pyarchinit-installer"];

const FOLDER_PREFIX: &str = "pyarchinit";

pub struct DefaultDetectService {
    file_service: Arc<dyn FileService + Send + Sync>,
    metadata_parser: MetadataParser,
}

impl DefaultDetectService {
    pub fn new(file_service: Arc<dyn FileService + Send + Sync>) -> Self {
        let metadata_parser = MetadataParser::new(file_service.clone());
        Self {
            file_service,
            metadata_parser,
        }
    }

    fn is_installer_folder(folder_name: &str) -> bool {
        INSTALLER_FOLDER_NAMES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(folder_name))
    }

    /// Known names first, then any other `pyarchinit*` folder found on disk
    fn candidate_folder_names(&self, plugins_folder: &Path) -> Result<Vec<String>> {
        let mut candidates: Vec<String> =
            KNOWN_FOLDER_NAMES.iter().map(|s| s.to_string()).collect();

        for dir in self.file_service.list_directories(plugins_folder)? {
            let Some(folder_name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if folder_name.to_lowercase().starts_with(FOLDER_PREFIX)
                && !candidates.iter().any(|c| c == folder_name)
            {
                candidates.push(folder_name.to_string());
            }
        }

        candidates.retain(|name| !Self::is_installer_folder(name));
        Ok(candidates)
    }
}

#[cfg_attr(test, mockall::automock)]
impl DetectService for DefaultDetectService {
    fn find_existing_installation(&self, plugins_folder: &Path) -> Result<Option<InstalledPlugin>> {
        if !self.file_service.directory_exists(plugins_folder) {
            debug!("Plugins folder does not exist: {}", plugins_folder.display());
            return Ok(None);
        }

        for folder_name in self.candidate_folder_names(plugins_folder)? {
            let plugin_path = plugins_folder.join(&folder_name);
            if !self.file_service.directory_exists(&plugin_path) {
                continue;
            }

            let version = match self.metadata_parser.read(&plugin_path) {
                Ok(Some(metadata)) if metadata.is_installer() => {
                    debug!("Skipping installer plugin in {}", plugin_path.display());
                    continue;
                }
                Ok(Some(metadata)) => metadata.version,
                Ok(None) => None,
                Err(e) => {
                    warn!("Unreadable metadata in {}: {:#}", plugin_path.display(), e);
                    None
                }
            };

            info!("Found existing installation: {}", plugin_path.display());
            return Ok(Some(InstalledPlugin::new(plugin_path, folder_name, version)));
        }

        Ok(None)
    }

    fn read_installed_plugin(&self, plugin_path: &Path) -> InstalledPlugin {
        let folder_name = plugin_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let version = self
            .metadata_parser
            .read(plugin_path)
            .ok()
            .flatten()
            .and_then(|metadata| metadata.version);
        InstalledPlugin::new(plugin_path.to_path_buf(), folder_name, version)
    }
}

pub trait DetectService: Send + Sync + 'static {
    /// Looks for a PyArchInit installation under any of its known folder names
    fn find_existing_installation(&self, plugins_folder: &Path) -> Result<Option<InstalledPlugin>>;
    fn read_installed_plugin(&self, plugin_path: &Path) -> InstalledPlugin;
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::models::{InstallRequest, InstalledPlugin};
use crate::services::{
    DefaultDetectService, DefaultExtractService, DefaultFileService, DefaultHttpService,
    DetectService, ExtractService, FileService, HttpService,
};
use crate::ui::{Operation, OperationManager};

const ARCHIVE_FILE_NAME: &str = "pyarchinit.zip";
const PLUGIN_TITLE: &str = "PyArchInit";

/// Failure of one installation, reported verbatim to the user
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Download error: {url}: {message}")]
    Download { url: String, message: String },

    #[error("Failed to remove existing installation: {0}")]
    Cleanup(String),

    #[error("Extraction error: {0}")]
    Extract(String),

    #[error("Failed to move the new installation into place: {0}")]
    Move(String),

    #[error("An installation is already in progress")]
    Busy,
}

pub struct DefaultInstallService {
    app_config: Arc<dyn AppConfig>,
    file_service: Arc<dyn FileService + Send + Sync>,
    http_service: Arc<dyn HttpService + Send + Sync>,
    extract_service: Arc<dyn ExtractService + Send + Sync>,
    detect_service: Arc<dyn DetectService + Send + Sync>,
}

impl DefaultInstallService {
    pub fn new(
        app_config: Arc<dyn AppConfig>,
        file_service: Arc<dyn FileService + Send + Sync>,
        http_service: Arc<dyn HttpService + Send + Sync>,
        extract_service: Arc<dyn ExtractService + Send + Sync>,
        detect_service: Arc<dyn DetectService + Send + Sync>,
    ) -> Self {
        Self {
            app_config,
            file_service,
            http_service,
            extract_service,
            detect_service,
        }
    }

    pub fn from_config(app_config: Arc<dyn AppConfig>) -> Result<Self> {
        let file_service = Arc::new(DefaultFileService);
        let http_service = Arc::new(DefaultHttpService::new(
            app_config.get_download_timeout(),
            file_service.clone(),
        )?);
        let detect_service = Arc::new(DefaultDetectService::new(file_service.clone()));
        Ok(Self::new(
            app_config,
            file_service,
            http_service,
            Arc::new(DefaultExtractService),
            detect_service,
        ))
    }

    fn message(e: anyhow::Error) -> String {
        format!("{:#}", e)
    }

    /// Creates an empty staging directory next to the target so the final move is a rename
    fn prepare_staging(&self) -> Result<PathBuf> {
        let staging_dir = self.app_config.get_cache_folder_path();
        if self.file_service.directory_exists(&staging_dir) {
            debug!("Removing stale staging directory: {}", staging_dir.display());
            self.file_service.remove_dir_all(&staging_dir)?;
        }
        self.file_service.create_directory(&staging_dir)?;
        Ok(staging_dir)
    }

    fn remove_leftover(&self, dir_path: &Path) {
        if let Err(e) = self.file_service.remove_dir_all(dir_path) {
            warn!("Failed to remove {}: {:#}", dir_path.display(), e);
        }
    }

    async fn download(
        &self,
        request: &InstallRequest,
        staging_dir: &Path,
        operation_manager: &OperationManager,
    ) -> Result<PathBuf, InstallError> {
        let url = self
            .app_config
            .get_archive_url(request.branch)
            .map_err(|e| InstallError::Download {
                url: request.branch.git_ref().to_string(),
                message: Self::message(e),
            })?;

        operation_manager.set_message(format!("Downloading {} branch...", request.branch));
        let pb_task = operation_manager
            .add_progress_bar(Operation::Download, PLUGIN_TITLE, request.branch.label())
            .map_err(|e| InstallError::Download {
                url: url.to_string(),
                message: Self::message(e),
            })?;

        let archive_path = staging_dir.join(ARCHIVE_FILE_NAME);
        self.http_service
            .download_file(&url, &archive_path, pb_task)
            .await
            .map_err(|e| InstallError::Download {
                url: url.to_string(),
                message: Self::message(e),
            })?;

        Ok(archive_path)
    }

    async fn extract(
        &self,
        request: &InstallRequest,
        archive_path: &Path,
        staging_dir: &Path,
        operation_manager: &OperationManager,
    ) -> Result<PathBuf, InstallError> {
        operation_manager.set_message("Extracting files...");
        let staged_plugin = staging_dir.join(self.app_config.get_target_folder_name());
        let pb_task = operation_manager
            .add_progress_bar(Operation::Extract, PLUGIN_TITLE, request.branch.label())
            .map_err(|e| InstallError::Extract(Self::message(e)))?;

        let extracted_files = self
            .extract_service
            .extract_archive(archive_path, &staged_plugin, pb_task)
            .await
            .map_err(|e| InstallError::Extract(Self::message(e)))?;

        if extracted_files == 0 || !self.file_service.directory_exists(&staged_plugin) {
            return Err(InstallError::Extract(
                "No files found in downloaded archive".to_string(),
            ));
        }

        self.file_service
            .remove_file(archive_path)
            .map_err(|e| InstallError::Extract(Self::message(e)))?;

        Ok(staged_plugin)
    }

    /// The installation the new one takes over from
    ///
    /// The target folder wins, otherwise a detected installation under a legacy name,
    /// e.g. `pyarchinit-master`.
    fn previous_installation(&self) -> Result<Option<PathBuf>, InstallError> {
        let target = self.app_config.get_target_folder_path();
        if self.file_service.directory_exists(&target) {
            return Ok(Some(target));
        }

        let existing = self
            .detect_service
            .find_existing_installation(self.app_config.get_plugins_folder_path())
            .map_err(|e| InstallError::Cleanup(Self::message(e)))?;
        Ok(existing.map(|plugin| plugin.path))
    }

    /// Swaps the staged plugin into the target folder
    ///
    /// The previous installation is parked under the backup name until the rename succeeded,
    /// and moved back to where it was when it does not.
    fn replace(
        &self,
        request: &InstallRequest,
        staged_plugin: &Path,
        operation_manager: &OperationManager,
    ) -> Result<PathBuf, InstallError> {
        let target = self.app_config.get_target_folder_path();
        let backup = self.app_config.get_backup_folder_path();
        let pb_task = operation_manager
            .add_progress_bar(Operation::Replace, PLUGIN_TITLE, request.branch.label())
            .map_err(|e| InstallError::Move(Self::message(e)))?;

        if self.file_service.directory_exists(&backup) {
            self.file_service
                .remove_dir_all(&backup)
                .map_err(|e| InstallError::Cleanup(Self::message(e)))?;
        }

        operation_manager.set_message("Checking existing installation...");
        let previous = self.previous_installation()?;
        if let Some(previous) = &previous {
            operation_manager.set_message(format!(
                "Removing existing installation: {}...",
                previous.display()
            ));
            self.file_service
                .rename(previous, &backup)
                .map_err(|e| InstallError::Cleanup(Self::message(e)))?;
        }

        operation_manager.set_message("Copying new plugin files...");
        if let Err(e) = self.file_service.rename(staged_plugin, &target) {
            error!("Failed to move {} into place: {:#}", staged_plugin.display(), e);
            if let Some(previous) = &previous
                && let Err(restore) = self.file_service.rename(&backup, previous)
            {
                error!("Failed to restore previous installation: {:#}", restore);
                return Err(InstallError::Move(format!(
                    "{}; previous installation kept at {}",
                    Self::message(e),
                    backup.display()
                )));
            }
            return Err(InstallError::Move(Self::message(e)));
        }

        if previous.is_some() {
            operation_manager.set_message("Cleaning up...");
            // The new installation is in place, a leftover backup is removed on the next run
            if let Err(e) = self.file_service.remove_dir_all(&backup) {
                warn!("Failed to remove {}: {:#}", backup.display(), e);
            }
        }

        pb_task.finish_and_clear();
        Ok(target)
    }

    async fn run(
        &self,
        request: &InstallRequest,
        staging_dir: &Path,
        operation_manager: &OperationManager,
    ) -> Result<InstalledPlugin, InstallError> {
        let archive_path = self
            .download(request, staging_dir, operation_manager)
            .await?;
        let staged_plugin = self
            .extract(request, &archive_path, staging_dir, operation_manager)
            .await?;
        let target = self.replace(request, &staged_plugin, operation_manager)?;

        Ok(self.detect_service.read_installed_plugin(&target))
    }
}

#[async_trait]
impl InstallService for DefaultInstallService {
    async fn install(
        &self,
        request: &InstallRequest,
        operation_manager: Arc<OperationManager>,
    ) -> Result<InstalledPlugin, InstallError> {
        info!("Installing PyArchInit from {} branch", request.branch);

        let plugins_folder = self.app_config.get_plugins_folder_path();
        let created_plugins_folder = !self.file_service.directory_exists(plugins_folder);

        let staging_dir = self
            .prepare_staging()
            .context("Failed to prepare staging directory")
            .map_err(|e| InstallError::Extract(Self::message(e)))?;

        let result = self.run(request, &staging_dir, &operation_manager).await;
        self.remove_leftover(&staging_dir);

        // A failed run leaves no plugins folder behind it did not find
        if result.is_err() && created_plugins_folder {
            debug!(
                "Removing plugins folder created for this run: {}",
                plugins_folder.display()
            );
            self.remove_leftover(plugins_folder);
        }

        match &result {
            Ok(plugin) => info!(
                "Installed PyArchInit {} into {}",
                plugin.version_or_unknown(),
                plugin.path.display()
            ),
            Err(e) => error!("Installation failed: {}", e),
        }
        result
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstallService: Send + Sync + 'static {
    /// Downloads the requested branch and replaces the installed plugin folder with it
    async fn install(
        &self,
        request: &InstallRequest,
        operation_manager: Arc<OperationManager>,
    ) -> Result<InstalledPlugin, InstallError>;
}

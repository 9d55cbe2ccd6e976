use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::models::Branch;

/// Environment variable QGIS sets when it runs with a custom configuration root
const QGIS_CUSTOM_CONFIG_PATH: &str = "QGIS_CUSTOM_CONFIG_PATH";

/// Application configuration settings
#[derive(Debug, Clone)]
pub struct DefaultAppConfig {
    /// Base URL of the GitHub web host serving the archives
    github_base_url: String,
    repo_owner: String,
    repo_name: String,
    /// QGIS python plugins directory
    plugins_folder_path: PathBuf,
    /// Folder name of the installed plugin inside the plugins directory
    target_folder_name: String,
    /// Staging folder name inside the plugins directory
    cache_folder_name: String,
    /// Folder name the previous installation is parked under while swapping
    backup_folder_name: String,
    download_timeout: Duration,
}

impl DefaultAppConfig {
    pub fn new(plugins_folder_path: PathBuf) -> DefaultAppConfig {
        DefaultAppConfig {
            github_base_url: "https://github.com".to_string(),
            repo_owner: "pyarchinit".to_string(),
            repo_name: "pyarchinit".to_string(),
            plugins_folder_path,
            target_folder_name: "pyarchinit".to_string(),
            cache_folder_name: ".pyarchinit_installer_cache".to_string(),
            backup_folder_name: ".pyarchinit_previous".to_string(),
            download_timeout: Duration::from_secs(300),
        }
    }

    /// Resolves the plugins directory the way QGIS lays out its profiles
    ///
    /// An explicit path wins, then `QGIS_CUSTOM_CONFIG_PATH`, then the platform data directory:
    /// `<data>/QGIS/QGIS3/profiles/<profile>/python/plugins`
    pub fn resolve(plugins_dir: Option<PathBuf>, profile: &str) -> Result<DefaultAppConfig> {
        if let Some(path) = plugins_dir {
            return Ok(DefaultAppConfig::new(path));
        }

        let config_root = match std::env::var_os(QGIS_CUSTOM_CONFIG_PATH) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => dirs::data_dir()
                .map(|data| data.join("QGIS").join("QGIS3"))
                .ok_or_else(|| {
                    anyhow!("Could not determine the QGIS settings directory, use --plugins-dir")
                })?,
        };

        Ok(DefaultAppConfig::new(Self::profile_plugins_path(
            &config_root,
            profile,
        )))
    }

    fn profile_plugins_path(config_root: &Path, profile: &str) -> PathBuf {
        config_root
            .join("profiles")
            .join(profile)
            .join("python")
            .join("plugins")
    }

    pub fn with_github_base_url(mut self, github_base_url: String) -> DefaultAppConfig {
        self.github_base_url = github_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_download_timeout(mut self, download_timeout: Duration) -> DefaultAppConfig {
        self.download_timeout = download_timeout;
        self
    }
}

#[cfg_attr(test, mockall::automock)]
impl AppConfig for DefaultAppConfig {
    /// e.g. `https://github.com/pyarchinit/pyarchinit/archive/refs/heads/master.zip`
    fn get_archive_url(&self, branch: Branch) -> Result<Url> {
        let url = format!(
            "{}/{}/{}/archive/refs/heads/{}.zip",
            self.github_base_url,
            self.repo_owner,
            self.repo_name,
            branch.git_ref()
        );
        Url::parse(&url).with_context(|| format!("Invalid archive URL: {}", url))
    }

    fn get_plugins_folder_path(&self) -> &Path {
        &self.plugins_folder_path
    }

    fn get_target_folder_name(&self) -> &str {
        &self.target_folder_name
    }

    fn get_target_folder_path(&self) -> PathBuf {
        self.plugins_folder_path.join(&self.target_folder_name)
    }

    fn get_cache_folder_path(&self) -> PathBuf {
        self.plugins_folder_path.join(&self.cache_folder_name)
    }

    fn get_backup_folder_path(&self) -> PathBuf {
        self.plugins_folder_path.join(&self.backup_folder_name)
    }

    fn get_download_timeout(&self) -> Duration {
        self.download_timeout
    }
}

pub trait AppConfig: Send + Sync + 'static {
    fn get_archive_url(&self, branch: Branch) -> Result<Url>;
    fn get_plugins_folder_path(&self) -> &Path;
    fn get_target_folder_name(&self) -> &str;
    fn get_target_folder_path(&self) -> PathBuf;
    fn get_cache_folder_path(&self) -> PathBuf;
    fn get_backup_folder_path(&self) -> PathBuf;
    fn get_download_timeout(&self) -> Duration;
}

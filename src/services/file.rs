use anyhow::{Context, Result};
use bytes::Bytes;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

#[derive(Debug, Default, Clone)]
pub struct DefaultFileService;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
impl FileService for DefaultFileService {
    fn read_to_string(&self, file_path: &Path) -> Result<String> {
        debug!("Reading file: {}", file_path.display());
        fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    fn file_exists(&self, file_path: &Path) -> Result<bool> {
        debug!("Checking if file exists: {}", file_path.display());
        file_path
            .try_exists()
            .with_context(|| format!("Failed to check if file exists: {}", file_path.display()))
    }

    async fn create_file_async(&self, file_path: &Path) -> Result<tokio::fs::File> {
        debug!("Creating async file: {}", file_path.display());
        let file = tokio::fs::File::create(file_path)
            .await
            .with_context(|| format!("Failed to create file: {}", file_path.display()))?;
        Ok(file)
    }

    async fn write_all_async(&self, file: &mut tokio::fs::File, chunk: &Bytes) -> Result<()> {
        tokio::io::AsyncWriteExt::write_all(&mut *file, chunk)
            .await
            .with_context(|| "Failed to write to async file")?;
        Ok(())
    }

    async fn flush_async(&self, file: &mut tokio::fs::File) -> Result<()> {
        tokio::io::AsyncWriteExt::flush(&mut *file)
            .await
            .with_context(|| "Failed to flush async file")?;
        Ok(())
    }

    fn create_directory(&self, dir_path: &Path) -> Result<()> {
        debug!("Creating directory: {}", dir_path.display());
        fs::create_dir_all(dir_path)
            .with_context(|| format!("Failed to create directory: {}", dir_path.display()))?;
        info!("Created directory: {}", dir_path.display());
        Ok(())
    }

    fn remove_dir_all(&self, dir_path: &Path) -> Result<()> {
        debug!("Removing directory: {}", dir_path.display());
        if self.directory_exists(dir_path) {
            fs::remove_dir_all(dir_path)
                .with_context(|| format!("Failed to remove directory: {}", dir_path.display()))?;
            info!("Removed directory: {}", dir_path.display());
        }
        Ok(())
    }

    fn directory_exists(&self, dir_path: &Path) -> bool {
        debug!("Checking if directory exists: {}", dir_path.display());
        dir_path.is_dir()
    }

    fn remove_file(&self, file_path: &Path) -> Result<()> {
        debug!("Removing file: {}", file_path.display());
        if self.file_exists(file_path)? {
            fs::remove_file(file_path)
                .with_context(|| format!("Failed to remove file: {}", file_path.display()))?;
            info!("Removed file: {}", file_path.display());
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        debug!("Renaming {} to {}", from.display(), to.display());
        fs::rename(from, to)
            .with_context(|| format!("Failed to rename {} to {}", from.display(), to.display()))?;
        info!("Renamed {} to {}", from.display(), to.display());
        Ok(())
    }

    /// Lists the immediate subdirectories of `dir_path`, sorted by name
    fn list_directories(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        debug!("Reading directory: {}", dir_path.display());
        let mut directories = fs::read_dir(dir_path)
            .with_context(|| format!("Failed to read directory: {}", dir_path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect::<Vec<_>>();
        directories.sort();
        Ok(directories)
    }
}

#[async_trait::async_trait]
pub trait FileService: Send + Sync + 'static {
    fn read_to_string(&self, file_path: &Path) -> Result<String>;
    fn file_exists(&self, file_path: &Path) -> Result<bool>;
    async fn create_file_async(&self, file_path: &Path) -> Result<tokio::fs::File>;
    async fn write_all_async(&self, file: &mut tokio::fs::File, chunk: &Bytes) -> Result<()>;
    async fn flush_async(&self, file: &mut tokio::fs::File) -> Result<()>;
    fn create_directory(&self, dir_path: &Path) -> Result<()>;
    fn remove_dir_all(&self, dir_path: &Path) -> Result<()>;
    fn directory_exists(&self, dir_path: &Path) -> bool;
    fn remove_file(&self, file_path: &Path) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn list_directories(&self, dir_path: &Path) -> Result<Vec<PathBuf>>;
}

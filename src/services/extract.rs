use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default, Clone)]
pub struct DefaultExtractService;

impl DefaultExtractService {
    /// Returns the single top-level folder shared by every archive entry
    ///
    /// GitHub archives wrap the repository in `<repo>-<branch>/`, e.g. `pyarchinit-master/`.
    fn find_root_folder(entries: &[(PathBuf, bool)]) -> Result<String> {
        if entries.is_empty() {
            bail!("No files found in downloaded archive");
        }

        let mut roots = BTreeSet::new();
        for (path, is_dir) in entries {
            let mut components = path.components();
            let first = match components.next() {
                Some(Component::Normal(first)) => first.to_string_lossy().to_string(),
                _ => bail!("Unexpected entry in archive: {}", path.display()),
            };
            if !is_dir && components.next().is_none() {
                bail!(
                    "Unexpected archive structure: file '{}' is outside a top-level folder",
                    path.display()
                );
            }
            roots.insert(first);
        }

        if roots.len() != 1 {
            bail!(
                "Unexpected archive structure: expected one top-level folder, found {}",
                roots.len()
            );
        }

        roots
            .into_iter()
            .next()
            .context("No top-level folder found in archive")
    }

    /// Maps `<root>/some/file.py` to `<destination>/some/file.py`
    ///
    /// Returns `None` for the root folder entry itself.
    fn create_extract_path(root: &str, destination: &Path, file_path: &Path) -> Option<PathBuf> {
        let relative = file_path.strip_prefix(root).ok()?;
        if relative.as_os_str().is_empty() {
            return None;
        }
        Some(destination.join(relative))
    }

    fn extract_blocking(
        archive_path: &Path,
        destination: &Path,
        pb_task: &ProgressBar,
    ) -> Result<u64> {
        let file = fs::File::open(archive_path)
            .with_context(|| format!("Failed to open zip file: {}", archive_path.display()))?;
        let mut archive = zip::ZipArchive::new(file)
            .with_context(|| format!("Invalid zip archive: {}", archive_path.display()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let path = entry
                .enclosed_name()
                .with_context(|| format!("Unsafe path in archive: {}", entry.name()))?;
            entries.push((path, entry.is_dir()));
        }

        let root = Self::find_root_folder(&entries)?;
        debug!("Archive root folder: {}", root);

        pb_task.set_length(archive.len() as u64);
        fs::create_dir_all(destination)
            .with_context(|| format!("Failed to create directory: {}", destination.display()))?;

        let mut extracted_files = 0;
        for (i, (path, _)) in entries.iter().enumerate() {
            pb_task.set_position(i as u64);
            let Some(outpath) = Self::create_extract_path(&root, destination, path) else {
                continue;
            };

            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                fs::create_dir_all(&outpath)
                    .with_context(|| format!("Failed to create directory: {}", outpath.display()))?;
            } else {
                if let Some(p) = outpath.parent()
                    && !p.exists()
                {
                    fs::create_dir_all(p)?;
                }

                let mut outfile = fs::File::create(&outpath)
                    .with_context(|| format!("Failed to create file: {}", outpath.display()))?;
                io::copy(&mut file, &mut outfile)
                    .with_context(|| format!("Failed to extract {}", path.display()))?;
                extracted_files += 1;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
                }
            }
        }

        pb_task.finish_and_clear();
        Ok(extracted_files)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
impl ExtractService for DefaultExtractService {
    async fn extract_archive(
        &self,
        archive_path: &Path,
        destination: &Path,
        pb_task: ProgressBar,
    ) -> Result<u64> {
        let archive_path = archive_path.to_path_buf();
        let destination = destination.to_path_buf();
        let extracted_files = tokio::task::spawn_blocking(move || {
            Self::extract_blocking(&archive_path, &destination, &pb_task)
        })
        .await
        .context("Extraction task panicked")??;

        info!("Extracted {} files", extracted_files);
        Ok(extracted_files)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExtractService: Send + Sync + 'static {
    /// Extracts the archive into `destination`, dropping its single top-level folder
    ///
    /// Returns the number of extracted files.
    async fn extract_archive(
        &self,
        archive_path: &Path,
        destination: &Path,
        pb_task: ProgressBar,
    ) -> Result<u64>;
}

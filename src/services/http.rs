use anyhow::{Context, Result, anyhow};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use crate::services::FileService;

pub struct DefaultHttpService {
    client: reqwest::Client,
    file_service: Arc<dyn FileService + Send + Sync>,
}

impl DefaultHttpService {
    pub fn new(
        timeout: Duration,
        file_service: Arc<dyn FileService + Send + Sync>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            file_service,
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
impl HttpService for DefaultHttpService {
    async fn download_file(
        &self,
        file_url: &Url,
        destination: &Path,
        pb_task: ProgressBar,
    ) -> Result<u64> {
        let response = match self.client.get(file_url.as_str()).send().await {
            Ok(response) => {
                info!("[GET] {} [{}]", file_url, response.status());
                response
            }
            Err(e) => {
                match e.status() {
                    Some(status) => error!("[GET] {} [{}] - Error: {}", file_url, status, e),
                    None => error!("[GET] {} - Error: {}", file_url, e),
                }
                return Err(anyhow!("Failed to fetch file: {}", e));
            }
        };

        let mut response = response
            .error_for_status()
            .map_err(|e| anyhow!("Failed to fetch file: {}", e))?;

        if let Some(length) = response.content_length() {
            pb_task.set_length(length);
        }

        let mut file = self.file_service.create_file_async(destination).await?;
        let mut downloaded = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| anyhow!("Download interrupted: {}", e))?
        {
            self.file_service.write_all_async(&mut file, &chunk).await?;
            downloaded += chunk.len() as u64;
            pb_task.inc(chunk.len() as u64);
        }
        self.file_service.flush_async(&mut file).await?;

        pb_task.finish_and_clear();
        info!("Downloaded {} bytes to {}", downloaded, destination.display());
        Ok(downloaded)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HttpService: Send + Sync + 'static {
    /// Streams `file_url` into `destination`, failing on network errors and non-success statuses
    ///
    /// Returns the number of bytes written.
    async fn download_file(
        &self,
        file_url: &Url,
        destination: &Path,
        pb_task: ProgressBar,
    ) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockDefaultFileService;

    #[tokio::test]
    async fn test_download_file_unreachable_host_fails_without_creating_file() {
        let mut file_service = MockDefaultFileService::new();
        file_service.expect_create_file_async().never();

        let http_service =
            DefaultHttpService::new(Duration::from_secs(5), Arc::new(file_service)).unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        let url =
            Url::parse("http://127.0.0.1:1/pyarchinit/pyarchinit/archive/refs/heads/master.zip")
                .unwrap();

        let result = http_service
            .download_file(&url, &temp_dir.path().join("archive.zip"), ProgressBar::hidden())
            .await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to fetch file")
        );
    }
}

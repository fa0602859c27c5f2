use crate::core::config::Config;
use crate::core::io::Storage;
use crate::core::state::{GenerationJob, JobStatus};
use futures_util::StreamExt;
use log::{debug, info, warn};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("No video is available to download")]
    NoVideo,
    #[error("Unsupported video location: {0}")]
    UnsupportedLocation(String),
    #[error("Download failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Download failed: HTTP {0}")]
    Status(u16),
    #[error("Could not save video: {0:#}")]
    Storage(anyhow::Error),
}

/// Holds the outcome of the current job for the host to render.
#[derive(Debug, Default, Clone)]
pub struct ResultPresenter {
    job: Option<GenerationJob>,
    generating: bool,
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(&self) -> Option<&GenerationJob> {
        self.job.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Replaces any previous job with a pending one and raises the indicator.
    pub(crate) fn track(&mut self, job_id: u64) {
        if let Some(previous) = self.job.replace(GenerationJob::pending(job_id)) {
            debug!("Discarding job #{}", previous.id);
        }
        self.generating = true;
    }

    /// Records a terminal status for `job_id`. Returns `false` when the job is
    /// no longer current, in which case nothing changes.
    pub(crate) fn resolve(&mut self, job_id: u64, status: JobStatus) -> bool {
        match self.job.as_mut() {
            Some(job) if job.id == job_id => {
                job.status = status;
                self.generating = false;
                true
            }
            _ => {
                warn!("Ignoring outcome of abandoned job #{}", job_id);
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.job = None;
        self.generating = false;
    }

    /// Saves the finished video through `downloader`.
    pub async fn request_download(
        &self,
        downloader: &VideoDownloader,
    ) -> Result<PathBuf, DownloadError> {
        let video_ref = self
            .job
            .as_ref()
            .and_then(|job| job.video_ref())
            .ok_or(DownloadError::NoVideo)?;
        downloader.fetch(video_ref).await
    }
}

/// Retrieves a video reference into a fixed local file.
pub struct VideoDownloader {
    client: Client,
    storage: Arc<dyn Storage>,
    target: PathBuf,
}

impl VideoDownloader {
    pub fn new(config: &Config, storage: Arc<dyn Storage>) -> Self {
        Self::with_target(config.download_path(), storage)
    }

    pub fn with_target(target: impl Into<PathBuf>, storage: Arc<dyn Storage>) -> Self {
        Self {
            client: Client::new(),
            storage,
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub async fn fetch(&self, video_ref: &str) -> Result<PathBuf, DownloadError> {
        let content = match Url::parse(video_ref) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                self.fetch_remote(url).await?
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| DownloadError::UnsupportedLocation(video_ref.to_string()))?;
                self.storage.read(&path).await.map_err(DownloadError::Storage)?
            }
            Ok(_) => return Err(DownloadError::UnsupportedLocation(video_ref.to_string())),
            Err(_) => self
                .storage
                .read(Path::new(video_ref))
                .await
                .map_err(DownloadError::Storage)?,
        };

        self.storage
            .write(&self.target, &content)
            .await
            .map_err(DownloadError::Storage)?;
        info!("Saved {} bytes to {}", content.len(), self.target.display());
        Ok(self.target.clone())
    }

    async fn fetch_remote(&self, url: Url) -> Result<Vec<u8>, DownloadError> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(DownloadError::Status(resp.status().as_u16()));
        }

        let mut content = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            content.extend_from_slice(&chunk?);
        }
        Ok(content)
    }
}

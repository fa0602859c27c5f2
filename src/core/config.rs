use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Multipart endpoint of the lecture generation service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_output")]
    pub output_folder: String,

    /// File name used when a finished lecture video is downloaded.
    #[serde(default = "default_download_file_name")]
    pub download_file_name: String,

    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,

    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            output_folder: default_output(),
            download_file_name: default_download_file_name(),
            accepted_extensions: default_accepted_extensions(),
            request_timeout_seconds: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:5000/generate".to_string()
}
fn default_output() -> String {
    "output".to_string()
}
fn default_download_file_name() -> String {
    "ai-lecture.mp4".to_string()
}
fn default_accepted_extensions() -> Vec<String> {
    ["txt", "pdf", "doc", "docx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(Path::new(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }

    pub fn download_path(&self) -> PathBuf {
        Path::new(&self.output_folder).join(&self.download_file_name)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }

    /// Whether the file picker should offer `path`. Matching is by extension, case-insensitive.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                self.accepted_extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

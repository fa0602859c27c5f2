use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// File access used by the generation pipeline: reading lecture notes before
/// upload and writing downloaded videos.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;
    async fn write(&self, path: &Path, content: &[u8]) -> Result<()>;
    async fn exists(&self, path: &Path) -> Result<bool>;
    async fn delete(&self, path: &Path) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct NativeStorage;

impl NativeStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for NativeStorage {
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    async fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(tokio::fs::try_exists(path).await?)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        if tokio::fs::try_exists(path).await? {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_parent_directories() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let target = temp_dir.path().join("output").join("nested").join("video.mp4");
        let storage = NativeStorage::new();

        storage.write(&target, b"frames").await?;

        assert!(storage.exists(&target).await?);
        assert_eq!(storage.read(&target).await?, b"frames");

        storage.delete(&target).await?;
        assert!(!storage.exists(&target).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_file_reports_path() {
        let storage = NativeStorage::new();
        let err = storage
            .read(Path::new("/definitely/not/here/notes.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("notes.pdf"));
    }
}

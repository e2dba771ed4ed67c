//! Artifact synchronization for persisted indexes and models.
//!
//! The service syncs index and model artifacts from a remote source at
//! startup and on reload. The transport is abstracted so deployments can
//! plug in object storage; the bundled implementation syncs from a local
//! directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::error::Result;

/// A remote source of persisted artifacts.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Fetch the artifact `name` into `dest`.
    ///
    /// Returns `Ok(false)` when the artifact does not exist at the
    /// source; transport failures are errors.
    async fn fetch(&self, name: &str, dest: &Path) -> Result<bool>;
}

/// Artifact source backed by a directory tree.
pub struct DirArtifactSource {
    root: PathBuf,
}

impl DirArtifactSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactSource for DirArtifactSource {
    async fn fetch(&self, name: &str, dest: &Path) -> Result<bool> {
        let source = self.root.join(name);
        if !source.exists() {
            warn!("Artifact {name} not found at {}, skipping", self.root.display());
            return Ok(false);
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(&source, dest).await?;
        info!("Fetched artifact {name} → {}", dest.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_copies_artifact() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(source_dir.path().join("index")).unwrap();
        std::fs::write(source_dir.path().join("index/index.json"), "{}").unwrap();

        let source = DirArtifactSource::new(source_dir.path());
        let dest = dest_dir.path().join("local/index.json");
        let fetched = source.fetch("index/index.json", &dest).await.unwrap();
        assert!(fetched);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_fetch_missing_artifact_returns_false() {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();

        let source = DirArtifactSource::new(source_dir.path());
        let dest = dest_dir.path().join("index.json");
        let fetched = source.fetch("index/index.json", &dest).await.unwrap();
        assert!(!fetched);
        assert!(!dest.exists());
    }
}

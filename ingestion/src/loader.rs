//! Bulk-load threat-intelligence documents from a data directory.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use vigil_core::Settings;

use crate::error::Result;

/// Load threat-intelligence data from the local filesystem.
///
/// The data directory holds one subdirectory per source type
/// (`advisories`, `threat_reports`, `incidents`), each containing one
/// JSON document per file.
#[derive(Debug, Clone)]
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    /// Create a loader rooted at the configured data directory.
    pub fn new(settings: &Settings) -> Self {
        Self {
            data_dir: settings.data_dir.clone(),
        }
    }

    /// Create a loader rooted at an explicit directory.
    pub fn with_root(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load every `*.json` file in a directory, sorted by file name.
    ///
    /// A missing directory yields an empty list.
    pub async fn load_json_directory(&self, directory: &Path) -> Result<Vec<Value>> {
        let mut documents = Vec::new();
        if !directory.exists() {
            debug!("Data directory {} does not exist", directory.display());
            return Ok(documents);
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let content = fs::read_to_string(&path).await?;
            documents.push(serde_json::from_str(&content)?);
        }

        info!(
            "Loaded {} documents from {}",
            documents.len(),
            directory.display()
        );
        Ok(documents)
    }

    /// Load advisory documents from the data directory.
    pub async fn load_advisories(&self) -> Result<Vec<Value>> {
        self.load_json_directory(&self.data_dir.join("advisories")).await
    }

    /// Load threat report documents from the data directory.
    pub async fn load_threat_reports(&self) -> Result<Vec<Value>> {
        self.load_json_directory(&self.data_dir.join("threat_reports")).await
    }

    /// Load incident documents from the data directory.
    pub async fn load_incidents(&self) -> Result<Vec<Value>> {
        self.load_json_directory(&self.data_dir.join("incidents")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let loader = DataLoader::with_root("/nonexistent/vigil-data");
        let documents = loader.load_advisories().await.unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_loads_sorted_json_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("advisories");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.json"), r#"{"id": "b"}"#).unwrap();
        std::fs::write(dir.join("a.json"), r#"{"id": "a"}"#).unwrap();
        std::fs::write(dir.join("ignored.txt"), "not json").unwrap();

        let loader = DataLoader::with_root(temp.path());
        let documents = loader.load_advisories().await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0]["id"], "a");
        assert_eq!(documents[1]["id"], "b");
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("incidents");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bad.json"), "{not json").unwrap();

        let loader = DataLoader::with_root(temp.path());
        assert!(loader.load_incidents().await.is_err());
    }
}

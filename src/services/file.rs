//! Replay a saved closures payload from disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};

use super::ClosureSource;

/// A [`ClosureSource`] backed by a file holding DATEX XML or a JSON array.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ClosureSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_payload(&self) -> Result<String> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        if body.trim().is_empty() {
            return Err(AppError::empty_response(&self.name));
        }
        Ok(body)
    }
}

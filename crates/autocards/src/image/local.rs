use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{ImageData, ImageSource};
use crate::error::{Error, Result};

/// File extensions treated as images when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// Images stored in a local folder.
#[derive(Debug, Clone)]
pub struct LocalFolderSource {
    folder: PathBuf,
    extensions: Vec<String>,
}

impl LocalFolderSource {
    /// Read images from `folder` using [`DEFAULT_EXTENSIONS`].
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Restrict to the given extensions (compared case-insensitively, without the dot).
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Paths of the images in the folder, sorted.
    pub fn image_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.folder.is_dir() {
            return Err(Error::FolderNotFound(self.folder.display().to_string()));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.folder)? {
            let path = entry?.path();
            if path.is_file() && self.is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn is_image(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl ImageSource for LocalFolderSource {
    async fn get_images(&mut self) -> Result<Vec<ImageData>> {
        let mut images = Vec::new();
        for path in self.image_paths()? {
            let bytes = tokio::fs::read(&path).await?;
            images.push(ImageData {
                bytes,
                source: path.display().to_string(),
            });
        }
        debug!(folder = %self.folder.display(), count = images.len(), "read local images");
        Ok(images)
    }

    async fn remove_images(&mut self, images: &[ImageData]) -> Result<()> {
        for image in images {
            if let Err(e) = tokio::fs::remove_file(&image.source).await {
                warn!(path = %image.source, "could not remove image: {}", e);
            }
        }
        Ok(())
    }
}

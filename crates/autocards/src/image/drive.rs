use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{ImageData, ImageSource};
use crate::error::{Error, Result};
use crate::google::DriveClient;
use crate::store::IdStore;

/// Images stored in a Google Drive folder.
///
/// Consumed file ids are recorded in an [`IdStore`] before deletion, so an
/// image whose deletion failed is still never OCR'd a second time.
#[derive(Debug, Clone)]
pub struct GoogleDriveSource {
    folder_name: String,
    drive: DriveClient,
    consumed: IdStore,
}

impl GoogleDriveSource {
    /// Read images from the Drive folder called `folder_name`.
    pub fn new(folder_name: impl Into<String>, drive: DriveClient, consumed: IdStore) -> Self {
        Self {
            folder_name: folder_name.into(),
            drive,
            consumed,
        }
    }
}

#[async_trait]
impl ImageSource for GoogleDriveSource {
    async fn get_images(&mut self) -> Result<Vec<ImageData>> {
        let folder_id = self
            .drive
            .folder_id(&self.folder_name)
            .await?
            .ok_or_else(|| Error::FolderNotFound(self.folder_name.clone()))?;

        let consumed = self.consumed.ids()?;
        let files = self.drive.list_images(&folder_id).await?;

        let mut images = Vec::new();
        for file in files {
            if consumed.contains(&file.id) {
                debug!(id = %file.id, name = %file.name, "skipping consumed drive file");
                continue;
            }
            let bytes = match self.drive.download(&file.id).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(id = %file.id, name = %file.name, "could not download drive file: {}", e);
                    continue;
                }
            };
            if bytes.is_empty() {
                warn!(id = %file.id, name = %file.name, "drive file is empty");
                continue;
            }
            images.push(ImageData {
                bytes,
                source: file.id,
            });
        }

        info!(folder = %self.folder_name, count = images.len(), "downloaded drive images");
        Ok(images)
    }

    async fn remove_images(&mut self, images: &[ImageData]) -> Result<()> {
        self.consumed
            .insert_many(images.iter().map(|i| i.source.as_str()))?;

        for image in images {
            if let Err(e) = self.drive.delete(&image.source).await {
                warn!(id = %image.source, "could not delete drive file: {}", e);
            }
        }
        Ok(())
    }
}

//! Image sources that feed OCR.
//!
//! An [`ImageSource`] hands out raw image bytes together with an identifier
//! of where they came from, and removes images once their text has been
//! turned into cards.

mod drive;
mod local;

pub use drive::GoogleDriveSource;
pub use local::{DEFAULT_EXTENSIONS, LocalFolderSource};

use async_trait::async_trait;

use crate::error::Result;

/// An image and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Local path or Drive file id.
    pub source: String,
}

/// A place images are read from and removed from.
#[async_trait]
pub trait ImageSource: Send {
    /// Fetch every image currently available.
    async fn get_images(&mut self) -> Result<Vec<ImageData>>;

    /// Remove images whose text has been written into cards.
    async fn remove_images(&mut self, images: &[ImageData]) -> Result<()>;
}

#[async_trait]
impl<T: ImageSource + ?Sized> ImageSource for Box<T> {
    async fn get_images(&mut self) -> Result<Vec<ImageData>> {
        (**self).get_images().await
    }

    async fn remove_images(&mut self, images: &[ImageData]) -> Result<()> {
        (**self).remove_images(images).await
    }
}

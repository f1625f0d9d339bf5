//! Google service adapters: OAuth2, Drive and Vision.

pub mod auth;
pub mod drive;
pub mod vision;

pub use auth::GoogleAuth;
pub use drive::{DriveClient, DriveFile};
pub use vision::VisionClient;

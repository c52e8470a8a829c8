//! Command-line stand-ins for the platform camera and permission prompt.

use std::path::PathBuf;

use async_trait::async_trait;
use recipe_post_core::{Camera, CameraPermission, CaptureError, CaptureOutcome};

/// A "camera" that captures by copying an existing image file.
pub struct FileCamera {
    source: PathBuf,
}

impl FileCamera {
    pub fn new(source: PathBuf) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn capture(&self, destination: &std::path::Path) -> Result<CaptureOutcome, CaptureError> {
        tokio::fs::copy(&self.source, destination)
            .await
            .map_err(|e| {
                CaptureError::Camera(format!("Failed to read {}: {}", self.source.display(), e))
            })?;
        Ok(CaptureOutcome::Captured)
    }
}

/// Running from a terminal implies the user may read their own files.
pub struct GrantedPermission;

#[async_trait]
impl CameraPermission for GrantedPermission {
    fn is_granted(&self) -> bool {
        true
    }

    async fn request(&self) {}
}

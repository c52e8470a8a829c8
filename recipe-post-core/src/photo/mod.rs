//! Photo capture orchestration.
//!
//! The camera and the permission prompt belong to the platform; this module
//! only decides when to ask for permission, where the camera should write, and
//! what to do with the result.

mod fake;
mod key;

pub use fake::{FakePermission, ScriptedCamera};
pub use key::PhotoKeyScheme;

use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CaptureError;

/// What the camera reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The image was written to the destination.
    Captured,
    /// The user backed out without taking a picture.
    Cancelled,
}

/// A camera that writes a captured image to a destination file.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn capture(&self, destination: &Path) -> Result<CaptureOutcome, CaptureError>;
}

/// The platform's camera permission.
#[async_trait]
pub trait CameraPermission: Send + Sync {
    fn is_granted(&self) -> bool;

    /// Ask the user for permission. The answer is only observed through
    /// later calls to `is_granted`.
    async fn request(&self);
}

/// Result of a take-photo action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TakePhotoResult {
    /// Permission was missing and has been requested; nothing was captured.
    PermissionRequested,
    Captured(PathBuf),
    Cancelled,
}

/// Drives a single photo capture into the pictures directory.
pub struct PhotoCapture {
    pictures_dir: PathBuf,
    camera: Arc<dyn Camera>,
    permission: Arc<dyn CameraPermission>,
}

impl PhotoCapture {
    pub fn new(
        pictures_dir: PathBuf,
        camera: Arc<dyn Camera>,
        permission: Arc<dyn CameraPermission>,
    ) -> Self {
        Self {
            pictures_dir,
            camera,
            permission,
        }
    }

    pub fn pictures_dir(&self) -> &Path {
        &self.pictures_dir
    }

    /// Take a photo.
    ///
    /// Without permission this only requests it; the user has to trigger the
    /// action again once it is granted. A cancelled or failed capture removes
    /// the unused destination file.
    pub async fn take_photo(&self) -> Result<TakePhotoResult, CaptureError> {
        if !self.permission.is_granted() {
            tracing::info!("Camera permission missing, requesting it");
            self.permission.request().await;
            return Ok(TakePhotoResult::PermissionRequested);
        }

        let destination = self.create_image_file().await?;
        tracing::debug!(destination = %destination.display(), "Starting camera capture");

        let outcome = self.camera.capture(&destination).await;
        match outcome {
            Ok(CaptureOutcome::Captured) => Ok(TakePhotoResult::Captured(destination)),
            Ok(CaptureOutcome::Cancelled) => {
                discard(&destination).await;
                Ok(TakePhotoResult::Cancelled)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera capture failed");
                discard(&destination).await;
                Err(e)
            }
        }
    }

    /// Create an empty, uniquely named JPEG file for the camera to write into.
    ///
    /// Names look like `JPEG_20240131_184501_a8Zk2q.jpg`.
    async fn create_image_file(&self) -> Result<PathBuf, CaptureError> {
        tokio::fs::create_dir_all(&self.pictures_dir)
            .await
            .map_err(CaptureError::CreateFile)?;

        let dir = self.pictures_dir.clone();
        let prefix = format!("JPEG_{}_", Local::now().format("%Y%m%d_%H%M%S"));
        tokio::task::spawn_blocking(move || {
            let file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".jpg")
                .tempfile_in(&dir)?;
            let (_, path) = file.keep().map_err(|e| e.error)?;
            Ok::<_, std::io::Error>(path)
        })
        .await
        .map_err(|e| CaptureError::CreateFile(std::io::Error::other(e)))?
        .map_err(CaptureError::CreateFile)
    }
}

/// Delete a photo file that is no longer referenced.
pub(crate) async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove unused photo file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn capture_with(
        dir: &TempDir,
        camera: ScriptedCamera,
        permission: FakePermission,
    ) -> (PhotoCapture, Arc<FakePermission>) {
        let permission = Arc::new(permission);
        let capture = PhotoCapture::new(
            dir.path().join("Pictures"),
            Arc::new(camera),
            permission.clone(),
        );
        (capture, permission)
    }

    #[tokio::test]
    async fn test_missing_permission_requests_and_stops() {
        let dir = TempDir::new().unwrap();
        let (capture, permission) =
            capture_with(&dir, ScriptedCamera::capturing(b"img"), FakePermission::denied());

        let result = capture.take_photo().await.unwrap();
        assert_eq!(result, TakePhotoResult::PermissionRequested);
        assert_eq!(permission.requests(), 1);
        assert!(!dir.path().join("Pictures").exists());
    }

    #[tokio::test]
    async fn test_capture_writes_timestamped_file() {
        let dir = TempDir::new().unwrap();
        let (capture, _) =
            capture_with(&dir, ScriptedCamera::capturing(b"img"), FakePermission::granted());

        let TakePhotoResult::Captured(path) = capture.take_photo().await.unwrap() else {
            panic!("expected a captured photo");
        };
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("JPEG_"), "unexpected name {}", name);
        assert!(name.ends_with(".jpg"), "unexpected name {}", name);
        assert_eq!(std::fs::read(&path).unwrap(), b"img");
    }

    #[tokio::test]
    async fn test_two_captures_get_distinct_files() {
        let dir = TempDir::new().unwrap();
        let (capture, _) =
            capture_with(&dir, ScriptedCamera::capturing(b"img"), FakePermission::granted());

        let first = capture.take_photo().await.unwrap();
        let second = capture.take_photo().await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_cancel_removes_destination() {
        let dir = TempDir::new().unwrap();
        let (capture, _) =
            capture_with(&dir, ScriptedCamera::cancelling(), FakePermission::granted());

        assert_eq!(capture.take_photo().await.unwrap(), TakePhotoResult::Cancelled);
        let leftovers = std::fs::read_dir(dir.path().join("Pictures")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_camera_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let (capture, _) =
            capture_with(&dir, ScriptedCamera::failing("no camera"), FakePermission::granted());

        assert!(matches!(
            capture.take_photo().await,
            Err(CaptureError::Camera(_))
        ));
    }
}

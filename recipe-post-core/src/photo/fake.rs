//! Scripted camera and permission for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{Camera, CameraPermission, CaptureOutcome};
use crate::error::CaptureError;

#[derive(Debug, Clone)]
enum Script {
    Capture(Vec<u8>),
    Cancel,
    Fail(String),
}

/// A camera that always behaves the same way.
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    script: Script,
}

impl ScriptedCamera {
    /// Write `image` to the destination and report success.
    pub fn capturing(image: &[u8]) -> Self {
        Self {
            script: Script::Capture(image.to_vec()),
        }
    }

    pub fn cancelling() -> Self {
        Self {
            script: Script::Cancel,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: Script::Fail(message.to_string()),
        }
    }
}

#[async_trait]
impl Camera for ScriptedCamera {
    async fn capture(&self, destination: &Path) -> Result<CaptureOutcome, CaptureError> {
        match &self.script {
            Script::Capture(image) => {
                tokio::fs::write(destination, image)
                    .await
                    .map_err(|e| CaptureError::Camera(e.to_string()))?;
                Ok(CaptureOutcome::Captured)
            }
            Script::Cancel => Ok(CaptureOutcome::Cancelled),
            Script::Fail(message) => Err(CaptureError::Camera(message.clone())),
        }
    }
}

/// A permission whose state tests control directly.
///
/// Requests are counted but never change the granted state on their own.
#[derive(Debug, Default)]
pub struct FakePermission {
    granted: AtomicBool,
    requests: AtomicUsize,
}

impl FakePermission {
    pub fn granted() -> Self {
        Self {
            granted: AtomicBool::new(true),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }

    /// Simulate the user answering the permission prompt.
    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraPermission for FakePermission {
    fn is_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

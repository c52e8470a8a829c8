use thiserror::Error;

/// Form validation failures, in the order they are checked.
///
/// The display text is the exact message shown at the top of the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title cannot be empty!")]
    EmptyTitle,

    #[error("Description cannot be empty!")]
    EmptyDescription,

    #[error("Total kCal cannot be empty!")]
    EmptyTotalCalories,

    #[error("Total kCal must be a number!")]
    InvalidTotalCalories(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Backend returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to create photo file: {0}")]
    CreateFile(#[source] std::io::Error),

    #[error("Camera failed: {0}")]
    Camera(String),
}

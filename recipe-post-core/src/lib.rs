pub mod composer;
pub mod config;
pub mod draft;
pub mod error;
pub mod photo;
pub mod picker;
pub mod pipeline;
pub mod storage;
pub mod submission;
pub mod types;
pub mod validation;

pub use composer::RecipeComposer;
pub use config::{BackendKind, ConfigError, FirebaseConfig, RecipePostConfig};
pub use draft::RecipeDraft;
pub use error::{CaptureError, StorageError, ValidationError};
pub use photo::{
    Camera, CameraPermission, CaptureOutcome, FakePermission, PhotoCapture, PhotoKeyScheme,
    ScriptedCamera, TakePhotoResult,
};
pub use picker::{IngredientPicker, QueuedPicker};
pub use storage::{
    create_backend, Backend, DiskDocumentStore, DiskObjectStorage, DocumentStore,
    FakeDocumentStore, FakeObjectStorage, ObjectStorage, StorageCall,
};
pub use submission::{
    RecipeSubmitter, SubmitError, SubmitOutcome, SubmitState, NOTICE_CREATE_FAILED,
    NOTICE_RECIPE_CREATED, NOTICE_UPLOAD_FAILED,
};
pub use types::{
    CreateRecordOutput, FetchPhotoUrlOutput, IngredientEntry, RecipeRecord, SubmitStep,
    UploadPhotoOutput, RECIPES_COLLECTION, RECIPE_IMAGES_NAMESPACE,
};
pub use validation::{validate, ValidatedRecipe};

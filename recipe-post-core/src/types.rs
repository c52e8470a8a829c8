use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Document-store collection that recipe records are created in.
pub const RECIPES_COLLECTION: &str = "recipes";

/// Object-storage namespace that recipe photos are uploaded under.
pub const RECIPE_IMAGES_NAMESPACE: &str = "recipe_images";

/// Submission steps in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStep {
    UploadPhoto,
    FetchPhotoUrl,
    CreateRecord,
}

impl SubmitStep {
    /// All steps in execution order
    pub const ALL: &'static [SubmitStep] = &[
        SubmitStep::UploadPhoto,
        SubmitStep::FetchPhotoUrl,
        SubmitStep::CreateRecord,
    ];

    /// Steps that stage the photo; a failure here means nothing was persisted.
    pub fn is_photo_stage(&self) -> bool {
        matches!(self, SubmitStep::UploadPhoto | SubmitStep::FetchPhotoUrl)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitStep::UploadPhoto => "upload_photo",
            SubmitStep::FetchPhotoUrl => "fetch_photo_url",
            SubmitStep::CreateRecord => "create_record",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "upload_photo" => Some(SubmitStep::UploadPhoto),
            "fetch_photo_url" => Some(SubmitStep::FetchPhotoUrl),
            "create_record" => Some(SubmitStep::CreateRecord),
            _ => None,
        }
    }
}

/// An ingredient as handed over by the ingredient picker.
///
/// Only `kcal` matters to the workflow. Any other fields the picker attaches
/// are kept in `details` and persisted untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub name: String,
    /// Caloric contribution of this entry.
    pub kcal: u32,
    #[serde(flatten)]
    pub details: Map<String, JsonValue>,
}

impl IngredientEntry {
    pub fn new(name: impl Into<String>, kcal: u32) -> Self {
        Self {
            name: name.into(),
            kcal,
            details: Map::new(),
        }
    }

    /// Attach an extra field that is forwarded verbatim on persist.
    pub fn with_detail(mut self, key: &str, value: JsonValue) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

/// The persisted shape of a recipe post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<IngredientEntry>,
    pub total_calories: f64,
    /// Remote photo URL, or empty when no photo was attached.
    pub photo_url: String,
}

/// Output from the upload_photo step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPhotoOutput {
    pub namespace: String,
    pub key: String,
}

/// Output from the fetch_photo_url step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchPhotoUrlOutput {
    pub photo_url: String,
}

/// Output from the create_record step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordOutput {
    pub recipe_id: String,
    pub record: RecipeRecord,
}

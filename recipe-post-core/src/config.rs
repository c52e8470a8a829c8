//! Configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::photo::PhotoKeyScheme;

/// Default HTTP timeout for remote backends, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Firebase project coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub storage_bucket: String,
}

/// Which storage backend to submit to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Disk,
    Firebase(FirebaseConfig),
}

#[derive(Debug, Clone)]
pub struct RecipePostConfig {
    pub backend: BackendKind,
    /// Root directory of the disk backend.
    pub data_dir: PathBuf,
    /// Private directory that captured photos are written to.
    pub pictures_dir: PathBuf,
    /// How uploaded photos are keyed.
    pub photo_key: PhotoKeyScheme,
    pub http_timeout: Duration,
}

impl RecipePostConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `RECIPE_POST_BACKEND`: "disk" (default) or "firebase"
    /// - `RECIPE_POST_DATA_DIR`: disk backend root (default: "~/.recipe-post/data")
    /// - `RECIPE_POST_PICTURES_DIR`: photo directory (default: "~/.recipe-post/pictures")
    /// - `RECIPE_POST_PHOTO_KEY`: "file-name" (default) or "content-hash"
    /// - `RECIPE_POST_HTTP_TIMEOUT_SECS`: HTTP timeout (default: 30)
    ///
    /// Required when the backend is "firebase":
    /// - `FIREBASE_PROJECT_ID`
    /// - `FIREBASE_STORAGE_BUCKET`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("RECIPE_POST_BACKEND").as_deref() {
            None | Some("disk") => BackendKind::Disk,
            Some("firebase") => {
                let project_id = lookup("FIREBASE_PROJECT_ID")
                    .ok_or_else(|| ConfigError::MissingEnvVar("FIREBASE_PROJECT_ID".to_string()))?;
                let storage_bucket = lookup("FIREBASE_STORAGE_BUCKET").ok_or_else(|| {
                    ConfigError::MissingEnvVar("FIREBASE_STORAGE_BUCKET".to_string())
                })?;
                BackendKind::Firebase(FirebaseConfig {
                    project_id,
                    storage_bucket,
                })
            }
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "RECIPE_POST_BACKEND".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let data_dir = lookup("RECIPE_POST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::default_base_dir().join("data"));

        let pictures_dir = lookup("RECIPE_POST_PICTURES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::default_base_dir().join("pictures"));

        let photo_key = match lookup("RECIPE_POST_PHOTO_KEY") {
            None => PhotoKeyScheme::default(),
            Some(value) => {
                PhotoKeyScheme::from_name(&value).ok_or_else(|| ConfigError::InvalidValue {
                    name: "RECIPE_POST_PHOTO_KEY".to_string(),
                    value,
                })?
            }
        };

        let http_timeout = match lookup("RECIPE_POST_HTTP_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            Some(value) => value
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    name: "RECIPE_POST_HTTP_TIMEOUT_SECS".to_string(),
                    value,
                })?,
        };

        Ok(Self {
            backend,
            data_dir,
            pictures_dir,
            photo_key,
            http_timeout,
        })
    }

    /// Get the default base directory: ~/.recipe-post
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".recipe-post"))
            .unwrap_or_else(|| PathBuf::from(".recipe-post"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<RecipePostConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RecipePostConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.backend, BackendKind::Disk);
        assert_eq!(config.photo_key, PhotoKeyScheme::FileName);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.data_dir.ends_with(".recipe-post/data"));
    }

    #[test]
    fn test_firebase_requires_project() {
        let err = load(&[("RECIPE_POST_BACKEND", "firebase")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnvVar("FIREBASE_PROJECT_ID".to_string())
        );
    }

    #[test]
    fn test_firebase_backend() {
        let config = load(&[
            ("RECIPE_POST_BACKEND", "firebase"),
            ("FIREBASE_PROJECT_ID", "loseit"),
            ("FIREBASE_STORAGE_BUCKET", "loseit.appspot.com"),
            ("RECIPE_POST_PHOTO_KEY", "content-hash"),
        ])
        .unwrap();
        assert_eq!(
            config.backend,
            BackendKind::Firebase(FirebaseConfig {
                project_id: "loseit".to_string(),
                storage_bucket: "loseit.appspot.com".to_string(),
            })
        );
        assert_eq!(config.photo_key, PhotoKeyScheme::ContentHash);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("RECIPE_POST_BACKEND", "s3")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("RECIPE_POST_HTTP_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("RECIPE_POST_PHOTO_KEY", "random")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}

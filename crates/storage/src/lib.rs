//! Storage backends for the study guide agent.
//!
//! Every backend uses the same layout:
//!
//! - `config/study-guide-template.md`, `config/guidelines.md`
//! - `study-guides/<course_id>/<slug>.md`, `study-guides/<course_id>/course-meta.json`
//! - `runs/<run_id>.json`

pub mod blob;
pub mod local;

use std::sync::Arc;

use studyguide_config::StorageConfig;
use studyguide_core::{ArtifactStore, StorageError};
use tracing::info;

pub use blob::BlobStore;
pub use local::LocalStore;

pub const CONFIG_CONTAINER: &str = "config";
pub const GUIDES_CONTAINER: &str = "study-guides";
pub const RUNS_CONTAINER: &str = "runs";

pub const TEMPLATE_NAME: &str = "study-guide-template.md";
pub const GUIDELINES_NAME: &str = "guidelines.md";
pub const META_NAME: &str = "course-meta.json";
pub const DEFAULT_SLUG: &str = "study-guide";

/// Reject keys that could escape their container.
pub fn validate_key(key: &str) -> Result<&str, StorageError> {
    let trimmed = key.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed.contains("..")
        || trimmed.contains('/')
        || trimmed.contains('\\')
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

/// The artifact file name for a slug; an empty slug uses the default name.
pub fn artifact_name(slug: &str) -> Result<String, StorageError> {
    if slug.trim().is_empty() {
        return Ok(format!("{DEFAULT_SLUG}.md"));
    }
    Ok(format!("{}.md", validate_key(slug)?))
}

/// Build the storage backend named by `identifier`.
///
/// `local` and `gcs` are filesystem stores; `azure` talks to Blob Storage
/// when an account URL is configured and falls back to the filesystem
/// otherwise. Unknown identifiers fail fast.
pub fn create_storage(
    identifier: &str,
    config: &StorageConfig,
) -> Result<Arc<dyn ArtifactStore>, StorageError> {
    let normalized = identifier.trim().to_ascii_lowercase();
    let store: Arc<dyn ArtifactStore> = match normalized.as_str() {
        "local" => Arc::new(LocalStore::new("local", config.dir.clone())),
        "gcs" => Arc::new(LocalStore::new("gcs", config.dir.join("gcs"))),
        "azure" => match config.blob_service_url() {
            Some(service_url) => {
                let sas_token = config
                    .sas_token
                    .clone()
                    .ok_or_else(|| StorageError::NotConfigured("AZURE_STORAGE_SAS_TOKEN".into()))?;
                Arc::new(BlobStore::new(&service_url, &sas_token)?)
            }
            None => Arc::new(LocalStore::new("azure", config.dir.join("azure"))),
        },
        _ => return Err(StorageError::UnknownProvider(identifier.to_string())),
    };
    info!(storage = store.name(), "Storage backend ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_keys_are_rejected() {
        for key in ["", " ", ".", "..", "../etc", "a/b", "a\\b"] {
            assert!(validate_key(key).is_err(), "{key:?} should be rejected");
        }
        assert_eq!(validate_key(" 42 ").unwrap(), "42");
    }

    #[test]
    fn artifact_name_defaults_to_study_guide() {
        assert_eq!(artifact_name("").unwrap(), "study-guide.md");
        assert_eq!(artifact_name("week-3").unwrap(), "week-3.md");
        assert!(artifact_name("../x").is_err());
    }

    #[test]
    fn factory_selects_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            dir: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        assert_eq!(create_storage("local", &config).unwrap().name(), "local");
        assert_eq!(create_storage(" GCS ", &config).unwrap().name(), "gcs");
        assert_eq!(create_storage("azure", &config).unwrap().name(), "azure");
    }

    #[test]
    fn factory_rejects_unknown_identifier() {
        let err = create_storage("s3", &StorageConfig::default()).err().unwrap();
        assert!(matches!(err, StorageError::UnknownProvider(ref p) if p == "s3"));
    }

    #[test]
    fn azure_with_account_requires_sas_token() {
        let config = StorageConfig {
            account_url: Some("myaccount".into()),
            ..StorageConfig::default()
        };
        let err = create_storage("azure", &config).err().unwrap();
        assert!(matches!(err, StorageError::NotConfigured(_)));
    }

    #[test]
    fn azure_with_account_uses_blob_store() {
        let config = StorageConfig {
            account_url: Some("https://acct.blob.core.windows.net".into()),
            sas_token: Some("?sv=1&sig=x".into()),
            ..StorageConfig::default()
        };
        assert_eq!(create_storage("azure", &config).unwrap().name(), "azure_blob");
    }
}

//! Course content values returned by the learning-management API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A course, module, page, file, announcement or assignment as returned
/// by the API. Identity is the remote `id` field only.
pub type ResourceItem = Map<String, Value>;

/// How [`FileContent::content`] must be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileEncoding {
    Text,
    Base64,
}

/// A downloaded file, normalised for the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub encoding: FileEncoding,
    pub content: String,
}

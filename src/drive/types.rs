//! Google Drive API type definitions
//!
//! These types mirror the Drive v3 REST payloads used by file creation.

use serde::{Deserialize, Serialize};

/// Metadata part of a file creation request
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Name of the file in Drive
    pub name: String,

    /// Parent folder IDs; omitted means the root of My Drive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

/// File resource returned by Drive
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    #[serde(default)]
    pub name: String,

    /// Link for opening the file in a browser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

/// Local file opened for upload
#[derive(Debug)]
pub struct UploadSource {
    /// Open handle, read as a stream
    pub file: tokio::fs::File,

    /// Size in bytes at the time the file was opened. Used for logging only;
    /// the upload streams whatever the file holds when it is read.
    pub len: u64,
}

/// A single create-file call
#[derive(Debug)]
pub struct CreateFileRequest {
    pub metadata: FileMetadata,

    /// Declared media type; Drive infers one when absent
    pub mime_type: Option<String>,

    pub content: UploadSource,
}

/// Google API error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,
}

impl ErrorResponse {
    /// Most specific human-readable message in the envelope
    pub fn most_specific_message(&self) -> Option<String> {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        };

        non_empty(&self.error.message).or_else(|| {
            self.error.errors.iter().find_map(|detail| {
                non_empty(&detail.message).or_else(|| non_empty(&detail.reason))
            })
        })
    }
}

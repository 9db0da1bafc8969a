//! Google Drive API client
//!
//! Uploads go out as a single `multipart/related` request: a JSON metadata
//! part followed by the file bytes, streamed straight from disk.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{future, stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use tokio_util::io::ReaderStream;

use crate::config::drive::{CREATE_FILE_FIELDS, UPLOAD_BASE_URL};
use crate::drive::auth::TokenProvider;
use crate::drive::types::{CreateFileRequest, DriveFile, ErrorResponse, FileMetadata};
use crate::error::{DriveApiError, DriveMcpError, Result};

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// File operations the upload tool depends on
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Create a file with content, returning at least id, name and view link
    async fn create_file(&self, request: CreateFileRequest) -> Result<DriveFile>;
}

/// Google Drive API client
pub struct DriveClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Bearer token source
    tokens: Arc<dyn TokenProvider>,

    /// Base URL for media uploads
    upload_base_url: String,
}

impl DriveClient {
    /// Create a new Drive client
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_upload_base_url(tokens, UPLOAD_BASE_URL)
    }

    /// Create a client that uploads to a different endpoint
    pub fn with_upload_base_url(
        tokens: Arc<dyn TokenProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            tokens,
            upload_base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn create_file_url(&self) -> String {
        format!(
            "{}/files?uploadType=multipart&fields={}",
            self.upload_base_url, CREATE_FILE_FIELDS
        )
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn create_file(&self, request: CreateFileRequest) -> Result<DriveFile> {
        let token = self.tokens.access_token().await?;

        let CreateFileRequest {
            metadata,
            mime_type,
            content,
        } = request;

        let boundary = multipart_boundary();
        let media_type = mime_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE);
        let (head, tail) = multipart_frame(&boundary, &metadata, media_type)?;

        // No Content-Length: the file may change size while it streams
        let body = stream::once(future::ready(Ok::<Bytes, std::io::Error>(head)))
            .chain(ReaderStream::new(content.file))
            .chain(stream::once(future::ready(Ok(tail))));

        tracing::info!(
            name = %metadata.name,
            bytes = content.len,
            parent = ?metadata.parents,
            "Uploading file to Drive"
        );

        let response = self
            .http_client
            .post(self.create_file_url())
            .bearer_auth(&token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await?;

        if response.status().is_success() {
            let file: DriveFile = response.json().await?;
            tracing::info!(id = %file.id, "Upload complete");
            Ok(file)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(DriveMcpError::Drive(DriveApiError::RequestFailed {
                status: status.as_u16(),
                message: provider_error_message(status, &text),
            }))
        }
    }
}

/// Pull the most specific message out of a failed response body
pub fn provider_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(message) = envelope.most_specific_message() {
            return message;
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!(
            "Drive returned {} with no error details",
            status.canonical_reason().unwrap_or("an error status")
        )
    } else {
        body.to_string()
    }
}

fn multipart_boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("gdrive_mcp_{:x}_{:x}", nanos, std::process::id())
}

/// Bytes surrounding the media content in the request body
fn multipart_frame(
    boundary: &str,
    metadata: &FileMetadata,
    media_type: &str,
) -> Result<(Bytes, Bytes)> {
    let metadata_json = serde_json::to_string(metadata)?;

    let head = format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata_json}\r\n\
         --{boundary}\r\n\
         Content-Type: {media_type}\r\n\r\n"
    );
    let tail = format!("\r\n--{boundary}--\r\n");

    Ok((Bytes::from(head), Bytes::from(tail)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_multipart_frame_layout() {
        let metadata = FileMetadata {
            name: "a.png".to_string(),
            parents: Some(vec!["folder1".to_string()]),
        };
        let (head, tail) = multipart_frame("XYZ", &metadata, "image/png").unwrap();
        let head = String::from_utf8(head.to_vec()).unwrap();

        assert!(head.starts_with("--XYZ\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n"));
        assert!(head.contains(r#"{"name":"a.png","parents":["folder1"]}"#));
        assert!(head.ends_with("--XYZ\r\nContent-Type: image/png\r\n\r\n"));
        assert_eq!(&tail[..], b"\r\n--XYZ--\r\n");
    }

    #[test]
    fn test_boundaries_are_distinct() {
        let a = multipart_boundary();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let b = multipart_boundary();
        assert_ne!(a, b);
        assert!(a.starts_with("gdrive_mcp_"));
    }

    #[test]
    fn test_provider_message_from_envelope() {
        let body = r#"{"error": {"code": 404, "message": "File not found: bogus-folder."}}"#;
        assert_eq!(
            provider_error_message(StatusCode::NOT_FOUND, body),
            "File not found: bogus-folder."
        );
    }

    #[test]
    fn test_provider_message_raw_body() {
        assert_eq!(
            provider_error_message(StatusCode::BAD_GATEWAY, "upstream exploded"),
            "upstream exploded"
        );
    }

    #[test]
    fn test_provider_message_generic_fallback() {
        let message = provider_error_message(StatusCode::SERVICE_UNAVAILABLE, "  ");
        assert!(message.contains("Service Unavailable"));
    }
}

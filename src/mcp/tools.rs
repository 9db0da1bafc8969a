//! MCP Tool definitions and handlers
//!
//! The server registers a single tool, `upload_file`, which streams a local
//! file to Google Drive and reports a link to it.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::drive::client::DriveApi;
use crate::drive::types::{CreateFileRequest, DriveFile, FileMetadata, UploadSource};
use crate::error::{DriveApiError, DriveMcpError, McpError};
use crate::mcp::types::{CallToolResult, Tool};

/// Name of the upload tool
pub const UPLOAD_FILE: &str = "upload_file";

/// Validated arguments for `upload_file`
#[derive(Debug, Clone, Deserialize, Validate, PartialEq, Eq)]
pub struct UploadFileArgs {
    /// Local path of the file to upload
    #[validate(length(min = 1, message = "file_path must not be empty"))]
    pub file_path: String,

    /// Name to give the file in Drive
    #[serde(default)]
    pub file_name: Option<String>,

    /// Declared MIME type
    #[serde(default)]
    pub mime_type: Option<String>,

    /// Destination folder ID
    #[serde(default)]
    pub folder_id: Option<String>,
}

impl UploadFileArgs {
    /// Parse and validate raw tool arguments.
    ///
    /// Blank optional fields are treated as absent.
    pub fn from_arguments(args: Value) -> Result<Self, McpError> {
        let mut args: Self =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams {
                message: e.to_string(),
            })?;

        args.validate().map_err(|e| McpError::InvalidParams {
            message: e.to_string(),
        })?;

        for field in [&mut args.file_name, &mut args.mime_type, &mut args.folder_id] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }

        Ok(args)
    }

    /// Name used in Drive: `file_name`, else the last segment of `file_path`
    pub fn effective_name(&self) -> String {
        match &self.file_name {
            Some(name) => name.clone(),
            None => Path::new(&self.file_path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| self.file_path.clone()),
        }
    }
}

/// Tool handler
pub struct ToolHandler {
    drive: Arc<dyn DriveApi>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(drive: Arc<dyn DriveApi>) -> Self {
        Self { drive }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![Tool {
            name: UPLOAD_FILE.to_string(),
            description: "Uploads a local file to Google Drive and returns a link to view it"
                .to_string(),
            input_schema: upload_file_schema(),
        }]
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<CallToolResult, McpError> {
        match name {
            UPLOAD_FILE => {
                let args = UploadFileArgs::from_arguments(args)?;
                self.handle_upload_file(args).await
            }
            _ => Err(McpError::MethodNotFound {
                name: name.to_string(),
            }),
        }
    }

    // ==================== Tool Handlers ====================

    async fn handle_upload_file(&self, args: UploadFileArgs) -> Result<CallToolResult, McpError> {
        let content = open_upload_source(Path::new(&args.file_path)).await?;
        let name = args.effective_name();

        let request = CreateFileRequest {
            metadata: FileMetadata {
                name: name.clone(),
                parents: args.folder_id.clone().map(|id| vec![id]),
            },
            mime_type: args.mime_type.clone(),
            content,
        };

        match self.drive.create_file(request).await {
            Ok(file) => Ok(CallToolResult::text(upload_summary(&file, &name))),
            Err(e) => {
                tracing::warn!(file_path = %args.file_path, error = %e, "Upload failed");
                Err(McpError::Internal {
                    message: upload_failure_message(&e),
                })
            }
        }
    }
}

/// Open a local file for streaming, rejecting anything unreadable
async fn open_upload_source(path: &Path) -> Result<UploadSource, McpError> {
    let unreadable = |reason: String| McpError::InvalidRequest {
        message: format!("Cannot read file {}: {}", path.display(), reason),
    };

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    let metadata = file.metadata().await.map_err(|e| unreadable(e.to_string()))?;

    if !metadata.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }

    Ok(UploadSource {
        file,
        len: metadata.len(),
    })
}

fn upload_summary(file: &DriveFile, requested_name: &str) -> String {
    match &file.web_view_link {
        Some(link) if !link.is_empty() => format!("File uploaded successfully: {}", link),
        _ => {
            let name = if file.name.is_empty() {
                requested_name
            } else {
                file.name.as_str()
            };
            format!(
                "File \"{}\" uploaded successfully (ID: {}), but a viewable link could not be generated.",
                name, file.id
            )
        }
    }
}

fn upload_failure_message(err: &DriveMcpError) -> String {
    match err {
        DriveMcpError::Drive(DriveApiError::RequestFailed { status, message }) => {
            format!("Failed to upload file: {} (HTTP {})", message, status)
        }
        other => format!("Failed to upload file: {}", other),
    }
}

// ==================== Schema Definitions ====================

fn upload_file_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "file_path": {
                "type": "string",
                "description": "Path of the local file to upload"
            },
            "file_name": {
                "type": "string",
                "description": "Name for the file in Google Drive (defaults to the file's base name)"
            },
            "mime_type": {
                "type": "string",
                "description": "MIME type of the file (inferred by Google Drive if omitted)"
            },
            "folder_id": {
                "type": "string",
                "description": "ID of the Drive folder to upload into (defaults to My Drive root)"
            }
        },
        "required": ["file_path"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_minimal() {
        let args = UploadFileArgs::from_arguments(json!({"file_path": "/tmp/a.png"})).unwrap();
        assert_eq!(args.file_path, "/tmp/a.png");
        assert!(args.file_name.is_none());
        assert!(args.folder_id.is_none());
        assert_eq!(args.effective_name(), "a.png");
    }

    #[test]
    fn test_explicit_file_name_wins() {
        let args = UploadFileArgs::from_arguments(json!({
            "file_path": "/tmp/a.png",
            "file_name": "holiday.png"
        }))
        .unwrap();
        assert_eq!(args.effective_name(), "holiday.png");
    }

    #[test]
    fn test_blank_optionals_are_absent() {
        let args = UploadFileArgs::from_arguments(json!({
            "file_path": "/tmp/a.png",
            "file_name": "",
            "mime_type": "  ",
            "folder_id": ""
        }))
        .unwrap();
        assert!(args.file_name.is_none());
        assert!(args.mime_type.is_none());
        assert!(args.folder_id.is_none());
        assert_eq!(args.effective_name(), "a.png");
    }

    #[test]
    fn test_missing_file_path_is_invalid_params() {
        let err = UploadFileArgs::from_arguments(json!({"file_name": "x"})).unwrap_err();
        assert!(matches!(err, McpError::InvalidParams { .. }));
        assert!(err.to_string().contains("file_path"));
    }

    #[test]
    fn test_mistyped_file_path_is_invalid_params() {
        let err = UploadFileArgs::from_arguments(json!({"file_path": 42})).unwrap_err();
        assert!(matches!(err, McpError::InvalidParams { .. }));
    }

    #[test]
    fn test_empty_file_path_is_invalid_params() {
        let err = UploadFileArgs::from_arguments(json!({"file_path": ""})).unwrap_err();
        assert!(matches!(err, McpError::InvalidParams { .. }));
    }

    #[test]
    fn test_null_arguments_is_invalid_params() {
        let err = UploadFileArgs::from_arguments(Value::Null).unwrap_err();
        assert!(matches!(err, McpError::InvalidParams { .. }));
    }

    #[test]
    fn test_summary_with_link() {
        let file = DriveFile {
            id: "1AbC".to_string(),
            name: "a.png".to_string(),
            web_view_link: Some("https://drive.google.com/file/d/1AbC/view".to_string()),
        };
        assert_eq!(
            upload_summary(&file, "a.png"),
            "File uploaded successfully: https://drive.google.com/file/d/1AbC/view"
        );
    }

    #[test]
    fn test_summary_without_link() {
        let file = DriveFile {
            id: "1AbC".to_string(),
            name: String::new(),
            web_view_link: None,
        };
        let text = upload_summary(&file, "a.png");
        assert!(text.contains("a.png"));
        assert!(text.contains("1AbC"));
        assert!(text.contains("link could not be generated"));
    }

    #[test]
    fn test_failure_message_uses_provider_text() {
        let err = DriveMcpError::Drive(DriveApiError::RequestFailed {
            status: 404,
            message: "File not found: bogus.".to_string(),
        });
        assert_eq!(
            upload_failure_message(&err),
            "Failed to upload file: File not found: bogus. (HTTP 404)"
        );
    }

    #[test]
    fn test_schema_requires_only_file_path() {
        let schema = upload_file_schema();
        assert_eq!(schema["required"], json!(["file_path"]));
        for field in ["file_path", "file_name", "mime_type", "folder_id"] {
            assert_eq!(schema["properties"][field]["type"], "string");
        }
    }
}

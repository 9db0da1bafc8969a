//! Error types for the Google Drive MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Google Drive MCP Server
#[derive(Error, Debug)]
pub enum DriveMcpError {
    /// OAuth authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Drive API errors
    #[error("Drive API error: {0}")]
    Drive(#[from] DriveApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// OAuth authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to build authenticator: {message}")]
    AuthenticatorBuild { message: String },

    #[error("Access token response contained no token")]
    EmptyAccessToken,

    #[error("OAuth callback error: {message}")]
    CallbackError { message: String },

    #[error("No authorization code provided")]
    NoAuthCode,

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },

    #[error("Consent did not return a refresh token; revoke prior access and retry")]
    NoRefreshToken,

    #[error("OAuth2 error: {0}")]
    OAuth2(String),
}

/// Drive API errors
#[derive(Error, Debug)]
pub enum DriveApiError {
    #[error("request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// MCP protocol errors
///
/// Every variant maps onto one JSON-RPC error code; see [`McpError::code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    /// No tool (or method) registered under this name
    #[error("Unknown tool: {name}")]
    MethodNotFound { name: String },

    /// Caller omitted or mistyped an argument
    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    /// A local precondition failed before any network I/O
    #[error("{message}")]
    InvalidRequest { message: String },

    /// The remote call failed
    #[error("{message}")]
    Internal { message: String },
}

impl McpError {
    /// JSON-RPC error code for this error kind
    pub fn code(&self) -> i32 {
        match self {
            McpError::InvalidRequest { .. } => -32600,
            McpError::MethodNotFound { .. } => -32601,
            McpError::InvalidParams { .. } => -32602,
            McpError::Internal { .. } => -32603,
        }
    }
}

/// Result type alias for Drive MCP operations
pub type Result<T> = std::result::Result<T, DriveMcpError>;

/// Convert yup-oauth2 errors to our AuthError
impl From<yup_oauth2::Error> for AuthError {
    fn from(err: yup_oauth2::Error) -> Self {
        AuthError::OAuth2(err.to_string())
    }
}

impl From<yup_oauth2::Error> for DriveMcpError {
    fn from(err: yup_oauth2::Error) -> Self {
        DriveMcpError::Auth(AuthError::from(err))
    }
}

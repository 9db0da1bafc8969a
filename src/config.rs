//! Configuration management for the Google Drive MCP Server
//!
//! All configuration comes from environment variables. The three OAuth
//! secrets are required; the server refuses to start without them.

use std::fmt;

use crate::error::{ConfigError, DriveMcpError, Result};

/// Environment variable holding the OAuth client ID
pub const CLIENT_ID_VAR: &str = "GOOGLE_CLIENT_ID";

/// Environment variable holding the OAuth client secret
pub const CLIENT_SECRET_VAR: &str = "GOOGLE_CLIENT_SECRET";

/// Environment variable holding the long-lived refresh token
pub const REFRESH_TOKEN_VAR: &str = "GOOGLE_REFRESH_TOKEN";

/// Environment variable overriding the consent callback port
pub const OAUTH_PORT_VAR: &str = "GDRIVE_OAUTH_PORT";

const DEFAULT_OAUTH_PORT: u16 = 3000;

/// OAuth client credentials (no user token)
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    /// Load the client ID and secret from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the client ID and secret through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, CLIENT_ID_VAR)?,
            client_secret: required(&lookup, CLIENT_SECRET_VAR)?,
        })
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration for the Google Drive MCP Server
#[derive(Clone)]
pub struct Config {
    /// OAuth client credentials
    pub client: ClientCredentials,

    /// Refresh token obtained through user consent
    pub refresh_token: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup.
    ///
    /// Variables are checked in order; the first one missing or blank is
    /// reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client = ClientCredentials::from_lookup(&lookup)?;
        let refresh_token = required(&lookup, REFRESH_TOKEN_VAR)?;

        Ok(Self {
            client,
            refresh_token,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client", &self.client)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Port for the local OAuth consent callback
pub fn oauth_callback_port() -> Result<u16> {
    match std::env::var(OAUTH_PORT_VAR) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            DriveMcpError::Config(ConfigError::InvalidConfig {
                message: format!("{} must be a port number, got '{}'", OAUTH_PORT_VAR, raw),
            })
        }),
        Err(_) => Ok(DEFAULT_OAUTH_PORT),
    }
}

fn required<F>(lookup: &F, var: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            DriveMcpError::Config(ConfigError::MissingEnvVar {
                var: var.to_string(),
            })
        })
}

/// Google Drive API constants
pub mod drive {
    /// Base URL for media uploads
    pub const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

    /// Fields requested back from file creation
    pub const CREATE_FILE_FIELDS: &str = "id,name,webViewLink";

    /// Scope limited to files created by this app
    pub const SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

    /// OAuth endpoints
    pub const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
    pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
}

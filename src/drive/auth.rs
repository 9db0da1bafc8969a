//! OAuth authentication for the Google Drive API
//!
//! Two pieces live here:
//! - [`RefreshTokenAuthenticator`], which turns the configured refresh token
//!   into short-lived access tokens via yup-oauth2's authorized-user flow
//! - [`ConsentFlow`], the one-off browser consent used to obtain that
//!   refresh token in the first place

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::authorized_user::AuthorizedUserSecret;
use yup_oauth2::AuthorizedUserAuthenticator;

use crate::config::drive::{AUTH_URI, SCOPE, TOKEN_URI};
use crate::config::{ClientCredentials, Config, REFRESH_TOKEN_VAR};
use crate::error::{AuthError, DriveMcpError, Result};

/// Source of bearer tokens for Drive requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get a valid access token, refreshing if necessary
    async fn access_token(&self) -> Result<String>;
}

/// Access tokens minted from a long-lived refresh token.
///
/// Building this does no network I/O. A bad refresh token only shows up
/// when the first Drive call asks for a token.
pub struct RefreshTokenAuthenticator {
    inner: DefaultAuthenticator,
    scopes: Vec<String>,
}

impl RefreshTokenAuthenticator {
    /// Create a new authenticator from the configured secrets
    pub async fn new(config: &Config) -> Result<Self> {
        let secret = AuthorizedUserSecret {
            client_id: config.client.client_id.clone(),
            client_secret: config.client.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            key_type: "authorized_user".to_string(),
        };

        let inner = AuthorizedUserAuthenticator::builder(secret)
            .build()
            .await
            .map_err(|e| {
                DriveMcpError::Auth(AuthError::AuthenticatorBuild {
                    message: e.to_string(),
                })
            })?;

        Ok(Self {
            inner,
            scopes: vec![SCOPE.to_string()],
        })
    }
}

#[async_trait]
impl TokenProvider for RefreshTokenAuthenticator {
    async fn access_token(&self) -> Result<String> {
        let token = self.inner.token(&self.scopes).await?;

        token
            .token()
            .map(str::to_string)
            .ok_or(DriveMcpError::Auth(AuthError::EmptyAccessToken))
    }
}

/// Token response from OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Interactive browser consent that yields a refresh token
pub struct ConsentFlow {
    client: ClientCredentials,
    callback_port: u16,
    http_client: reqwest::Client,
}

impl ConsentFlow {
    pub fn new(client: ClientCredentials, callback_port: u16) -> Self {
        Self {
            client,
            callback_port,
            http_client: reqwest::Client::new(),
        }
    }

    fn callback_url(&self) -> String {
        format!("http://localhost:{}/oauth2callback", self.callback_port)
    }

    /// Generate the authorization URL.
    ///
    /// `access_type=offline` with `prompt=consent` makes Google issue a
    /// refresh token even when the user granted access before.
    pub fn auth_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            AUTH_URI,
            urlencoding::encode(&self.client.client_id),
            urlencoding::encode(&self.callback_url()),
            urlencoding::encode(SCOPE)
        )
    }

    /// Exchange an authorization code for a refresh token
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let callback_url = self.callback_url();
        let params = [
            ("client_id", self.client.client_id.as_str()),
            ("client_secret", self.client.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", callback_url.as_str()),
        ];

        let response = self
            .http_client
            .post(TOKEN_URI)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DriveMcpError::Auth(AuthError::TokenExchangeFailed {
                message: text,
            }));
        }

        let token_response: TokenResponse = response.json().await?;
        token_response
            .refresh_token
            .ok_or(DriveMcpError::Auth(AuthError::NoRefreshToken))
    }

    /// Run the consent flow with a local callback server and print the
    /// resulting refresh token to stderr
    pub async fn run(&self) -> Result<()> {
        use axum::{extract::Query, response::Html, routing::get, Router};
        use std::collections::HashMap;
        use tokio::sync::oneshot;

        let auth_url = self.auth_url();
        eprintln!("\nPlease visit this URL to authorize Google Drive access:");
        eprintln!("{}\n", auth_url);

        if let Err(e) = open::that(&auth_url) {
            tracing::warn!(error = %e, "Could not open browser automatically");
            eprintln!("Please open the URL manually.");
        }

        let (tx, rx) = oneshot::channel::<String>();
        let tx = Arc::new(std::sync::Mutex::new(Some(tx)));

        let callback_handler = move |Query(params): Query<HashMap<String, String>>| async move {
            match params.get("code") {
                Some(code) => {
                    if let Some(tx) = tx.lock().ok().and_then(|mut slot| slot.take()) {
                        let _ = tx.send(code.clone());
                    }
                    Html("<html><body><h1>Authorization successful!</h1><p>You can close this window.</p></body></html>")
                }
                None => Html("<html><body><h1>Authorization failed</h1><p>No authorization code received.</p></body></html>"),
            }
        };

        let app = Router::new().route("/oauth2callback", get(callback_handler));

        let addr = std::net::SocketAddr::from(([127, 0, 0, 1], self.callback_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!(port = self.callback_port, "Waiting for OAuth callback");

        let server = axum::serve(listener, app);

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    return Err(DriveMcpError::Auth(AuthError::CallbackError {
                        message: e.to_string(),
                    }));
                }
                Err(DriveMcpError::Auth(AuthError::NoAuthCode))
            }
            code = rx => {
                let code = code.map_err(|_| DriveMcpError::Auth(AuthError::NoAuthCode))?;
                tracing::info!("Received authorization code, exchanging for tokens");
                let refresh_token = self.exchange_code(&code).await?;
                eprintln!("\nAuthorization complete. Set this in the server environment:\n");
                eprintln!("{}={}\n", REFRESH_TOKEN_VAR, refresh_token);
                Ok(())
            }
        }
    }
}

//! OAuth2 token cache for the calendar provider.
//!
//! The cached token file moves through four states, checked at the start of
//! every calendar request:
//!
//! - `Absent`               → interactive consent, then write the file
//! - `Valid`                → use as-is
//! - `ExpiredRefreshable`   → refresh grant (consent if that fails), then write
//! - `ExpiredUnrefreshable` → interactive consent, then write
//!
//! Interactive consent is the installed-app loopback flow: a one-shot listener
//! on `127.0.0.1:<random port>` receives the browser redirect carrying `code`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} has neither an \"installed\" nor a \"web\" client section")]
    MissingClient(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {message}")]
    TokenEndpoint { status: u16, message: String },

    #[error("consent flow failed: {0}")]
    Consent(String),

    #[error("invalid OAuth URL: {0}")]
    Url(#[from] url::ParseError),
}

fn io_error(path: &Path, source: std::io::Error) -> AuthError {
    AuthError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> AuthError {
    AuthError::Json {
        path: path.display().to_string(),
        source,
    }
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// On-disk token cache, in Google's "authorized user" JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUserToken {
    #[serde(default)]
    pub token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizedUserToken {
    /// A token without an expiry never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .map(|expiry| now + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Absent,
    Valid(AuthorizedUserToken),
    ExpiredRefreshable(AuthorizedUserToken),
    ExpiredUnrefreshable(AuthorizedUserToken),
}

impl AuthState {
    pub fn classify(stored: Option<AuthorizedUserToken>, now: DateTime<Utc>) -> Self {
        let Some(token) = stored else {
            return Self::Absent;
        };
        if !token.token.is_empty() && !token.is_expired(now) {
            return Self::Valid(token);
        }
        let refreshable = token
            .refresh_token
            .as_deref()
            .is_some_and(|rt| !rt.is_empty());
        if refreshable {
            Self::ExpiredRefreshable(token)
        } else {
            Self::ExpiredUnrefreshable(token)
        }
    }
}

/// OAuth client from `credentials.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Reads the token cache. A missing file is `Ok(None)`.
pub async fn load_token(path: &Path) -> Result<Option<AuthorizedUserToken>, AuthError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|e| json_error(path, e))
}

pub async fn save_token(path: &Path, token: &AuthorizedUserToken) -> Result<(), AuthError> {
    let raw = serde_json::to_vec_pretty(token).map_err(|e| json_error(path, e))?;
    tokio::fs::write(path, raw)
        .await
        .map_err(|e| io_error(path, e))
}

pub async fn load_client_secrets(path: &Path) -> Result<ClientSecrets, AuthError> {
    let raw = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
    let file: ClientSecretsFile = serde_json::from_slice(&raw).map_err(|e| json_error(path, e))?;
    file.installed
        .or(file.web)
        .ok_or_else(|| AuthError::MissingClient(path.display().to_string()))
}

/// Hands out a valid access token, refreshing or re-authorizing as needed.
///
/// Token acquisition is serialized within the process. Other processes
/// sharing the token file are not coordinated with.
pub struct TokenAuthorizer {
    http: Client,
    credentials_file: PathBuf,
    token_file: PathBuf,
    lock: Mutex<()>,
}

impl TokenAuthorizer {
    pub fn new(http: Client, credentials_file: PathBuf, token_file: PathBuf) -> Self {
        Self {
            http,
            credentials_file,
            token_file,
            lock: Mutex::new(()),
        }
    }

    pub async fn access_token(&self) -> Result<String, AuthError> {
        let _guard = self.lock.lock().await;

        let stored = match load_token(&self.token_file).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Ignoring unreadable token cache: {e}");
                None
            }
        };

        let token = match AuthState::classify(stored, Utc::now()) {
            AuthState::Valid(token) => return Ok(token.token),
            AuthState::ExpiredRefreshable(token) => match self.refresh(&token).await {
                Ok(refreshed) => {
                    info!("Calendar access token refreshed");
                    refreshed
                }
                Err(e) => {
                    warn!("Token refresh failed, falling back to interactive consent: {e}");
                    self.interactive_consent().await?
                }
            },
            AuthState::ExpiredUnrefreshable(_) | AuthState::Absent => {
                self.interactive_consent().await?
            }
        };

        save_token(&self.token_file, &token).await?;
        Ok(token.token)
    }

    async fn refresh(&self, token: &AuthorizedUserToken) -> Result<AuthorizedUserToken, AuthError> {
        let refresh_token = token.refresh_token.clone().unwrap_or_default();
        let params = [
            ("client_id", token.client_id.as_str()),
            ("client_secret", token.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self.request_token(&token.token_uri, &params).await?;

        Ok(AuthorizedUserToken {
            token: response.access_token,
            refresh_token: response.refresh_token.or(Some(refresh_token)),
            token_uri: token.token_uri.clone(),
            client_id: token.client_id.clone(),
            client_secret: token.client_secret.clone(),
            scopes: parse_scopes(response.scope.as_deref()).unwrap_or_else(|| token.scopes.clone()),
            expiry: expiry_from(response.expires_in),
        })
    }

    async fn interactive_consent(&self) -> Result<AuthorizedUserToken, AuthError> {
        let secrets = load_client_secrets(&self.credentials_file).await?;

        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|e| AuthError::Consent(format!("cannot bind loopback listener: {e}")))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::Consent(format!("cannot read listener address: {e}")))?
            .port();
        let redirect_uri = format!("http://localhost:{port}/");
        let state = Uuid::new_v4().simple().to_string();
        let url = consent_url(&secrets, &redirect_uri, &state)?;

        warn!(
            url = %url,
            "Calendar authorization required; open this URL in a browser to grant access"
        );

        let code = wait_for_authorization_code(&listener, &state).await?;
        let params = [
            ("code", code.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];
        let response = self.request_token(&secrets.token_uri, &params).await?;
        info!("Calendar authorization granted");

        Ok(AuthorizedUserToken {
            token: response.access_token,
            refresh_token: response.refresh_token,
            token_uri: secrets.token_uri,
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            scopes: parse_scopes(response.scope.as_deref())
                .unwrap_or_else(|| vec![CALENDAR_SCOPE.to_string()]),
            expiry: expiry_from(response.expires_in),
        })
    }

    async fn request_token(
        &self,
        token_uri: &str,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, AuthError> {
        let response = self.http.post(token_uri).form(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {description}", e.error),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

fn expiry_from(expires_in: Option<i64>) -> Option<DateTime<Utc>> {
    expires_in.map(|secs| Utc::now() + Duration::seconds(secs))
}

fn parse_scopes(scope: Option<&str>) -> Option<Vec<String>> {
    let scopes: Vec<String> = scope?.split_whitespace().map(String::from).collect();
    (!scopes.is_empty()).then_some(scopes)
}

pub fn consent_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, AuthError> {
    let mut url = Url::parse(&secrets.auth_uri)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", CALENDAR_SCOPE)
        .append_pair("state", state)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url)
}

async fn wait_for_authorization_code(
    listener: &TcpListener,
    expected_state: &str,
) -> Result<String, AuthError> {
    loop {
        let (mut stream, peer) = listener
            .accept()
            .await
            .map_err(|e| AuthError::Consent(format!("loopback accept failed: {e}")))?;

        let mut request_line = String::new();
        {
            let mut reader = BufReader::new(&mut stream);
            if let Err(e) = reader.read_line(&mut request_line).await {
                debug!(%peer, "Dropping unreadable loopback request: {e}");
                continue;
            }
        }

        let outcome = parse_redirect(&request_line, expected_state);
        let (status, message) = match &outcome {
            Ok(Some(_)) => (
                "200 OK",
                "The authentication flow has completed. You may close this window.",
            ),
            Ok(None) => ("404 Not Found", "Not found."),
            Err(_) => ("400 Bad Request", "Authorization failed. Check the server logs."),
        };
        let body = format!("<html><body><p>{message}</p></body></html>");
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        if let Err(e) = stream.write_all(response.as_bytes()).await {
            debug!(%peer, "Failed to answer loopback request: {e}");
        }

        if let Some(code) = outcome? {
            return Ok(code);
        }
    }
}

/// Inspects the request line of a loopback redirect.
///
/// `Ok(None)` means the request is unrelated (e.g. a favicon fetch) and the
/// listener should keep waiting.
fn parse_redirect(request_line: &str, expected_state: &str) -> Result<Option<String>, AuthError> {
    let Some(target) = request_line.split_whitespace().nth(1) else {
        return Ok(None);
    };
    let url = Url::parse("http://localhost/")?.join(target)?;
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if let Some(error) = params.get("error") {
        return Err(AuthError::Consent(format!("authorization denied: {error}")));
    }
    let Some(code) = params.get("code") else {
        return Ok(None);
    };
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Err(AuthError::Consent("state mismatch in redirect".to_string()));
    }
    Ok(Some(code.clone()))
}

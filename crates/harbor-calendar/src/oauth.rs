//! OAuth2 authorization-code flow against Google.
//!
//! The flow is the standard three-step dance: build an authorization URL
//! the user opens in a browser, catch the redirect on a loopback listener,
//! then exchange the code for tokens over a form POST. Refresh uses the
//! same token endpoint.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::CalendarError;

pub const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// How long the loopback listener waits for the user to finish in the
/// browser before giving up.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// OAuth client credentials plus the loopback redirect port.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_port: u16,
}

impl OAuthSettings {
    /// Resolve settings from config values with environment fallbacks
    /// (`HARBOR_OAUTH_CLIENT_ID` / `HARBOR_OAUTH_CLIENT_SECRET`).
    ///
    /// Returns `None` when no client ID is available anywhere.
    pub fn resolve(client_id: &str, client_secret: &str, redirect_port: u16) -> Option<Self> {
        let client_id = if client_id.is_empty() {
            std::env::var("HARBOR_OAUTH_CLIENT_ID").ok()?
        } else {
            client_id.to_string()
        };
        let client_secret = if client_secret.is_empty() {
            std::env::var("HARBOR_OAUTH_CLIENT_SECRET").unwrap_or_default()
        } else {
            client_secret.to_string()
        };
        Some(Self {
            client_id,
            client_secret,
            redirect_port,
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/oauth/callback", self.redirect_port)
    }
}

/// Fresh CSRF `state` value for one authorization attempt.
pub fn new_state() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Build the authorization URL the user opens in a browser.
///
/// `state` is echoed back on the redirect and must be validated there.
/// Offline access is requested so a refresh token comes back.
pub fn authorize_url(settings: &OAuthSettings, state: &str) -> String {
    format!(
        "{AUTH_ENDPOINT}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}&access_type=offline&prompt=consent",
        urlencoding::encode(&settings.client_id),
        urlencoding::encode(&settings.redirect_uri()),
        urlencoding::encode(CALENDAR_SCOPE),
        urlencoding::encode(state),
    )
}

// ---------------------------------------------------------------------------
// Token endpoint
// ---------------------------------------------------------------------------

/// Token endpoint response, for both the code exchange and refresh grants.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    /// Absent on refresh responses.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: String,
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(
    settings: &OAuthSettings,
    code: &str,
) -> Result<TokenResponse, CalendarError> {
    let redirect_uri = settings.redirect_uri();
    let params: [(&str, &str); 5] = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", &settings.client_id),
        ("client_secret", &settings.client_secret),
        ("redirect_uri", &redirect_uri),
    ];
    post_token_form(&params).await
}

/// Trade a refresh token for a fresh access token.
pub async fn refresh_access_token(
    settings: &OAuthSettings,
    refresh_token: &str,
) -> Result<TokenResponse, CalendarError> {
    let params: [(&str, &str); 4] = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", &settings.client_id),
        ("client_secret", &settings.client_secret),
    ];
    post_token_form(&params).await
}

async fn post_token_form(params: &[(&str, &str)]) -> Result<TokenResponse, CalendarError> {
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()?;
    let response = http.post(TOKEN_ENDPOINT).form(params).send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(CalendarError::Provider {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json::<TokenResponse>().await?)
}

// ---------------------------------------------------------------------------
// Loopback callback listener
// ---------------------------------------------------------------------------

/// Minimal HTTP listener that accepts exactly one OAuth redirect.
pub struct CallbackServer {
    listener: TcpListener,
}

const CALLBACK_OK_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
<html><body><h3>Calendar connected.</h3><p>You can close this tab and return to Harbor.</p></body></html>";

const CALLBACK_ERR_PAGE: &str = "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
<html><body><h3>Authorization failed.</h3><p>Return to Harbor and try again.</p></body></html>";

impl CallbackServer {
    /// Bind the loopback listener. Binding happens before the user is sent
    /// to the browser so the redirect can never race the listener.
    pub async fn bind(port: u16) -> Result<Self, CalendarError> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| CalendarError::Callback(format!("failed to bind port {port}: {e}")))?;
        Ok(Self { listener })
    }

    /// Wait for the redirect and return the authorization code.
    ///
    /// Requests whose `state` does not match are answered with an error
    /// page and ignored; the listener keeps waiting until the timeout.
    pub async fn wait_for_code(self, expected_state: &str) -> Result<String, CalendarError> {
        let accept_all = async {
            loop {
                let (mut stream, peer) = match self.listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::debug!(error = %e, "callback accept error");
                        continue;
                    }
                };

                let mut buf = vec![0u8; 4096];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);

                match parse_callback_request(&request, expected_state) {
                    Ok(code) => {
                        let _ = stream.write_all(CALLBACK_OK_PAGE.as_bytes()).await;
                        return Ok(code);
                    }
                    Err(e) => {
                        tracing::debug!(peer = %peer, error = %e, "ignoring callback request");
                        let _ = stream.write_all(CALLBACK_ERR_PAGE.as_bytes()).await;
                    }
                }
            }
        };

        match tokio::time::timeout(CALLBACK_TIMEOUT, accept_all).await {
            Ok(result) => result,
            Err(_) => Err(CalendarError::Callback(
                "timed out waiting for the browser redirect".into(),
            )),
        }
    }
}

/// Parse a raw HTTP request into the authorization code, validating `state`.
fn parse_callback_request(request: &str, expected_state: &str) -> Result<String, CalendarError> {
    let request_line = request
        .lines()
        .next()
        .ok_or_else(|| CalendarError::Callback("empty request".into()))?;

    // "GET /oauth/callback?code=...&state=... HTTP/1.1"
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| CalendarError::Callback("malformed request line".into()))?;

    let query = target
        .split_once('?')
        .map(|(_, q)| q)
        .ok_or_else(|| CalendarError::Callback("redirect carried no query".into()))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(value)
            .map_err(|e| CalendarError::Callback(format!("bad query encoding: {e}")))?;
        match key {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(CalendarError::Callback(format!("provider denied: {error}")));
    }
    match (code, state) {
        (_, Some(state)) if state != expected_state => {
            Err(CalendarError::Callback("state mismatch".into()))
        }
        (_, None) => Err(CalendarError::Callback("missing state".into())),
        (None, _) => Err(CalendarError::Callback("missing code".into())),
        (Some(code), Some(_)) => Ok(code),
    }
}

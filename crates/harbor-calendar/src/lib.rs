//! Google Calendar integration.
//!
//! Provides the OAuth2 authorization-code flow (loopback redirect listener,
//! token exchange and refresh, on-disk token persistence) and a REST client
//! that aggregates upcoming events across the account's calendars.

pub mod client;
pub mod oauth;
pub mod store;
pub mod types;

pub use client::CalendarClient;
pub use oauth::{
    authorize_url, exchange_code, new_state, refresh_access_token, CallbackServer, OAuthSettings,
    TokenResponse,
};
pub use store::{StoredToken, TokenStore};
pub use types::{CalendarEvent, CalendarRef};

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("not authorized: connect the calendar first")]
    NotAuthorized,

    #[error("calendar not configured: {0}")]
    NotConfigured(String),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("OAuth callback error: {0}")]
    Callback(String),

    #[error("token store error: {0}")]
    TokenStore(String),
}

//! Calendar provider settings.

use serde::{Deserialize, Serialize};

/// Google Calendar integration settings.
///
/// `client_id`/`client_secret` may be left empty and supplied via the
/// `HARBOR_OAUTH_CLIENT_ID` / `HARBOR_OAUTH_CLIENT_SECRET` environment
/// variables instead, keeping secrets out of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Whether the calendar panel is wired up at all.
    pub enabled: bool,
    /// OAuth2 client ID.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Loopback port for the OAuth redirect listener.
    pub redirect_port: u16,
    /// Calendar IDs to aggregate. Empty means every calendar on the account.
    pub calendars: Vec<String>,
    /// How many days ahead to fetch events for.
    pub lookahead_days: u16,
    /// Maximum events fetched per calendar.
    pub max_events: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: String::new(),
            client_secret: String::new(),
            redirect_port: 8721,
            calendars: Vec::new(),
            lookahead_days: 7,
            max_events: 50,
        }
    }
}

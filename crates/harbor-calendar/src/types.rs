//! Calendar data types shared between the client and the renderer protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry from the account's calendar list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarRef {
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub primary: bool,
}

/// A calendar event, normalized for the dashboard.
///
/// All-day events carry midnight-UTC boundaries with `all_day` set, so the
/// renderer can format them without re-parsing provider quirks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub calendar_id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

//! Wire protocol between the bridge and the renderer.
//!
//! JSON text frames, tagged by `type`. PTY payloads are base64-encoded so
//! byte content survives the text transport exactly: shells emit escape
//! sequences and partial UTF-8 that a lossy string conversion would mangle.

use serde::{Deserialize, Serialize};

use harbor_calendar::CalendarEvent;

/// Messages received from the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Renderer finished loading; start (or restart) the shell session.
    #[serde(rename = "terminal_ready")]
    TerminalReady { cols: u16, rows: u16 },

    #[serde(rename = "terminal_input")]
    TerminalInput {
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },

    #[serde(rename = "terminal_resize")]
    TerminalResize { cols: u16, rows: u16 },

    #[serde(rename = "calendar_status")]
    CalendarStatus,

    #[serde(rename = "calendar_connect")]
    CalendarConnect,

    #[serde(rename = "calendar_refresh")]
    CalendarRefresh,

    #[serde(rename = "calendar_disconnect")]
    CalendarDisconnect,
}

/// Messages sent to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "terminal_output")]
    TerminalOutput {
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },

    #[serde(rename = "session_exit")]
    SessionExit { code: u32 },

    #[serde(rename = "session_error")]
    SessionError { message: String },

    #[serde(rename = "calendar_status")]
    CalendarStatus { connected: bool },

    #[serde(rename = "calendar_auth_url")]
    CalendarAuthUrl { url: String },

    #[serde(rename = "calendar_connected")]
    CalendarConnected,

    #[serde(rename = "calendar_events")]
    CalendarEvents { events: Vec<CalendarEvent> },

    #[serde(rename = "calendar_error")]
    CalendarError { message: String },
}

/// Base64 (de)serialization for PTY byte payloads.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

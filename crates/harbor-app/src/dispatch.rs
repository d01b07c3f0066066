//! Routes renderer messages to the session bridge or the calendar service.

use std::sync::Arc;

use harbor_common::ViewportSize;
use harbor_config::validation::MAX_DIMENSION;

use crate::broadcast::Broadcaster;
use crate::calendar_tasks::CalendarService;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::SessionBridge;

/// Handle one renderer message. Terminal traffic goes straight to the
/// bridge; calendar requests are handed to the service's worker tasks.
pub fn dispatch(
    msg: ClientMessage,
    bridge: &mut SessionBridge,
    calendar: &Arc<CalendarService>,
    broadcaster: &Broadcaster,
) {
    match msg {
        ClientMessage::TerminalReady { cols, rows } => {
            match checked_size(cols, rows) {
                Some(size) => bridge.set_viewport(size),
                None => tracing::warn!(cols, rows, "terminal_ready size ignored"),
            }
            if let Err(e) = bridge.start_session() {
                tracing::error!(error = %e, "session start failed");
                broadcaster.send(ServerMessage::SessionError {
                    message: e.to_string(),
                });
            }
        }

        ClientMessage::TerminalInput { data } => bridge.forward_input(&data),

        ClientMessage::TerminalResize { cols, rows } => match checked_size(cols, rows) {
            Some(size) => bridge.forward_resize(size),
            None => tracing::warn!(cols, rows, "rejected terminal_resize"),
        },

        msg @ (ClientMessage::CalendarStatus
        | ClientMessage::CalendarConnect
        | ClientMessage::CalendarRefresh
        | ClientMessage::CalendarDisconnect) => calendar.handle(msg),
    }
}

/// Sanity-bound a renderer-reported size: positive and plausible.
fn checked_size(cols: u16, rows: u16) -> Option<ViewportSize> {
    if cols > MAX_DIMENSION || rows > MAX_DIMENSION {
        return None;
    }
    ViewportSize::new(cols, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_size_rejects_zero() {
        assert!(checked_size(0, 24).is_none());
        assert!(checked_size(80, 0).is_none());
    }

    #[test]
    fn checked_size_rejects_absurd() {
        assert!(checked_size(501, 24).is_none());
        assert!(checked_size(80, 501).is_none());
    }

    #[test]
    fn checked_size_accepts_normal() {
        assert_eq!(checked_size(80, 24), ViewportSize::new(80, 24));
        assert_eq!(checked_size(500, 500), ViewportSize::new(500, 500));
    }

    #[tokio::test]
    async fn invalid_resize_never_reaches_an_idle_bridge() {
        use harbor_terminal::ShellLaunch;

        let broadcaster = Broadcaster::new();
        let mut bridge = SessionBridge::new(
            ShellLaunch::defaults(),
            ViewportSize::default(),
            broadcaster.clone(),
        );
        let calendar = Arc::new(CalendarService::new(
            harbor_config::schema::CalendarConfig::default(),
            broadcaster.clone(),
        ));

        // Neither of these may panic or start anything.
        dispatch(
            ClientMessage::TerminalResize { cols: 0, rows: 24 },
            &mut bridge,
            &calendar,
            &broadcaster,
        );
        dispatch(
            ClientMessage::TerminalInput {
                data: b"x".to_vec(),
            },
            &mut bridge,
            &calendar,
            &broadcaster,
        );
        assert!(!bridge.is_active());
    }
}

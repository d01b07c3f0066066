//! Calendar request handlers.
//!
//! Each renderer request becomes one spawned task that reports back through
//! the broadcaster, so the drive loop never waits on the network. Failures
//! surface as `calendar_error` messages and never touch the terminal
//! session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use harbor_calendar::{
    authorize_url, exchange_code, new_state, refresh_access_token, CalendarClient, CalendarError,
    CalendarEvent, CallbackServer, OAuthSettings, StoredToken, TokenStore,
};
use harbor_config::schema::CalendarConfig;

use crate::broadcast::Broadcaster;
use crate::protocol::{ClientMessage, ServerMessage};

pub struct CalendarService {
    config: CalendarConfig,
    client: CalendarClient,
    store: TokenStore,
    sink: Broadcaster,
    /// Guards against a second `calendar_connect` while the browser flow
    /// for the first is still pending.
    connecting: AtomicBool,
}

impl CalendarService {
    pub fn new(config: CalendarConfig, sink: Broadcaster) -> Self {
        let store = TokenStore::default_path()
            .map(TokenStore::new)
            .unwrap_or_else(|| TokenStore::new("calendar_token.json"));
        Self::with_store(config, sink, store)
    }

    pub(crate) fn with_store(config: CalendarConfig, sink: Broadcaster, store: TokenStore) -> Self {
        Self {
            config,
            client: CalendarClient::new(),
            store,
            sink,
            connecting: AtomicBool::new(false),
        }
    }

    /// Route one calendar request onto a worker task.
    pub fn handle(self: &Arc<Self>, msg: ClientMessage) {
        if !self.config.enabled {
            match msg {
                ClientMessage::CalendarStatus => {
                    self.sink
                        .send(ServerMessage::CalendarStatus { connected: false });
                }
                _ => self.sink.send(ServerMessage::CalendarError {
                    message: "calendar integration is disabled in config".into(),
                }),
            }
            return;
        }

        let service = Arc::clone(self);
        tokio::spawn(async move {
            match msg {
                ClientMessage::CalendarStatus => service.report_status(),
                ClientMessage::CalendarConnect => {
                    if let Err(e) = service.connect().await {
                        service.fail("calendar connect failed", e);
                    }
                }
                ClientMessage::CalendarRefresh => match service.fetch_events().await {
                    Ok(events) => service.sink.send(ServerMessage::CalendarEvents { events }),
                    Err(e) => service.fail("calendar fetch failed", e),
                },
                ClientMessage::CalendarDisconnect => {
                    if let Err(e) = service.disconnect() {
                        service.fail("calendar disconnect failed", e);
                    }
                }
                other => tracing::debug!(?other, "not a calendar message"),
            }
        });
    }

    fn report_status(&self) {
        let connected = self.store.load().is_some();
        self.sink.send(ServerMessage::CalendarStatus { connected });
    }

    async fn connect(&self) -> Result<(), CalendarError> {
        if self.connecting.swap(true, Ordering::SeqCst) {
            return Err(CalendarError::Callback(
                "authorization already in progress".into(),
            ));
        }
        let result = self.run_auth_flow().await;
        self.connecting.store(false, Ordering::SeqCst);
        result
    }

    /// The full authorization-code dance: bind the loopback listener, hand
    /// the renderer the URL to open, wait for the redirect, exchange the
    /// code, persist tokens.
    async fn run_auth_flow(&self) -> Result<(), CalendarError> {
        let settings = self.settings()?;
        let server = CallbackServer::bind(settings.redirect_port).await?;
        let state = new_state();

        self.sink.send(ServerMessage::CalendarAuthUrl {
            url: authorize_url(&settings, &state),
        });

        let code = server.wait_for_code(&state).await?;
        let response = exchange_code(&settings, &code).await?;
        let token = StoredToken::from_response(&response, None, Utc::now());
        self.store.save(&token)?;

        tracing::info!("calendar authorized");
        self.sink.send(ServerMessage::CalendarConnected);
        Ok(())
    }

    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        let access_token = self.access_token().await?;
        self.client
            .upcoming_events(
                &access_token,
                &self.config.calendars,
                self.config.lookahead_days,
                self.config.max_events,
            )
            .await
    }

    /// Current access token, refreshed through the token endpoint if stale.
    async fn access_token(&self) -> Result<String, CalendarError> {
        let token = self.store.load().ok_or(CalendarError::NotAuthorized)?;
        if !token.is_expired(Utc::now()) {
            return Ok(token.access_token);
        }

        let refresh = token
            .refresh_token
            .clone()
            .ok_or(CalendarError::NotAuthorized)?;
        let settings = self.settings()?;

        tracing::debug!("access token stale, refreshing");
        let response = refresh_access_token(&settings, &refresh).await?;
        let renewed = StoredToken::from_response(&response, Some(refresh), Utc::now());
        self.store.save(&renewed)?;
        Ok(renewed.access_token)
    }

    fn disconnect(&self) -> Result<(), CalendarError> {
        self.store.clear()?;
        tracing::info!("calendar tokens cleared");
        self.sink
            .send(ServerMessage::CalendarStatus { connected: false });
        Ok(())
    }

    fn settings(&self) -> Result<OAuthSettings, CalendarError> {
        OAuthSettings::resolve(
            &self.config.client_id,
            &self.config.client_secret,
            self.config.redirect_port,
        )
        .ok_or_else(|| {
            CalendarError::NotConfigured(
                "set calendar.client_id or HARBOR_OAUTH_CLIENT_ID".into(),
            )
        })
    }

    fn fail(&self, context: &str, error: CalendarError) {
        tracing::warn!(error = %error, "{context}");
        self.sink.send(ServerMessage::CalendarError {
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn enabled_config() -> CalendarConfig {
        CalendarConfig {
            enabled: true,
            ..CalendarConfig::default()
        }
    }

    fn service_with_temp_store(
        config: CalendarConfig,
    ) -> (
        Arc<CalendarService>,
        tokio::sync::broadcast::Receiver<ServerMessage>,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let sink = Broadcaster::new();
        let rx = sink.subscribe();
        let store = TokenStore::new(dir.path().join("token.json"));
        let service = Arc::new(CalendarService::with_store(config, sink, store));
        (service, rx, dir)
    }

    #[tokio::test]
    async fn disabled_service_reports_disconnected_status() {
        let (service, mut rx, _dir) = service_with_temp_store(CalendarConfig::default());
        service.handle(ClientMessage::CalendarStatus);

        let msg = rx.recv().await.unwrap();
        assert!(matches!(
            msg,
            ServerMessage::CalendarStatus { connected: false }
        ));
    }

    #[tokio::test]
    async fn disabled_service_rejects_other_requests() {
        let (service, mut rx, _dir) = service_with_temp_store(CalendarConfig::default());
        service.handle(ClientMessage::CalendarRefresh);

        let msg = rx.recv().await.unwrap();
        match msg {
            ServerMessage::CalendarError { message } => {
                assert!(message.contains("disabled"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_without_tokens_reports_not_authorized() {
        let (service, mut rx, _dir) = service_with_temp_store(enabled_config());
        service.handle(ClientMessage::CalendarRefresh);

        let msg = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timely")
            .unwrap();
        match msg {
            ServerMessage::CalendarError { message } => {
                assert!(message.contains("not authorized"), "got: {message}");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_reflects_stored_token() {
        let (service, mut rx, _dir) = service_with_temp_store(enabled_config());

        service.handle(ClientMessage::CalendarStatus);
        let msg = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timely")
            .unwrap();
        assert!(matches!(
            msg,
            ServerMessage::CalendarStatus { connected: false }
        ));

        let token = StoredToken {
            access_token: "at".into(),
            refresh_token: Some("rt".into()),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        service.store.save(&token).unwrap();

        service.handle(ClientMessage::CalendarStatus);
        let msg = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timely")
            .unwrap();
        assert!(matches!(
            msg,
            ServerMessage::CalendarStatus { connected: true }
        ));
    }

    #[tokio::test]
    async fn disconnect_clears_tokens_and_reports() {
        let (service, mut rx, _dir) = service_with_temp_store(enabled_config());

        let token = StoredToken {
            access_token: "at".into(),
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        service.store.save(&token).unwrap();

        service.handle(ClientMessage::CalendarDisconnect);
        let msg = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timely")
            .unwrap();
        assert!(matches!(
            msg,
            ServerMessage::CalendarStatus { connected: false }
        ));
        assert!(service.store.load().is_none());
    }

    #[tokio::test]
    async fn connect_without_client_id_reports_not_configured() {
        // No client_id in config; make sure the env fallback is absent too.
        std::env::remove_var("HARBOR_OAUTH_CLIENT_ID");
        let (service, mut rx, _dir) = service_with_temp_store(enabled_config());

        service.handle(ClientMessage::CalendarConnect);
        let msg = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timely")
            .unwrap();
        match msg {
            ServerMessage::CalendarError { message } => {
                assert!(message.contains("not configured"), "got: {message}");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}

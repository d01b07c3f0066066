//! WebSocket relay: the transport between the privileged bridge process
//! and the sandboxed renderer.
//!
//! Connections carry JSON text frames of the protocol types. Inbound
//! messages are funneled to the drive loop over a channel; outbound
//! messages fan out from the broadcaster. The process handle itself never
//! crosses this boundary; only payloads do.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use crate::broadcast::Broadcaster;
use crate::protocol::ClientMessage;

/// Events surfaced to the drive loop.
#[derive(Debug)]
pub enum RelayEvent {
    Message(ClientMessage),
    /// A renderer connection went away; the session ends with it.
    Disconnected,
}

/// Accept renderer connections forever.
pub async fn run(
    listener: TcpListener,
    broadcaster: Broadcaster,
    events: mpsc::UnboundedSender<RelayEvent>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let broadcaster = broadcaster.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, addr, broadcaster, events).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

/// Forward traffic for one renderer until it disconnects.
async fn handle_connection(
    ws: tokio_tungstenite::WebSocketStream<TcpStream>,
    addr: SocketAddr,
    broadcaster: Broadcaster,
    events: mpsc::UnboundedSender<RelayEvent>,
) {
    let (mut sink, mut stream) = ws.split();
    let mut outbound = broadcaster.subscribe();

    tracing::info!(peer = %addr, "renderer connected");

    loop {
        tokio::select! {
            // Bridge → renderer
            msg = outbound.recv() => match msg {
                Ok(msg) => {
                    let json = serde_json::to_string(&msg).unwrap();
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(peer = %addr, skipped, "renderer lagging, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            // Renderer → bridge
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(msg) => {
                            if events.send(RelayEvent::Message(msg)).is_err() {
                                break; // drive loop gone
                            }
                        }
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "invalid renderer message");
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = sink.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!(peer = %addr, error = %e, "WS error");
                    break;
                }
                _ => {}
            },
        }
    }

    tracing::info!(peer = %addr, "renderer disconnected");
    let _ = events.send(RelayEvent::Disconnected);
}

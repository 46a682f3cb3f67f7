//! WebSocket transport: one reader/writer task pair per connection.
//!
//! The transport never touches world state directly. Inbound frames decode
//! into input events and go through the bounded input buffer; outbound
//! frames arrive on a per-client channel filled by the broadcaster.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::game::input::{InputBufferError, InputSender};
use crate::net::protocol::{self, ServerMessage};
use crate::net::session::{ClientId, Hub};

/// Accept connections forever
pub async fn run(
    config: &ServerConfig,
    hub: Arc<RwLock<Hub>>,
    input: InputSender,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.bind_address, config.port))
        .await
        .with_context(|| format!("bind {}:{}", config.bind_address, config.port))?;
    info!("listening on {}:{}", config.bind_address, config.port);

    loop {
        let (stream, peer) = listener.accept().await.context("accept")?;
        tokio::spawn(handle_connection(stream, peer, hub.clone(), input.clone()));
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    hub: Arc<RwLock<Hub>>,
    input: InputSender,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("websocket handshake with {} failed: {}", peer, e);
            return;
        }
    };
    debug!("websocket established with {}", peer);

    let (mut ws_writer, mut ws_reader) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let client_id: ClientId = Uuid::new_v4();
    let blob_id = hub.write().await.attach(client_id, None, tx);

    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if ws_writer.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    {
        let hub = hub.read().await;
        match protocol::encode(&ServerMessage::Welcome { id: blob_id }) {
            Ok(text) => {
                hub.send_to(client_id, text);
            }
            Err(e) => warn!("failed to encode welcome: {}", e),
        }
    }

    while let Some(frame) = ws_reader.next().await {
        match frame {
            Ok(Message::Text(text)) => match protocol::decode(&text) {
                Ok(message) => match input.try_send(client_id, message.into()) {
                    Ok(()) => {}
                    Err(InputBufferError::Full) => {
                        // Tick loop will catch up; dropping one key event is fine
                        debug!("input buffer full, dropping event from {}", peer);
                    }
                    Err(InputBufferError::Disconnected) => break,
                },
                Err(e) => debug!("undecodable frame from {}: {}", peer, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Binary(_)) => {}
            Ok(Message::Frame(_)) => {}
            Err(e) => {
                debug!("websocket error from {}: {}", peer, e);
                break;
            }
        }
    }

    // Idempotent with the broadcaster's death-path detach
    hub.write().await.detach(client_id);
    writer.abort();
    info!("connection from {} closed", peer);
}

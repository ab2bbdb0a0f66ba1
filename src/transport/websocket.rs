//! WebSocket transport
//!
//! Accepts subscriber sockets on `/comments/{post_id}` and wires each one to
//! the hub:
//! - the handshake is rejected with 404 unless the path names a post
//! - a `Connection` is opened for the post and registered with the `Hub`
//! - a spawned writer drains the connection's `Outbound` into the socket and
//!   is the only place the socket sink gets closed; a write still pending when
//!   the hub drops the connection is abandoned
//! - the reader loop ignores everything the client sends and ends on close,
//!   EOF, a read error, or when the hub drops the connection
//!
//! The socket is receive-only from the client's point of view.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message as WsMessage;

use crate::config::HubSettings;
use crate::connection::{Connection, Outbound};
use crate::hub::{Hub, TopicId};
use crate::transport::route;
use crate::utils::TransportError;

/// How long the writer waits for the close handshake before giving up.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Upper bound on joining the writer once the reader side is done.
const WRITER_GRACE: Duration = Duration::from_secs(2);

/// Pause after a failed `accept` so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
pub(crate) const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn start_websocket_server(
    addr: String,
    hub: Arc<Hub>,
    settings: HubSettings,
) -> Result<(), TransportError> {
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| TransportError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("WebSocket server listening on ws://{addr}");
    serve(listener, hub, settings).await;
    Ok(())
}

/// Accept subscribers on an already bound listener. Runs until the task is
/// dropped; a failed `accept` is logged and retried.
pub async fn serve(listener: TcpListener, hub: Arc<Hub>, settings: HubSettings) {
    let capacity = settings.capacity();
    loop {
        let Some((stream, peer)) = accepted(listener.accept().await).await else {
            continue;
        };
        let hub = hub.clone();
        spawn(async move { handle_socket(stream, peer, hub, capacity).await });
    }
}

/// Pass an accepted socket through, or log the error and back off.
pub(crate) async fn accepted<T>(result: io::Result<T>) -> Option<T> {
    match result {
        Ok(accepted) => Some(accepted),
        Err(e) => {
            warn!(error = %e, kind = ?e.kind(), "failed to accept connection");
            tokio::time::sleep(ACCEPT_BACKOFF).await;
            None
        }
    }
}

async fn handle_socket(stream: TcpStream, peer: SocketAddr, hub: Arc<Hub>, capacity: usize) {
    let mut topic: Option<TopicId> = None;
    let handshake = accept_hdr_async(stream, |request: &Request, response: Response| {
        let path = request.uri().path();
        match route::parse_topic(path) {
            Some(id) => {
                topic = Some(id);
                Ok(response)
            }
            None => Err(not_found(path)),
        }
    })
    .await;

    let ws_stream = match handshake {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, error = %e, "WebSocket handshake error");
            return;
        }
    };
    let Some(topic) = topic else {
        return;
    };

    let (ws_sender, mut ws_receiver) = ws_stream.split();
    let (connection, outbound) = Connection::open(topic, capacity);
    let connection_id = connection.id();

    if let Err(e) = hub.connect(topic, &connection) {
        warn!(topic, connection = %connection_id, error = %e, "failed to register subscriber");
        return;
    }

    let mut writer = spawn(write_loop(ws_sender, outbound));

    loop {
        tokio::select! {
            frame = ws_receiver.next() => match frame {
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(topic, connection = %connection_id, error = %e, "read failed");
                    break;
                }
            },
            _ = connection.closed() => break,
        }
    }

    hub.disconnect(topic, &connection);
    drop(connection);
    match tokio::time::timeout(WRITER_GRACE, &mut writer).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(topic, connection = %connection_id, error = %e, "send loop task failed"),
        Err(_) => {
            writer.abort();
            warn!(topic, connection = %connection_id, "send loop did not stop, aborted");
        }
    }

    info!(topic, connection = %connection_id, %peer, "subscriber disconnected");
}

/// Drain `outbound` into `sink` until the connection stops being alive, then
/// close the sink. A send blocked on a peer that stopped reading is dropped
/// as soon as the hub removes the connection.
pub(crate) async fn write_loop<S>(mut sink: S, mut outbound: Outbound)
where
    S: Sink<WsMessage, Error = tungstenite::Error> + Unpin,
{
    while let Some(frame) = outbound.recv().await {
        tokio::select! {
            biased;
            _ = outbound.closed() => break,
            result = sink.send(frame) => {
                if let Err(e) = result {
                    warn!(connection = %outbound.id(), error = %e, "failed to write frame");
                    outbound.fail();
                    break;
                }
            }
        }
    }
    if tokio::time::timeout(CLOSE_GRACE, sink.close()).await.is_err() {
        debug!(connection = %outbound.id(), "close handshake timed out");
    }
    debug!(connection = %outbound.id(), "send loop closed");
}

fn not_found(path: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(format!("no subscription route for {path}")));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::TopicBroker;
use crate::broker::session;
use crate::connection::{Connection, ConnectionState, Frame};
use crate::utils::error::BrokerError;

/// A parsed subscribe request: topic from the path, optional client id
/// from the query string.
#[derive(Debug, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub topic: String,
    pub client: Option<String>,
}

/// A WebSocket-backed duplex connection handle.
///
/// The stream is split so the session's receive loop and concurrent
/// broadcasters can use the handle at the same time; each half sits behind
/// its own async mutex. The closed flag latches once the transport reports
/// the peer gone, either through a failed read, a close frame, or a failed
/// send.
pub struct WsConnection {
    reader: Mutex<SplitStream<WebSocketStream<TcpStream>>>,
    writer: Mutex<SplitSink<WebSocketStream<TcpStream>, WsMessage>>,
    closed: AtomicBool,
}

impl WsConnection {
    pub fn new(stream: WebSocketStream<TcpStream>) -> Self {
        let (writer, reader) = stream.split();
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        }
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Connection for WsConnection {
    fn state(&self) -> ConnectionState {
        // A server-side socket is open from the moment the handshake
        // completes; Connecting never occurs here.
        if self.closed.load(Ordering::SeqCst) {
            ConnectionState::Closed
        } else {
            ConnectionState::Open
        }
    }

    async fn recv(&self) -> Option<Frame> {
        let mut reader = self.reader.lock().await;
        match reader.next().await {
            Some(Ok(WsMessage::Text(text))) => Some(Frame::Text(text.to_string())),
            Some(Ok(WsMessage::Close(_))) => {
                self.mark_closed();
                None
            }
            Some(Ok(_)) => Some(Frame::Binary),
            Some(Err(e)) => {
                debug!("websocket read failed: {e}");
                self.mark_closed();
                None
            }
            None => {
                self.mark_closed();
                None
            }
        }
    }

    async fn send_text(&self, payload: &str) -> Result<(), BrokerError> {
        let mut writer = self.writer.lock().await;
        writer.send(WsMessage::text(payload)).await.map_err(|e| {
            self.mark_closed();
            BrokerError::SendFailure(e.to_string())
        })
    }
}

/// Parses the request target of a subscribe upgrade.
///
/// Expects `/topics/subscribe/{topic}` with an optional `client` query
/// parameter. Topic and client are validated against the session-id
/// delimiter here so a malformed join is rejected before any connection
/// work begins.
pub fn parse_request_target(path: &str, query: Option<&str>) -> Result<SubscribeRequest, String> {
    let mut segments = path.trim_matches('/').split('/');
    let (topics, subscribe, topic, rest) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    );
    match (topics, subscribe, topic, rest) {
        (Some("topics"), Some("subscribe"), Some(topic), None) if !topic.is_empty() => {
            let client = query
                .into_iter()
                .flat_map(|q| q.split('&'))
                .find_map(|pair| pair.strip_prefix("client="))
                .filter(|c| !c.is_empty())
                .map(str::to_string);

            session::validate_token(topic).map_err(|e| e.to_string())?;
            if let Some(c) = &client {
                session::validate_token(c).map_err(|e| e.to_string())?;
            }

            Ok(SubscribeRequest {
                topic: topic.to_string(),
                client,
            })
        }
        _ => Err(format!(
            "unknown path {path}, expected /topics/subscribe/{{topic}}"
        )),
    }
}

fn bad_request(reason: String) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(reason));
    *response.status_mut() = StatusCode::BAD_REQUEST;
    response
}

const MAX_REQUEST_HEAD: usize = 8 * 1024;

/// Peeks at the buffered request head without consuming any bytes, so the
/// handshake can still read the full request afterwards. Stops once the
/// header block is complete, the buffer is full, or no further bytes have
/// arrived between two polls.
async fn peek_request_head(stream: &TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; MAX_REQUEST_HEAD];
    let mut last = 0;
    loop {
        let n = stream.peek(&mut buf).await?;
        if n == 0 || n == buf.len() || n == last || head_is_complete(&buf[..n]) {
            buf.truncate(n);
            return Ok(buf);
        }
        last = n;
    }
}

fn head_is_complete(head: &[u8]) -> bool {
    head.windows(4).any(|w| w == b"\r\n\r\n")
}

/// Whether a complete request head asks for a WebSocket upgrade.
pub fn is_upgrade_head(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head).to_ascii_lowercase();
    text.lines()
        .any(|line| line.starts_with("upgrade:") && line.contains("websocket"))
}

/// Answers a plain HTTP request with a 400 and closes the connection.
async fn respond_bad_request(mut stream: TcpStream, reason: &str) {
    let response = format!(
        "HTTP/1.1 400 Bad Request\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reason}",
        reason.len()
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        debug!("failed to write 400 response: {e}");
    }
    let _ = stream.shutdown().await;
}

/// Accepts WebSocket upgrades and runs one broker session per connection.
pub async fn start_websocket_server(addr: &str, broker: Arc<TopicBroker>) {
    let listener = TcpListener::bind(addr).await.expect("Can't bind");

    info!("WebSocket server listening on ws://{addr}");

    while let Ok((stream, _)) = listener.accept().await {
        let broker = broker.clone();
        tokio::spawn(handle_connection(stream, broker));
    }
}

async fn handle_connection(stream: TcpStream, broker: Arc<TopicBroker>) {
    // A request that is definitely not an upgrade gets an HTTP 400 instead
    // of a dropped connection. An incomplete head falls through to the
    // handshake, which buffers the request properly.
    match peek_request_head(&stream).await {
        Ok(head) if head_is_complete(&head) && !is_upgrade_head(&head) => {
            info!("rejecting non-upgrade request with 400");
            respond_bad_request(stream, "Expected a WebSocket upgrade request").await;
            return;
        }
        Ok(_) => {}
        Err(e) => {
            debug!("failed to read request head: {e}");
            return;
        }
    }

    let mut subscribe: Option<SubscribeRequest> = None;
    let ws_stream = match accept_hdr_async(stream, |req: &Request, response: Response| {
        match parse_request_target(req.uri().path(), req.uri().query()) {
            Ok(parsed) => {
                subscribe = Some(parsed);
                Ok(response)
            }
            Err(reason) => Err(bad_request(reason)),
        }
    })
    .await
    {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error: {e}");
            return;
        }
    };
    let Some(subscribe) = subscribe else { return };

    let conn = Arc::new(WsConnection::new(ws_stream));
    let session_id = match broker
        .join(&subscribe.topic, subscribe.client.as_deref(), conn.clone())
        .await
    {
        Ok(id) => id,
        Err(e) => {
            warn!("admission rejected: {e}");
            return;
        }
    };
    info!("WebSocket connection established for {session_id}");

    broker.run_session(&session_id, conn).await;
}

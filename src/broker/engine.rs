use std::sync::Arc;

use futures_util::future;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::broker::registry::ConnectionRegistry;
use crate::broker::session::{self, SessionId};
use crate::connection::{Connection, ConnectionState, Frame};
use crate::utils::error::BrokerError;

/// The broker that tracks live sessions and routes messages between them.
///
/// Clients are admitted onto a named topic, after which every text message
/// they send is fanned out to all sessions of that topic, the sender
/// included. The broker owns the session registry; a background reaper
/// (see `broker::reaper`) evicts connections once the transport reports
/// them closed. The receive loop itself never removes registry entries,
/// keeping liveness detection decoupled from reclamation.
#[derive(Default)]
pub struct TopicBroker {
    registry: ConnectionRegistry,
}

impl TopicBroker {
    pub fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Admits a connection onto `topic` and returns its session id.
    ///
    /// When `client` is absent a fresh identifier is generated. Both
    /// `client` and `topic` must be free of the session-id delimiter;
    /// otherwise admission fails with `InvalidArgument` and the registry
    /// is untouched. On success a join announcement is broadcast to every
    /// current subscriber of the topic, the new session included.
    pub async fn join(
        &self,
        topic: &str,
        client: Option<&str>,
        conn: Arc<dyn Connection>,
    ) -> Result<SessionId, BrokerError> {
        let client = match client {
            Some(c) => c.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        session::validate_token(&client)?;
        session::validate_token(topic)?;

        let session_id = session::compose(&client, topic);
        self.registry.insert(session_id.clone(), conn);

        let announcement =
            format!("Client {client} has joined the TOPIC:{topic}, with sessionId:{session_id}");
        self.broadcast(&announcement).await;
        info!("{announcement}");

        Ok(session_id)
    }

    /// Runs the receive loop for an admitted session.
    ///
    /// Blocks reading one frame at a time while the connection is open.
    /// Text frames are stripped of trailing null padding; empty or
    /// whitespace-only results are discarded silently, anything else is
    /// prefixed with the session id and broadcast. Non-text frames and
    /// failed reads produce nothing for that iteration. The loop exits
    /// when the connection leaves the open state and performs no registry
    /// cleanup on the way out — reclamation belongs to the reaper.
    pub async fn run_session(&self, session_id: &str, conn: Arc<dyn Connection>) {
        while conn.state() == ConnectionState::Open {
            let Some(frame) = conn.recv().await else {
                continue;
            };
            let Frame::Text(text) = frame else {
                continue;
            };
            let payload = text.trim_end_matches('\0');
            if payload.trim().is_empty() {
                continue;
            }
            let message = format!("{session_id}:{payload}");
            debug!("received message {message}");
            self.broadcast(&message).await;
        }
        debug!("receive loop ended for {session_id}");
    }

    /// Fans `message` out to every live session of its topic.
    ///
    /// The routing topic is the second delimiter-separated field of the
    /// message, which by construction is the topic component of the
    /// sender's session id. Recipients are every snapshot entry whose
    /// connection is open and whose key contains the topic token as a
    /// substring. Sends run concurrently and are joined before returning;
    /// one unreachable peer is logged and skipped without affecting the
    /// rest. Best-effort, at-most-once per recipient per call.
    pub async fn broadcast(&self, message: &str) {
        let Some(topic) = session::routing_topic(message) else {
            debug!("message carries no routing topic, dropping: {message}");
            return;
        };

        let recipients: Vec<(SessionId, Arc<dyn Connection>)> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(|(session_id, conn)| {
                conn.state() == ConnectionState::Open && session_id.contains(topic)
            })
            .collect();

        let sends = recipients.into_iter().map(|(session_id, conn)| async move {
            match conn.send_text(message).await {
                Ok(()) => debug!("sent message: {message} => {session_id}"),
                Err(e) => warn!("failed to send to {session_id}: {e}"),
            }
        });
        future::join_all(sends).await;
    }
}

//! Connected player sessions

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;
use uuid::Uuid;

use crate::ws::protocol::{PlayerProfile, ServerMsg, SessionId};

/// Buffered outbound messages per session before snapshots are dropped
pub const OUTBOUND_BUFFER: usize = 256;

/// A connected player: identity plus the channel to its socket writer
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub profile: PlayerProfile,
    outbound: mpsc::Sender<ServerMsg>,
}

impl Session {
    pub fn new(id: SessionId, profile: PlayerProfile, outbound: mpsc::Sender<ServerMsg>) -> Self {
        Self {
            id,
            profile,
            outbound,
        }
    }

    /// Session with a fresh id and its own outbound channel
    pub fn open(profile: PlayerProfile) -> (Self, mpsc::Receiver<ServerMsg>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        (Self::new(Uuid::new_v4(), profile, tx), rx)
    }

    pub fn player_id(&self) -> &str {
        &self.profile.id
    }

    pub fn display_name(&self) -> &str {
        &self.profile.display_name
    }

    /// Queue a message without waiting.
    ///
    /// On a full buffer a snapshot is dropped. Any other message is handed to
    /// a task that waits for room, so `match_found` and `game_over` always
    /// reach a session that is still open. Must be called inside a tokio
    /// runtime.
    pub fn send(&self, msg: ServerMsg) -> Result<(), DeliveryError> {
        match self.outbound.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Closed),
            Err(TrySendError::Full(msg)) if msg.is_snapshot() => Err(DeliveryError::Full),
            Err(TrySendError::Full(msg)) => {
                debug!(session_id = %self.id, "Outbound buffer full, deferring message");
                let outbound = self.outbound.clone();
                let session_id = self.id;
                tokio::spawn(async move {
                    if outbound.send(msg).await.is_err() {
                        debug!(session_id = %session_id, "Session closed before deferred send");
                    }
                });
                Ok(())
            }
        }
    }
}

/// Outbound delivery failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Outbound buffer full")]
    Full,

    #[error("Session channel closed")]
    Closed,
}

/// Reading half of a session channel, as drained by the socket writer.
///
/// A backlog of queued snapshots collapses to the newest one. Other messages
/// are never skipped and keep their order.
pub struct Outbox {
    rx: mpsc::Receiver<ServerMsg>,
    held: Option<ServerMsg>,
}

impl Outbox {
    pub fn new(rx: mpsc::Receiver<ServerMsg>) -> Self {
        Self { rx, held: None }
    }

    pub async fn recv(&mut self) -> Option<ServerMsg> {
        let mut msg = match self.held.take() {
            Some(msg) => msg,
            None => self.rx.recv().await?,
        };

        while msg.is_snapshot() {
            match self.rx.try_recv() {
                Ok(next) if next.is_snapshot() => msg = next,
                Ok(next) => {
                    self.held = Some(next);
                    break;
                }
                Err(_) => break,
            }
        }

        Some(msg)
    }
}

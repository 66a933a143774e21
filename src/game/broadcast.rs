//! Fan-out of server messages to the sessions of one match

use tracing::{debug, warn};

use crate::session::{DeliveryError, Session};
use crate::ws::protocol::{MatchId, ServerMsg, SessionId};

/// Delivers messages to both sessions of a match without blocking the
/// caller. Sessions are stored in slot order.
pub struct Broadcaster {
    match_id: MatchId,
    sessions: [Session; 2],
}

impl Broadcaster {
    pub fn new(match_id: MatchId, sessions: [Session; 2]) -> Self {
        Self { match_id, sessions }
    }

    pub fn sessions(&self) -> &[Session; 2] {
        &self.sessions
    }

    /// Slot of a session in this match
    pub fn slot_of(&self, session_id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == session_id)
    }

    /// Send to every session
    pub fn send_all(&self, msg: &ServerMsg) {
        for session in &self.sessions {
            self.deliver(session, msg.clone());
        }
    }

    /// Send to the session in `slot`
    pub fn send_to(&self, slot: usize, msg: ServerMsg) {
        if let Some(session) = self.sessions.get(slot) {
            self.deliver(session, msg);
        }
    }

    fn deliver(&self, session: &Session, msg: ServerMsg) {
        match session.send(msg) {
            Ok(()) => {}
            Err(DeliveryError::Full) => {
                warn!(
                    match_id = %self.match_id,
                    session_id = %session.id,
                    "Outbound buffer full, dropping snapshot"
                );
            }
            Err(DeliveryError::Closed) => {
                debug!(
                    match_id = %self.match_id,
                    session_id = %session.id,
                    "Session channel closed"
                );
            }
        }
    }
}

//! Matchmaking queue implementation

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::session::Session;
use crate::ws::protocol::SessionId;

/// Session waiting for an opponent
#[derive(Debug, Clone)]
pub struct QueuedSession {
    pub session: Session,
    pub queued_at: Instant,
}

impl QueuedSession {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            queued_at: Instant::now(),
        }
    }

    /// How long this session has been waiting
    pub fn wait_time(&self) -> Duration {
        self.queued_at.elapsed()
    }
}

/// First-come-first-served wait list. Matches are always exactly two players.
#[derive(Debug, Default)]
pub struct MatchmakingQueue {
    queue: VecDeque<QueuedSession>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to the back of the queue. An earlier entry for the same
    /// session or the same player is dropped first.
    pub fn enqueue(&mut self, session: Session) {
        self.queue.retain(|q| {
            q.session.id != session.id && q.session.player_id() != session.player_id()
        });
        self.queue.push_back(QueuedSession::new(session));
    }

    /// Remove a session from the queue. Safe to call for sessions that are
    /// not queued.
    pub fn remove(&mut self, session_id: SessionId) -> Option<QueuedSession> {
        let pos = self.queue.iter().position(|q| q.session.id == session_id)?;
        self.queue.remove(pos)
    }

    /// Check if a session is in the queue
    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.queue.iter().any(|q| &q.session.id == session_id)
    }

    /// Get queue length
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take the two longest-waiting sessions, in arrival order
    pub fn try_pair(&mut self) -> Option<[QueuedSession; 2]> {
        if self.queue.len() < 2 {
            return None;
        }
        let first = self.queue.pop_front()?;
        let second = self.queue.pop_front()?;
        Some([first, second])
    }
}

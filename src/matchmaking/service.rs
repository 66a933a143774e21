//! Matchmaking service - manages queue, match creation and action routing

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::GameSettings;
use crate::game::r#match::SLOT_COLORS;
use crate::game::{GameMatch, MatchCommand, MatchRegistry, MatchState, PlayerTag};
use crate::session::Session;
use crate::ws::protocol::{PlayerAction, ServerMsg, SessionId};

use super::queue::{MatchmakingQueue, QueuedSession};

/// Matchmaking service
pub struct MatchmakingService {
    queue: Mutex<MatchmakingQueue>,
    registry: Arc<MatchRegistry>,
    settings: Arc<GameSettings>,
}

impl MatchmakingService {
    pub fn new(registry: Arc<MatchRegistry>, settings: GameSettings) -> Self {
        Self {
            queue: Mutex::new(MatchmakingQueue::new()),
            registry,
            settings: Arc::new(settings),
        }
    }

    /// Join matchmaking. Pairs immediately once two sessions are waiting.
    ///
    /// Must be called from within a tokio runtime; the new match runs as a
    /// spawned task.
    pub fn find_game(&self, session: Session) {
        if let Some(handle) = self.registry.match_for_session(&session.id) {
            if !handle.is_finished() {
                warn!(session_id = %session.id, "find_game from a session already in a match");
                return;
            }
            // Ended but not yet released by its task
            self.registry.remove(&handle.id);
        }

        let session_id = session.id;
        let player_id = session.player_id().to_string();

        // Held until the match is registered, so a concurrent disconnect sees
        // the session either in the queue or in the registry.
        let mut queue = self.queue.lock();
        queue.enqueue(session);

        info!(
            session_id = %session_id,
            player_id = %player_id,
            queue_size = queue.len(),
            "Player joined matchmaking queue"
        );

        if let Some(pair) = queue.try_pair() {
            self.create_match(pair);
        }
    }

    /// Route an in-match action to the session's match
    pub async fn submit_action(&self, session_id: SessionId, action: PlayerAction) {
        let Some(handle) = self.registry.match_for_session(&session_id) else {
            debug!(session_id = %session_id, "Action from a session without a match");
            return;
        };

        let command = match action {
            PlayerAction::Attack(order) => MatchCommand::Attack { session_id, order },
        };

        if !handle.send(command).await {
            debug!(session_id = %session_id, match_id = %handle.id, "Match already stopped");
        }
    }

    /// Handle a closed session: leave the queue, or forfeit the running match
    pub async fn disconnect(&self, session_id: SessionId) {
        if self.queue.lock().remove(session_id).is_some() {
            info!(session_id = %session_id, "Player left matchmaking queue");
        }

        if let Some(handle) = self.registry.match_for_session(&session_id) {
            if !handle.send(MatchCommand::Disconnect { session_id }).await {
                debug!(session_id = %session_id, match_id = %handle.id, "Match already stopped");
            }
        }
    }

    /// Create and start a match for two paired sessions
    fn create_match(&self, pair: [QueuedSession; 2]) {
        let match_id = Uuid::new_v4();
        let seed = rand::random::<u64>();

        for queued in &pair {
            debug!(
                session_id = %queued.session.id,
                waited_ms = queued.wait_time().as_millis() as u64,
                "Paired from queue"
            );
        }

        let sessions = pair.map(|q| q.session);
        let players = [player_tag(&sessions[0], 0), player_tag(&sessions[1], 1)];

        let state = match MatchState::new(match_id, seed, players, &self.settings) {
            Ok(state) => state,
            Err(e) => {
                error!(match_id = %match_id, error = %e, "Failed to initialize match");
                for session in &sessions {
                    let _ = session.send(ServerMsg::Error {
                        code: "match_init_failed".to_string(),
                        message: e.to_string(),
                    });
                }
                return;
            }
        };

        for (slot, session) in sessions.iter().enumerate() {
            let _ = session.send(ServerMsg::MatchFound {
                match_id,
                player_slot: slot as u8 + 1,
            });
        }

        let (game_match, handle) = GameMatch::new(state, sessions, &self.settings);
        self.registry.insert(handle);

        info!(
            match_id = %match_id,
            active_matches = self.registry.active_matches(),
            "Created new match"
        );

        let registry = self.registry.clone();
        tokio::spawn(async move {
            game_match.run().await;

            // Tick loops have stopped; release the routes
            registry.remove(&match_id);
            info!(match_id = %match_id, "Match removed from registry");
        });
    }

    /// Get current queue size
    pub fn queue_size(&self) -> usize {
        self.queue.lock().len()
    }

    /// Check if session is in queue
    pub fn is_in_queue(&self, session_id: &SessionId) -> bool {
        self.queue.lock().contains(session_id)
    }
}

fn player_tag(session: &Session, slot: usize) -> PlayerTag {
    PlayerTag {
        player_id: session.player_id().to_string(),
        display_name: session.display_name().to_string(),
        color: session
            .profile
            .color
            .clone()
            .unwrap_or_else(|| SLOT_COLORS[slot].to_string()),
    }
}

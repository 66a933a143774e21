//! Routing table of running matches

use dashmap::DashMap;

use crate::ws::protocol::{MatchId, SessionId};

use super::r#match::MatchHandle;

/// Registry of all active matches, plus the session -> match routes used
/// to deliver actions and disconnects
pub struct MatchRegistry {
    matches: DashMap<MatchId, MatchHandle>,
    sessions: DashMap<SessionId, MatchId>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self {
            matches: DashMap::new(),
            sessions: DashMap::new(),
        }
    }

    pub fn get(&self, id: &MatchId) -> Option<MatchHandle> {
        self.matches.get(id).map(|m| m.value().clone())
    }

    pub fn insert(&self, handle: MatchHandle) {
        for session_id in handle.sessions {
            self.sessions.insert(session_id, handle.id);
        }
        self.matches.insert(handle.id, handle);
    }

    /// Drop a match and its session routes
    pub fn remove(&self, id: &MatchId) -> Option<MatchHandle> {
        let (_, handle) = self.matches.remove(id)?;
        for session_id in &handle.sessions {
            self.sessions.remove_if(session_id, |_, match_id| match_id == id);
        }
        Some(handle)
    }

    /// Match the session is playing in, if any
    pub fn match_for_session(&self, session_id: &SessionId) -> Option<MatchHandle> {
        let match_id = *self.sessions.get(session_id)?;
        self.get(&match_id)
    }

    pub fn contains_session(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }

    pub fn total_players(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn handle() -> MatchHandle {
        let (command_tx, _rx) = mpsc::channel(1);
        MatchHandle {
            id: Uuid::new_v4(),
            command_tx,
            sessions: [Uuid::new_v4(), Uuid::new_v4()],
        }
    }

    #[test]
    fn sessions_route_to_their_match() {
        let registry = MatchRegistry::new();
        let h = handle();
        registry.insert(h.clone());

        assert_eq!(registry.active_matches(), 1);
        assert_eq!(registry.total_players(), 2);
        for session_id in &h.sessions {
            assert_eq!(registry.match_for_session(session_id).map(|m| m.id), Some(h.id));
        }
        assert!(registry.match_for_session(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn remove_clears_routes() {
        let registry = MatchRegistry::new();
        let h = handle();
        registry.insert(h.clone());

        assert!(registry.remove(&h.id).is_some());
        assert!(registry.remove(&h.id).is_none());
        assert_eq!(registry.active_matches(), 0);
        assert!(!registry.contains_session(&h.sessions[0]));
        assert!(!registry.contains_session(&h.sessions[1]));
    }
}

//! Match state and the per-match tick actor

use std::collections::BTreeMap;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::GameSettings;
use crate::session::Session;
use crate::ws::protocol::{AttackOrder, MatchId, ServerMsg, SessionId};

use super::broadcast::Broadcaster;
use super::combat::{self, CombatOutcome};
use super::entity::{Node, PlayerTag, Position, UnitStream};
use super::error::{AttackError, PlacementError};
use super::movement::{self, Advance, MovementParams, MAX_JITTER, WAVE_DELAY_STEP, WAVE_SIZE};
use super::placement;
use super::snapshot::SnapshotBuilder;
use super::victory::{self, MatchOutcome};

/// Garrison of a player's home node at match start
pub const PLAYER_START_UNITS: u32 = 10;

/// Fixed ids of the home nodes, by slot
pub const PLAYER_NODE_IDS: [&str; 2] = ["p1", "p2"];

/// Colors for players who did not pick one, by slot
pub const SLOT_COLORS: [&str; 2] = ["#4a90e2", "#e94e4e"];

/// Pending commands per match before senders wait
const COMMAND_BUFFER: usize = 256;

/// Authoritative board of one match. Only the owning [`GameMatch`] task
/// mutates it.
pub struct MatchState {
    pub id: MatchId,
    /// Player identities in slot order
    pub players: [PlayerTag; 2],
    pub nodes: Vec<Node>,
    /// In-flight streams in launch order; arrivals resolve in this order
    pub streams: Vec<UnitStream>,
    pub production_ticks: u64,
    pub movement_ticks: u64,
    node_radius: f32,
    movement: MovementParams,
    rng: ChaCha8Rng,
}

impl MatchState {
    /// Lay out a fresh board: two home nodes followed by the neutral nodes
    pub fn new(
        id: MatchId,
        seed: u64,
        players: [PlayerTag; 2],
        settings: &GameSettings,
    ) -> Result<Self, PlacementError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let neutral_count = rng.gen_range(settings.neutral_nodes.clone()) as usize;

        let mut positions = Vec::with_capacity(PLAYER_NODE_IDS.len() + neutral_count);
        placement::place_many(
            &mut rng,
            &mut positions,
            PLAYER_NODE_IDS.len() + neutral_count,
            settings,
        )?;

        let mut nodes = Vec::with_capacity(positions.len());
        for (slot, tag) in players.iter().enumerate() {
            nodes.push(Node::owned(
                PLAYER_NODE_IDS[slot],
                positions[slot],
                PLAYER_START_UNITS,
                tag.clone(),
            ));
        }
        for (i, position) in positions[PLAYER_NODE_IDS.len()..].iter().enumerate() {
            let units = rng.gen_range(settings.neutral_units.clone());
            nodes.push(Node::neutral(format!("n{i}"), *position, units));
        }

        Ok(Self {
            id,
            players,
            nodes,
            streams: Vec::new(),
            production_ticks: 0,
            movement_ticks: 0,
            node_radius: settings.node_radius,
            movement: MovementParams::from_settings(settings),
            rng,
        })
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_index(&self, id: &str) -> Result<usize, AttackError> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| AttackError::UnknownNode(id.to_string()))
    }

    /// Validate an order against the identity of the player in `slot`
    pub fn handle_order(&mut self, slot: usize, order: &AttackOrder) -> Result<u32, AttackError> {
        let sender = self.players.get(slot).ok_or(AttackError::UnknownSession)?;
        if order.player_id != sender.player_id {
            return Err(AttackError::Impersonation {
                claimed: order.player_id.clone(),
                actual: sender.player_id.clone(),
            });
        }

        let player_id = sender.player_id.clone();
        self.submit_attack(&player_id, &order.source, &order.target, order.units)
    }

    /// Deduct `units` from `source_id` and launch them at `target_id` in
    /// waves. Returns the number of streams spawned. On error nothing changes.
    pub fn submit_attack(
        &mut self,
        player_id: &str,
        source_id: &str,
        target_id: &str,
        units: i64,
    ) -> Result<u32, AttackError> {
        let source_idx = self.node_index(source_id)?;
        let target_idx = self.node_index(target_id)?;
        let source = &self.nodes[source_idx];

        let owner = match source.owner.tag() {
            Some(tag) if tag.player_id == player_id => tag.clone(),
            _ => {
                return Err(AttackError::NotOwner {
                    node: source_id.to_string(),
                    player_id: player_id.to_string(),
                })
            }
        };

        if units <= 0 {
            return Err(AttackError::NonPositiveUnits(units));
        }
        let available = source.unit_count;
        let units = u32::try_from(units)
            .ok()
            .filter(|u| *u <= available)
            .ok_or(AttackError::InsufficientUnits {
                requested: units,
                available,
            })?;

        let origin = source.position;
        let target = self.nodes[target_idx].position;
        self.nodes[source_idx].unit_count -= units;
        self.spawn_waves(source_id, target_id, &owner, origin, target, units);

        Ok(units)
    }

    fn spawn_waves(
        &mut self,
        source_id: &str,
        target_id: &str,
        owner: &PlayerTag,
        origin: Position,
        target: Position,
        units: u32,
    ) {
        let destination = movement::edge_point(origin, target, self.node_radius);
        let normal = (destination - origin)
            .normalized()
            .map(Position::perpendicular)
            .unwrap_or_default();

        let mut remaining = units;
        let mut wave = 0u32;
        while remaining > 0 {
            let size = self.rng.gen_range(WAVE_SIZE).min(remaining);
            for _ in 0..size {
                let jitter = self.rng.gen_range(-MAX_JITTER..=MAX_JITTER);
                self.streams.push(UnitStream {
                    source_node_id: source_id.to_string(),
                    target_node_id: target_id.to_string(),
                    owner: owner.clone(),
                    unit_value: 1,
                    progress: 0.0,
                    wave_delay: wave as f32 * WAVE_DELAY_STEP,
                    origin,
                    destination,
                    offset: normal * jitter,
                });
            }
            remaining -= size;
            wave += 1;
        }
    }

    /// Slow cadence: every owned node gains one unit
    pub fn production_tick(&mut self) {
        self.production_ticks += 1;
        for node in &mut self.nodes {
            node.produce();
        }
    }

    /// Fast cadence: advance every stream and resolve the ones that arrive,
    /// in launch order. Returns the number of arrivals.
    pub fn movement_tick(&mut self) -> usize {
        self.movement_ticks += 1;

        let mut in_flight = Vec::with_capacity(self.streams.len());
        let mut arrivals = 0;

        for mut stream in std::mem::take(&mut self.streams) {
            if movement::advance(&mut stream, &self.movement) != Advance::Arrived {
                in_flight.push(stream);
                continue;
            }

            arrivals += 1;
            let Some(target) = self
                .nodes
                .iter_mut()
                .find(|n| n.id == stream.target_node_id)
            else {
                continue;
            };

            if combat::engage(&stream, target) == CombatOutcome::Captured {
                debug!(
                    match_id = %self.id,
                    node = %target.id,
                    player_id = %stream.owner.player_id,
                    "Node captured"
                );
            }
        }

        self.streams = in_flight;
        arrivals
    }

    pub fn evaluate(&self) -> Option<MatchOutcome> {
        victory::evaluate(&self.players, &self.nodes, &self.streams)
    }
}

/// Inbound work for a match actor
#[derive(Debug, Clone)]
pub enum MatchCommand {
    Attack {
        session_id: SessionId,
        order: AttackOrder,
    },
    Disconnect {
        session_id: SessionId,
    },
}

/// Why a match stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEnd {
    /// Decided on the board
    Decided(MatchOutcome),
    /// A session left; the other one (by slot) wins
    Forfeit { winner_slot: Option<usize> },
    /// Every command sender is gone
    Abandoned,
}

/// Handle to a running match
#[derive(Clone)]
pub struct MatchHandle {
    pub id: MatchId,
    pub command_tx: mpsc::Sender<MatchCommand>,
    pub sessions: [SessionId; 2],
}

impl MatchHandle {
    /// Forward a command; false when the match has already stopped
    pub async fn send(&self, command: MatchCommand) -> bool {
        self.command_tx.send(command).await.is_ok()
    }

    /// True once the match has decided its outcome and stopped taking commands
    pub fn is_finished(&self) -> bool {
        self.command_tx.is_closed()
    }
}

/// The authoritative game match
pub struct GameMatch {
    state: MatchState,
    broadcaster: Broadcaster,
    snapshot_builder: SnapshotBuilder,
    command_rx: mpsc::Receiver<MatchCommand>,
    production_period: Duration,
    movement_period: Duration,
}

impl GameMatch {
    /// Create a new match. `sessions` must be in the same slot order as
    /// `state.players`.
    pub fn new(
        state: MatchState,
        sessions: [Session; 2],
        settings: &GameSettings,
    ) -> (Self, MatchHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);

        let handle = MatchHandle {
            id: state.id,
            command_tx,
            sessions: [sessions[0].id, sessions[1].id],
        };

        let player_images: BTreeMap<String, String> = sessions
            .iter()
            .filter_map(|s| {
                s.profile
                    .selected_image
                    .clone()
                    .map(|image| (s.player_id().to_string(), image))
            })
            .collect();

        let game_match = Self {
            broadcaster: Broadcaster::new(state.id, sessions),
            snapshot_builder: SnapshotBuilder::new(player_images),
            state,
            command_rx,
            production_period: settings.production_period(),
            movement_period: settings.movement_period(),
        };

        (game_match, handle)
    }

    /// Run both tick loops until the match is decided or a player leaves.
    ///
    /// Commands, production and movement share one task, so they never
    /// interleave. Commands are polled first: an attack that is already
    /// queued when a movement tick comes due is applied before that tick.
    pub async fn run(mut self) -> MatchEnd {
        info!(
            match_id = %self.state.id,
            nodes = self.state.nodes.len(),
            "Match started"
        );

        self.broadcast_snapshot();

        let start = Instant::now();
        let mut production = interval_at(start + self.production_period, self.production_period);
        production.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut movement = interval_at(start + self.movement_period, self.movement_period);
        movement.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let end = loop {
            tokio::select! {
                biased;

                command = self.command_rx.recv() => match command {
                    Some(MatchCommand::Attack { session_id, order }) => {
                        self.handle_attack(session_id, &order);
                    }
                    Some(MatchCommand::Disconnect { session_id }) => {
                        break self.forfeit(session_id);
                    }
                    None => break MatchEnd::Abandoned,
                },

                _ = production.tick() => {
                    self.state.production_tick();
                    self.broadcast_snapshot();

                    if let Some(outcome) = self.state.evaluate() {
                        break self.finish(outcome);
                    }
                }

                _ = movement.tick() => {
                    self.state.movement_tick();
                    self.broadcast_snapshot();
                }
            }
        };

        info!(
            match_id = %self.state.id,
            production_ticks = self.state.production_ticks,
            movement_ticks = self.state.movement_ticks,
            end = ?end,
            "Match ended"
        );

        end
    }

    fn broadcast_snapshot(&self) {
        let snapshot = self
            .snapshot_builder
            .build(&self.state.nodes, &self.state.streams);
        self.broadcaster.send_all(&snapshot);
    }

    fn handle_attack(&mut self, session_id: SessionId, order: &AttackOrder) {
        let result = match self.broadcaster.slot_of(session_id) {
            Some(slot) => self.state.handle_order(slot, order),
            None => Err(AttackError::UnknownSession),
        };

        match result {
            Ok(units) => {
                debug!(
                    match_id = %self.state.id,
                    session_id = %session_id,
                    source = %order.source,
                    target = %order.target,
                    units,
                    "Attack launched"
                );
            }
            Err(e) => {
                warn!(
                    match_id = %self.state.id,
                    session_id = %session_id,
                    error = %e,
                    "Rejected attack"
                );
            }
        }
    }

    fn finish(&mut self, outcome: MatchOutcome) -> MatchEnd {
        // Closed before game_over goes out, so a client that reacts to it
        // already sees the match as finished.
        self.command_rx.close();

        let winner = match outcome {
            MatchOutcome::Winner(slot) => Some(self.state.players[slot].display_name.clone()),
            MatchOutcome::Draw => None,
        };

        info!(match_id = %self.state.id, winner = ?winner, "Match decided");
        self.broadcaster.send_all(&ServerMsg::GameOver { winner });
        MatchEnd::Decided(outcome)
    }

    fn forfeit(&mut self, session_id: SessionId) -> MatchEnd {
        self.command_rx.close();

        let leaving = self.broadcaster.slot_of(session_id);
        let winner_slot = leaving.map(|slot| 1 - slot);

        if let Some(slot) = winner_slot {
            let winner = self.broadcaster.sessions()[slot].display_name().to_string();
            info!(
                match_id = %self.state.id,
                session_id = %session_id,
                winner = %winner,
                "Player disconnected, opponent wins"
            );
            self.broadcaster.send_to(
                slot,
                ServerMsg::GameOver {
                    winner: Some(winner),
                },
            );
        }

        MatchEnd::Forfeit { winner_slot }
    }
}

/// Queued intents and their execution status, plus transient damage
/// notifications for a host UI.

use super::coordinate::Coordinate;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActionKind {
    Move,
    Attack,
    Climb,
    Wait,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActionStatus {
    Queued,
    Executing,
    Completed,
}

#[derive(Clone, Debug)]
pub struct Action {
    pub id: String,
    pub kind: ActionKind,
    pub unit_id: String,
    pub target_position: Option<Coordinate>,
    pub target_unit_id: Option<String>,
    pub cost: f64,
    pub status: ActionStatus,
}

impl Action {
    pub fn new(id: impl Into<String>, kind: ActionKind, unit_id: impl Into<String>, cost: f64) -> Self {
        Action {
            id: id.into(),
            kind,
            unit_id: unit_id.into(),
            target_position: None,
            target_unit_id: None,
            cost,
            status: ActionStatus::Queued,
        }
    }

    pub fn with_target_position(mut self, position: Coordinate) -> Self {
        self.target_position = Some(position);
        self
    }

    pub fn with_target_unit(mut self, unit_id: impl Into<String>) -> Self {
        self.target_unit_id = Some(unit_id.into());
        self
    }
}

/// A transient "you took damage here" notification for the host's UI.
/// The world doesn't evict it on its own — a host polls `is_expired`
/// against its configured TTL (or prunes explicitly via
/// `World::remove_damage_event`).
#[derive(Clone, Copy, Debug)]
pub struct DamageEvent {
    pub id: u64,
    pub position: Coordinate,
    pub amount: i64,
    pub timestamp: std::time::Instant,
}

impl DamageEvent {
    pub fn new(id: u64, position: Coordinate, amount: i64) -> Self {
        DamageEvent { id, position, amount, timestamp: std::time::Instant::now() }
    }

    /// Whether this event is older than `ttl`. The TTL is a config value
    /// (`SimConfig::damage_event_ttl_ms`, §6/§10.1), not a crate constant,
    /// so callers pass it in rather than relying on a baked-in default.
    pub fn is_expired(&self, ttl: std::time::Duration) -> bool {
        self.timestamp.elapsed() >= ttl
    }
}

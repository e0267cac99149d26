/// Units: players and enemies, their status block, and per-enemy AI memory.
///
/// Enemy-only fields live behind `AiMemory`, attached only when `kind ==
/// Kind::Enemy`, so a player unit can never carry stray AI state.

use super::coordinate::Coordinate;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Kind {
    Player,
    Enemy,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MovementMode {
    Run,
    Sneak,
}

/// Health/action-point block shared by every unit.
///
/// `ap`/`maxAp`/`apRecovery` are fractional (diagonal moves cost 1.5);
/// `hp`/`maxHp` are whole numbers of damage.
#[derive(Clone, Copy, Debug)]
pub struct UnitStatus {
    pub hp: i64,
    pub max_hp: i64,
    pub ap: f64,
    pub max_ap: f64,
    pub ap_recovery: f64,
    pub sight_range: i32,
    pub is_injured: bool,
    pub noise_level: Option<i32>,
    pub movement_mode: MovementMode,
}

impl UnitStatus {
    pub fn new(hp: i64, max_hp: i64, ap: f64, max_ap: f64, ap_recovery: f64, sight_range: i32, noise_level: Option<i32>) -> Self {
        let mut status = UnitStatus {
            hp,
            max_hp,
            ap,
            max_ap,
            ap_recovery,
            sight_range,
            is_injured: false,
            noise_level,
            movement_mode: MovementMode::Run,
        };
        status.recompute_injured();
        status
    }

    pub fn recompute_injured(&mut self) {
        self.is_injured = self.hp < self.max_hp / 2;
    }

    pub fn recover_ap(&mut self) {
        self.ap = (self.ap + self.ap_recovery).min(self.max_ap);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AiState {
    Sleep,
    Wander,
    Chase,
    Search,
}

/// Enemy-only perception/state-machine memory. See the planner in
/// `sim::ai` for how this gets driven each Execution phase.
#[derive(Clone, Copy, Debug)]
pub struct AiMemory {
    pub state: AiState,
    pub last_known_target_pos: Option<Coordinate>,
}

impl AiMemory {
    pub fn new() -> Self {
        AiMemory { state: AiState::Sleep, last_known_target_pos: None }
    }
}

impl Default for AiMemory {
    fn default() -> Self {
        AiMemory::new()
    }
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub id: String,
    pub kind: Kind,
    pub name: String,
    pub position: Coordinate,
    pub status: UnitStatus,
    pub facing: Facing,
    pub ai: Option<AiMemory>,
}

impl Unit {
    pub fn new_player(id: impl Into<String>, name: impl Into<String>, position: Coordinate) -> Self {
        Unit {
            id: id.into(),
            kind: Kind::Player,
            name: name.into(),
            position,
            status: UnitStatus::new(100, 100, 10.0, 10.0, 5.0, 10, Some(3)),
            facing: Facing::Down,
            ai: None,
        }
    }

    pub fn new_enemy(id: impl Into<String>, name: impl Into<String>, position: Coordinate) -> Self {
        Unit {
            id: id.into(),
            kind: Kind::Enemy,
            name: name.into(),
            position,
            status: UnitStatus::new(3, 3, 8.0, 8.0, 4.0, 7, None),
            facing: Facing::Down,
            ai: Some(AiMemory::new()),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status.hp > 0
    }
}

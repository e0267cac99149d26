/// `World`: the complete mutable snapshot of a running game — floors, the
/// unit map, the Decision/Execution phase, the queued-action list, vision
/// state, and transient damage notifications.
///
/// The only owning container here is the unit map; units and actions refer
/// to each other by id, never by reference, so nothing in this module is
/// self-referential. Every field mutation is funneled through the methods
/// below — no other path in the crate writes `World` fields directly.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::config::SimConfig;
use crate::domain::{Action, Coordinate, DamageEvent, Kind, MovementMode, Tile, Unit};
use crate::error::SimError;

use super::ai;
use super::fov;
use super::mapgen;
use super::pathfinding;
use super::prng::Prng;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Decision,
    Execution,
}

/// One W x H grid of tiles, indexed `[x][y]`. All floors in a `World` share
/// the same bounds, fixed at map generation.
#[derive(Clone, Debug)]
pub struct FloorData {
    pub index: usize,
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Vec<Tile>>,
}

impl FloorData {
    pub fn floor_index(&self) -> usize {
        self.index
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if self.in_bounds(x, y) {
            Some(&self.tiles[x as usize][y as usize])
        } else {
            None
        }
    }
}

pub struct World {
    pub floors: Vec<FloorData>,
    pub units: HashMap<String, Unit>,
    pub phase: Phase,
    /// Seconds remaining in the current Decision window.
    pub timer: f64,
    pub queue: Vec<Action>,
    pub seed: u32,
    /// Visible tiles from the player's current position (recomputed on
    /// every player position change).
    pub visible_tiles: HashSet<Coordinate>,
    /// Monotone union of every `visible_tiles` the player has ever had.
    pub explored_tiles: HashSet<Coordinate>,
    pub debug_fow: bool,
    pub damage_events: Vec<DamageEvent>,
    pub config: SimConfig,
    prng: Prng,
    next_damage_id: u64,
    next_ai_action_id: u64,
}

impl World {
    pub fn new(config: SimConfig) -> Self {
        let decision_timer_secs = config.decision_timer_secs;
        World {
            floors: vec![],
            units: HashMap::new(),
            phase: Phase::Decision,
            timer: decision_timer_secs,
            queue: vec![],
            seed: 0,
            visible_tiles: HashSet::new(),
            explored_tiles: HashSet::new(),
            debug_fow: false,
            damage_events: vec![],
            config,
            prng: Prng::new(0),
            next_damage_id: 0,
            next_ai_action_id: 0,
        }
    }

    // ── §4.7 World mutators ──

    /// Generates a fresh map, installs the player and enemies, recomputes
    /// the player's FOV/explored tiles from scratch, and restores every
    /// other field to its default. `seed` defaults to the system clock's
    /// low bits if omitted (see `default_seed`).
    pub fn init_game(&mut self, seed: Option<u32>) {
        let seed = seed.unwrap_or_else(default_seed);
        let mut prng = Prng::new(seed);
        let generated = mapgen::generate(&mut prng, &self.config);

        self.floors = generated.floors;
        self.units.clear();
        let player_id = generated.player.id.clone();
        self.units.insert(generated.player.id.clone(), generated.player);
        for enemy in generated.enemies {
            self.units.insert(enemy.id.clone(), enemy);
        }

        self.phase = Phase::Decision;
        self.timer = self.config.decision_timer_secs;
        self.queue.clear();
        self.damage_events.clear();
        self.seed = seed;
        self.prng = prng;
        self.visible_tiles.clear();
        self.explored_tiles.clear();
        self.next_damage_id = 0;
        self.next_ai_action_id = 0;

        self.recompute_player_fov(&player_id);
        info!(seed, enemy_count = self.units.len().saturating_sub(1), "game initialized");
    }

    /// On Decision entry, every unit recovers AP up to its max. On
    /// Execution entry, the AI planner runs once and its intents are
    /// queued (through `queue_action`, so AP is debited consistently with
    /// player-issued intents).
    pub fn set_phase(&mut self, phase: Phase) {
        match phase {
            Phase::Decision => {
                for unit in self.units.values_mut() {
                    unit.status.recover_ap();
                }
            }
            Phase::Execution => {
                let intents = ai::plan(&self.floors, &mut self.units, &self.queue, &self.config, &mut self.prng, &mut self.next_ai_action_id);
                for action in intents {
                    self.queue_action(action);
                }
            }
        }
        self.phase = phase;
    }

    /// Decision-phase-only countdown; clamped to zero.
    pub fn update_timer(&mut self, delta_secs: f64) {
        if self.phase != Phase::Decision {
            return;
        }
        self.timer = (self.timer - delta_secs).max(0.0);
    }

    /// Pre-debits the acting unit's AP (no clamping — callers must have
    /// already checked `ap >= cost`) and appends the action to the queue.
    pub fn queue_action(&mut self, action: Action) {
        if action.cost > 0.0 {
            if let Some(unit) = self.units.get_mut(&action.unit_id) {
                unit.status.ap -= action.cost;
            }
        }
        self.queue.push(action);
    }

    /// LIFO cancel: pops the last-queued action and refunds its cost.
    /// No-op on an empty queue.
    pub fn cancel_action(&mut self) {
        if let Some(action) = self.queue.pop() {
            if action.cost > 0.0 {
                if let Some(unit) = self.units.get_mut(&action.unit_id) {
                    unit.status.ap += action.cost;
                }
            }
        }
    }

    /// Empties the queue with no refunds — used only at Execution end.
    pub fn clear_action_queue(&mut self) {
        self.queue.clear();
    }

    /// Moves a unit and, if it's the player, recomputes FOV/explored tiles
    /// at the new position. A missing unit id is a silent no-op.
    pub fn update_unit_position(&mut self, id: &str, position: Coordinate) {
        let is_player = match self.units.get_mut(id) {
            Some(unit) => {
                unit.position = position;
                unit.kind == Kind::Player
            }
            None => return,
        };
        if is_player {
            self.recompute_player_fov(id);
        }
    }

    /// Applies an arbitrary field update to a unit's status in place.
    /// Missing unit id is a silent no-op.
    pub fn update_unit_status(&mut self, id: &str, f: impl FnOnce(&mut crate::domain::UnitStatus)) {
        if let Some(unit) = self.units.get_mut(id) {
            f(&mut unit.status);
            unit.status.recompute_injured();
        }
    }

    /// Subtracts `amount` from the unit's hp; removes and logs the unit on
    /// death, otherwise refreshes `is_injured`. Always appends a
    /// `DamageEvent` for the host UI, even on a killing blow.
    pub fn apply_damage(&mut self, id: &str, amount: i64) {
        let Some(unit) = self.units.get_mut(id) else { return };
        unit.status.hp -= amount;
        let position = unit.position;

        if unit.status.hp <= 0 {
            self.units.remove(id);
            info!(unit_id = id, ?position, "unit died");
        } else {
            unit.status.recompute_injured();
        }

        self.next_damage_id += 1;
        self.damage_events.push(DamageEvent::new(self.next_damage_id, position, amount));
    }

    /// UI-driven cleanup once a damage notification has been shown/expired.
    pub fn remove_damage_event(&mut self, id: u64) {
        self.damage_events.retain(|e| e.id != id);
    }

    /// Drops every damage event older than `config.damage_event_ttl_ms` —
    /// a host with no per-event dismissal UI can just call this on its own
    /// tick instead of tracking ids through `remove_damage_event`.
    pub fn prune_expired_damage_events(&mut self) {
        let ttl = std::time::Duration::from_millis(self.config.damage_event_ttl_ms);
        self.damage_events.retain(|e| !e.is_expired(ttl));
    }

    pub fn toggle_debug_fow(&mut self) {
        self.debug_fow = !self.debug_fow;
    }

    pub fn toggle_sneak(&mut self, id: &str) {
        if let Some(unit) = self.units.get_mut(id) {
            unit.status.movement_mode = match unit.status.movement_mode {
                MovementMode::Run => MovementMode::Sneak,
                MovementMode::Sneak => MovementMode::Run,
            };
        }
    }

    /// Ends an Execution phase: drains the queue, returns to Decision
    /// (regenerating AP), and restarts the timer.
    pub fn finish_execution(&mut self) {
        self.clear_action_queue();
        self.set_phase(Phase::Decision);
        self.timer = self.config.decision_timer_secs;
    }

    /// Fatal-only diagnostic, never called by the mutators above — they stay
    /// tolerant of bad input as the spec requires. Hosts feeding externally
    /// sourced coordinates (scripted tests, a future save format) into a
    /// mutator can check them here first; a negative component or an
    /// out-of-range floor index indicates a programming bug, not a normal
    /// policy rejection, so it surfaces as an `Err` rather than a silent
    /// no-op.
    pub fn validate_coordinate(&self, c: Coordinate) -> Result<(), SimError> {
        if c.x < 0 || c.y < 0 {
            return Err(SimError::InvalidCoordinate { x: c.x, y: c.y });
        }
        if c.floor >= self.floors.len() {
            return Err(SimError::InvalidFloorIndex(c.floor, self.floors.len()));
        }
        Ok(())
    }

    // ── Read-only queries also exposed to hosts (§6) ──

    pub fn find_path(&self, start: Coordinate, end: Coordinate, mover_id: &str) -> Option<Vec<Coordinate>> {
        pathfinding::find_path(start, end, &self.floors, &self.units, mover_id, &self.config)
    }

    pub fn calculate_fov(&self, origin: Coordinate, sight_range: i32) -> HashSet<Coordinate> {
        match self.floors.get(origin.floor) {
            Some(floor) => fov::compute(origin, sight_range, floor, &self.config),
            None => HashSet::new(),
        }
    }

    /// Tile keys considered visible by a renderer: every tile if
    /// `debug_fow` is set, otherwise the real `visible_tiles`. The true
    /// `visible_tiles` set is never altered by the debug flag.
    pub fn renderer_visible_tiles(&self) -> HashSet<Coordinate> {
        if !self.debug_fow {
            return self.visible_tiles.clone();
        }
        let mut all = HashSet::new();
        if let Some(floor) = self.units.get("player").and_then(|p| self.floors.get(p.position.floor)) {
            for column in &floor.tiles {
                for tile in column {
                    all.insert(tile.coordinate);
                }
            }
        }
        all
    }

    fn recompute_player_fov(&mut self, player_id: &str) {
        let Some(player) = self.units.get(player_id) else { return };
        let Some(floor) = self.floors.get(player.position.floor) else { return };
        let visible = fov::compute(player.position, player.status.sight_range, floor, &self.config);
        self.explored_tiles.extend(visible.iter().copied());
        self.visible_tiles = visible;
    }
}

fn default_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(1)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, ActionKind};

    fn world() -> World {
        let mut w = World::new(SimConfig::default());
        w.init_game(Some(42));
        w
    }

    #[test]
    fn init_game_spawns_player_at_plaza_center() {
        let w = world();
        let c = &w.config;
        let center = Coordinate::new(c.map_width as i32 / 2, c.map_height as i32 / 2, 0);
        assert_eq!(w.units.get("player").unwrap().position, center);
        assert!((3..=5).contains(&(w.units.len() - 1)));
    }

    #[test]
    fn init_game_twice_with_same_seed_is_deterministic() {
        let mut a = World::new(SimConfig::default());
        let mut b = World::new(SimConfig::default());
        a.init_game(Some(7));
        b.init_game(Some(7));
        assert_eq!(a.units.get("player").unwrap().position, b.units.get("player").unwrap().position);
        for id in a.units.keys() {
            assert_eq!(a.units[id].position, b.units[id].position);
        }
    }

    #[test]
    fn visible_tiles_always_contains_player_position() {
        let w = world();
        let player_pos = w.units.get("player").unwrap().position;
        assert!(w.visible_tiles.contains(&player_pos));
    }

    #[test]
    fn explored_tiles_is_superset_of_visible_tiles() {
        let w = world();
        assert!(w.explored_tiles.is_superset(&w.visible_tiles));
    }

    #[test]
    fn queue_then_cancel_is_a_no_op_on_ap_and_queue() {
        let mut w = world();
        let before_ap = w.units.get("player").unwrap().status.ap;
        w.queue_action(Action::new("a1", ActionKind::Move, "player", 1.0));
        assert_eq!(w.units.get("player").unwrap().status.ap, before_ap - 1.0);
        w.cancel_action();
        assert_eq!(w.units.get("player").unwrap().status.ap, before_ap);
        assert!(w.queue.is_empty());
    }

    #[test]
    fn cancel_action_on_empty_queue_is_a_no_op() {
        let mut w = world();
        w.cancel_action();
        assert!(w.queue.is_empty());
    }

    #[test]
    fn set_phase_decision_clamps_ap_to_max() {
        let mut w = world();
        let max_ap = w.units.get("player").unwrap().status.max_ap;
        w.update_unit_status("player", |s| s.ap = max_ap);
        w.set_phase(Phase::Decision);
        assert!(w.units.get("player").unwrap().status.ap <= max_ap);
    }

    #[test]
    fn apply_damage_then_heal_restores_hp_and_injured_flag() {
        let mut w = world();
        w.apply_damage("player", 60);
        assert!(w.units.get("player").unwrap().status.is_injured);
        w.update_unit_status("player", |s| s.hp += 60);
        assert!(!w.units.get("player").unwrap().status.is_injured);
        assert_eq!(w.units.get("player").unwrap().status.hp, 100);
    }

    #[test]
    fn apply_damage_removes_unit_on_death() {
        let mut w = world();
        let enemy_id = w.units.values().find(|u| u.kind == Kind::Enemy).unwrap().id.clone();
        w.apply_damage(&enemy_id, 3);
        assert!(!w.units.contains_key(&enemy_id));
        assert_eq!(w.damage_events.len(), 1);
    }

    #[test]
    fn prune_expired_damage_events_honors_configured_ttl() {
        let mut w = world();
        let enemy_id = w.units.values().find(|u| u.kind == Kind::Enemy).unwrap().id.clone();
        w.config.damage_event_ttl_ms = 0;
        w.apply_damage(&enemy_id, 1);
        assert_eq!(w.damage_events.len(), 1);
        w.prune_expired_damage_events();
        assert!(w.damage_events.is_empty());
    }

    #[test]
    fn toggle_sneak_flips_movement_mode() {
        let mut w = world();
        assert_eq!(w.units.get("player").unwrap().status.movement_mode, MovementMode::Run);
        w.toggle_sneak("player");
        assert_eq!(w.units.get("player").unwrap().status.movement_mode, MovementMode::Sneak);
        w.toggle_sneak("player");
        assert_eq!(w.units.get("player").unwrap().status.movement_mode, MovementMode::Run);
    }

    #[test]
    fn validate_coordinate_rejects_negative_xy_and_out_of_range_floor() {
        let w = world();
        assert!(w.validate_coordinate(Coordinate::new(-1, 0, 0)).is_err());
        assert!(w.validate_coordinate(Coordinate::new(0, -1, 0)).is_err());
        assert!(w.validate_coordinate(Coordinate::new(0, 0, 99)).is_err());
        assert!(w.validate_coordinate(Coordinate::new(0, 0, 0)).is_ok());
    }

    #[test]
    fn climb_updates_position_and_refreshes_fov() {
        let mut w = world();
        let player = w.units.get("player").unwrap();
        let target = Coordinate::new(player.position.x, player.position.y, 1);
        w.update_unit_position("player", target);
        assert_eq!(w.units.get("player").unwrap().position, target);
        assert!(w.visible_tiles.contains(&target));
    }
}

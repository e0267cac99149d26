/// Action Processor: drains a queue of planned intents against the live
/// `World`, re-checking collisions and ranges at execution time rather than
/// trusting whatever was true when the action was planned.
///
/// Exposed as a step-iterator rather than a single blocking call: `advance`
/// performs one action's worth of mutation (or, for a MOVE spanning several
/// waypoints, one waypoint's worth) and returns the `SimEvent`s it produced.
/// `run_to_completion` is a thin convenience wrapper that drains every step
/// synchronously, for callers — the test suite and the demo binary among
/// them — that don't care about per-step animation pacing.

use tracing::debug;

use crate::domain::{Action, ActionKind, Coordinate, Kind, TileType};

use super::event::SimEvent;
use super::world::World;

struct MoveState {
    unit_id: String,
    path: Vec<Coordinate>,
    waypoint_index: usize,
}

pub struct Processor {
    queue: Vec<Action>,
    cursor: usize,
    move_state: Option<MoveState>,
}

impl Processor {
    pub fn new(queue: Vec<Action>) -> Self {
        Processor { queue, cursor: 0, move_state: None }
    }

    pub fn is_finished(&self) -> bool {
        self.move_state.is_none() && self.cursor >= self.queue.len()
    }

    /// One discrete mutation against `world`. A no-op once `is_finished()`.
    pub fn advance(&mut self, world: &mut World) -> Vec<SimEvent> {
        if self.move_state.is_some() {
            return self.advance_move(world);
        }
        if self.cursor >= self.queue.len() {
            return vec![];
        }
        let action = self.queue[self.cursor].clone();
        self.cursor += 1;
        match action.kind {
            ActionKind::Move => self.begin_move(world, action),
            ActionKind::Attack => self.execute_attack(world, &action),
            ActionKind::Climb => self.execute_climb(world, &action),
            ActionKind::Wait => vec![],
        }
    }

    /// Drains every remaining step, then ends the Execution phase: clears
    /// the queue, returns to Decision, and resets the timer.
    pub fn run_to_completion(&mut self, world: &mut World) -> Vec<SimEvent> {
        let mut events = Vec::new();
        while !self.is_finished() {
            events.extend(self.advance(world));
        }
        world.finish_execution();
        events
    }

    fn begin_move(&mut self, world: &mut World, action: Action) -> Vec<SimEvent> {
        let Some(unit) = world.units.get(&action.unit_id) else { return vec![] };
        let start = unit.position;
        let Some(target) = action.target_position else { return vec![] };

        let Some(path) = world.find_path(start, target, &action.unit_id) else {
            debug!(unit_id = %action.unit_id, "move aborted: no path to target at execution time");
            return vec![];
        };
        if path.len() <= 1 {
            return vec![];
        }

        self.move_state = Some(MoveState { unit_id: action.unit_id, path, waypoint_index: 1 });
        self.advance_move(world)
    }

    /// Commits exactly one waypoint of the in-progress MOVE, re-checking
    /// occupancy against the live unit map (not the snapshot the path was
    /// planned against).
    fn advance_move(&mut self, world: &mut World) -> Vec<SimEvent> {
        let Some(state) = &self.move_state else { return vec![] };
        let waypoint = state.path[state.waypoint_index];
        let is_final = state.waypoint_index == state.path.len() - 1;
        let next_index = state.waypoint_index + 1;
        let path_len = state.path.len();
        let mover_id = state.unit_id.clone();

        let mover_kind = world.units.get(&mover_id).map(|u| u.kind);
        let occupant = world.units.values().find(|u| u.id != mover_id && u.position == waypoint).map(|u| u.kind);

        let blocked = match occupant {
            None => false,
            Some(_) if is_final => true,
            Some(Kind::Enemy) if mover_kind == Some(Kind::Player) => false,
            Some(_) => true,
        };

        if blocked {
            self.move_state = None;
            debug!(unit_id = %mover_id, ?waypoint, "move stopped short: waypoint occupied");
            return vec![SimEvent::ActionBlocked { unit_id: mover_id, action_kind: ActionKind::Move }];
        }

        world.update_unit_position(&mover_id, waypoint);
        if next_index >= path_len {
            self.move_state = None;
        } else {
            self.move_state.as_mut().unwrap().waypoint_index = next_index;
        }

        vec![SimEvent::UnitMoved { unit_id: mover_id, position: waypoint }]
    }

    fn execute_attack(&mut self, world: &mut World, action: &Action) -> Vec<SimEvent> {
        let Some(target_id) = action.target_unit_id.clone() else { return vec![] };

        let in_range = match (world.units.get(&action.unit_id), world.units.get(&target_id)) {
            (Some(attacker), Some(target)) => {
                attacker.is_alive()
                    && target.is_alive()
                    && attacker.position.floor == target.position.floor
                    && attacker.position.manhattan(&target.position) <= 1
            }
            _ => false,
        };
        if !in_range {
            debug!(unit_id = %action.unit_id, target_id = %target_id, "attack skipped: out of range or dead");
            return vec![];
        }

        let position = world.units[&target_id].position;
        let damage = world.config.attack_damage;
        world.apply_damage(&target_id, damage);

        let mut events = vec![SimEvent::UnitDamaged { unit_id: target_id.clone(), amount: damage, position }];
        if !world.units.contains_key(&target_id) {
            events.push(SimEvent::UnitDied { unit_id: target_id, position });
        }
        events
    }

    fn execute_climb(&mut self, world: &mut World, action: &Action) -> Vec<SimEvent> {
        let Some(unit) = world.units.get(&action.unit_id) else { return vec![] };
        let position = unit.position;
        let Some(tile) = world.floors.get(position.floor).and_then(|f| f.tile(position.x, position.y)) else { return vec![] };

        let delta: i32 = match tile.tile_type {
            TileType::StairsUp => 1,
            TileType::StairsDown => -1,
            _ => {
                debug!(unit_id = %action.unit_id, "climb skipped: not standing on stairs");
                return vec![];
            }
        };

        let target_floor = position.floor as i32 + delta;
        if target_floor < 0 || target_floor as usize >= world.floors.len() {
            debug!(unit_id = %action.unit_id, target_floor, "climb skipped: destination floor out of range");
            return vec![];
        }

        let target = Coordinate::new(position.x, position.y, target_floor as usize);
        world.update_unit_position(&action.unit_id, target);
        vec![SimEvent::UnitClimbed { unit_id: action.unit_id.clone(), position: target }]
    }
}

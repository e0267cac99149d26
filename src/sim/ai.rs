/// Per-enemy perception, state machine, and destination planning. Runs
/// once at the start of Execution, before the action processor, and emits
/// a flat list of intents for the caller to queue (through
/// `World::queue_action`, so AP debiting stays consistent with
/// player-issued intents — this module never mutates `ap` itself).

use std::collections::{HashMap, HashSet};

use crate::config::SimConfig;
use crate::domain::{Action, ActionKind, AiState, Coordinate, Kind, Unit};

use super::pathfinding;
use super::prng::Prng;
use super::world::FloorData;

const WANDER_ATTEMPTS: u32 = 3;
const RESERVATION_MAX_RING: i32 = 2;
const ATTACK_RANGE: i32 = 1;

/// Read-only snapshot of a unit, taken before any mutation this planning
/// pass, so that later per-enemy mutable borrows of `units` never need to
/// coexist with a borrow of another entry.
#[derive(Clone, Copy)]
struct UnitSnapshot {
    kind: Kind,
    position: Coordinate,
    hp: i64,
    noise_level: Option<i32>,
}

pub fn plan(
    floors: &[FloorData],
    units: &mut HashMap<String, Unit>,
    queue: &[Action],
    config: &SimConfig,
    prng: &mut Prng,
    next_action_id: &mut u64,
) -> Vec<Action> {
    let snapshot: HashMap<String, UnitSnapshot> = units
        .iter()
        .map(|(id, u)| {
            (
                id.clone(),
                UnitSnapshot { kind: u.kind, position: u.position, hp: u.status.hp, noise_level: u.status.noise_level },
            )
        })
        .collect();

    let mut reserved: HashSet<Coordinate> = snapshot.values().filter(|s| s.kind == Kind::Player).map(|s| s.position).collect();

    let mut enemy_ids: Vec<String> = units.values().filter(|u| u.kind == Kind::Enemy && u.is_alive()).map(|u| u.id.clone()).collect();
    enemy_ids.sort();

    let mut intents = Vec::new();
    for enemy_id in enemy_ids {
        plan_one(&enemy_id, floors, units, &snapshot, queue, config, prng, &mut reserved, &mut intents, next_action_id);
    }
    intents
}

#[allow(clippy::too_many_arguments)]
fn plan_one(
    enemy_id: &str,
    floors: &[FloorData],
    units: &mut HashMap<String, Unit>,
    snapshot: &HashMap<String, UnitSnapshot>,
    queue: &[Action],
    config: &SimConfig,
    prng: &mut Prng,
    reserved: &mut HashSet<Coordinate>,
    intents: &mut Vec<Action>,
    next_action_id: &mut u64,
) {
    let Some(enemy) = units.get(enemy_id) else { return };
    let enemy_pos = enemy.position;
    let enemy_floor = enemy_pos.floor;
    let enemy_sight = enemy.status.sight_range;
    let enemy_ap = enemy.status.ap;

    // 1. Target selection: nearest PLAYER on the same floor.
    let Some((target_id, target_pos, target_noise)) = snapshot
        .iter()
        .filter(|(id, s)| s.kind == Kind::Player && s.hp > 0 && s.position.floor == enemy_floor && id.as_str() != enemy_id)
        .min_by_key(|(_, s)| s.position.manhattan(&enemy_pos))
        .map(|(id, s)| (id.clone(), s.position, s.noise_level))
    else {
        return;
    };

    // 2. Prediction: where the player's queued MOVE (if any) would land.
    let predicted = queue
        .iter()
        .find(|a| a.unit_id == target_id && a.kind == ActionKind::Move)
        .and_then(|a| a.target_position)
        .filter(|t| !snapshot.iter().any(|(id, s)| id != &target_id && s.hp > 0 && s.position == *t))
        .unwrap_or(target_pos);

    let current_dist = enemy_pos.manhattan(&target_pos);
    let noise_level = target_noise.unwrap_or(config.default_noise_level);

    // 3, 4, 5: wake-up, sensors, state transitions. Scoped tightly so the
    // mutable borrow of `units` ends before the pathfinding call below.
    let (state, last_known) = {
        let Some(enemy) = units.get_mut(enemy_id) else { return };
        let hp = enemy.status.hp;
        let max_hp = enemy.status.max_hp;
        let Some(mem) = enemy.ai.as_mut() else { return };

        if mem.state == AiState::Sleep && hp < max_hp {
            mem.state = AiState::Wander;
        }

        let is_visible = current_dist <= enemy_sight && mem.state != AiState::Sleep;
        let is_audible = current_dist <= noise_level;
        let is_detected = is_visible || is_audible;

        if is_detected {
            mem.last_known_target_pos = Some(predicted);
            mem.state = AiState::Chase;
        } else if mem.state == AiState::Chase {
            mem.state = AiState::Search;
        } else if mem.state == AiState::Search {
            if let Some(last) = mem.last_known_target_pos {
                if last.x == enemy_pos.x && last.y == enemy_pos.y {
                    mem.last_known_target_pos = None;
                    mem.state = AiState::Wander;
                }
            }
        }

        (mem.state, mem.last_known_target_pos)
    };

    // 6. Attack priority.
    let dist_to_predicted = enemy_pos.manhattan(&predicted);
    if current_dist == ATTACK_RANGE && enemy_ap >= config.attack_cost && dist_to_predicted <= ATTACK_RANGE {
        intents.push(make_attack(enemy_id, &target_id, config, next_action_id));
        return;
    }

    // 7. Destination choice.
    let dest = match state {
        AiState::Chase | AiState::Search => last_known,
        AiState::Wander => {
            choose_wander_delta(enemy_pos, floors, enemy_floor, prng).map(|(dx, dy)| Coordinate::new(enemy_pos.x + dx, enemy_pos.y + dy, enemy_floor))
        }
        AiState::Sleep => None,
    };
    let Some(dest) = dest else { return };

    // 8. Reservation via spiral fallback.
    let Some(valid_dest) = reserve_destination(dest, floors, enemy_floor, reserved) else { return };
    reserved.insert(valid_dest);

    // 9. Path and step-budgeting.
    let Some(path) = pathfinding::find_path(enemy_pos, valid_dest, floors, units, enemy_id, config) else { return };
    let (actual_dest, cost_accumulated, reach_index) = budget_path(&path, enemy_pos, enemy_ap, target_pos, config.diagonal_cost);

    // 10. Emit MOVE.
    if reach_index > 0 && actual_dest != enemy_pos {
        intents.push(make_move(enemy_id, actual_dest, cost_accumulated, next_action_id));
    }

    // 11. Combo attack.
    if (enemy_ap - cost_accumulated) >= config.attack_cost && actual_dest.manhattan(&predicted) <= ATTACK_RANGE {
        intents.push(make_attack(enemy_id, &target_id, config, next_action_id));
    }
}

/// Up to `WANDER_ATTEMPTS` random deltas in {-1,0,1}^2 (excluding (0,0)),
/// drawn from the seeded PRNG so WANDER stays deterministic for a given
/// seed and tick schedule. First in-bounds, walkable candidate wins.
fn choose_wander_delta(pos: Coordinate, floors: &[FloorData], floor_idx: usize, prng: &mut Prng) -> Option<(i32, i32)> {
    let floor = floors.get(floor_idx)?;
    for _ in 0..WANDER_ATTEMPTS {
        let dx = prng.range(-1, 1);
        let dy = prng.range(-1, 1);
        if dx == 0 && dy == 0 {
            continue;
        }
        if let Some(tile) = floor.tile(pos.x + dx, pos.y + dy) {
            if tile.is_walkable() {
                return Some((dx, dy));
            }
        }
    }
    None
}

fn ring_offsets(radius: i32) -> Vec<(i32, i32)> {
    if radius == 0 {
        return vec![(0, 0)];
    }
    let mut offsets = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            if dx.abs().max(dy.abs()) == radius {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Smallest spiral ring (radius 0..=2) around `dest` whose first in-bounds
/// walkable tile isn't already reserved by an earlier enemy this pass.
fn reserve_destination(dest: Coordinate, floors: &[FloorData], floor_idx: usize, reserved: &HashSet<Coordinate>) -> Option<Coordinate> {
    let floor = floors.get(floor_idx)?;
    for radius in 0..=RESERVATION_MAX_RING {
        for (dx, dy) in ring_offsets(radius) {
            let x = dest.x + dx;
            let y = dest.y + dy;
            if let Some(tile) = floor.tile(x, y) {
                if tile.is_walkable() {
                    let candidate = Coordinate::new(x, y, floor_idx);
                    if !reserved.contains(&candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
    }
    None
}

/// Walks `path` from its start, accumulating step costs against `ap`, and
/// stops either when the next step would cross the target's current
/// position or when AP is exhausted. Returns (actualDest, costAccumulated,
/// reachIndex).
fn budget_path(path: &[Coordinate], start: Coordinate, ap: f64, target_pos: Coordinate, diagonal_cost: f64) -> (Coordinate, f64, usize) {
    let mut cost_accumulated = 0.0;
    let mut actual_dest = start;
    let mut reach_index = 0;

    for (i, step) in path.iter().enumerate().skip(1) {
        if step.x == target_pos.x && step.y == target_pos.y {
            break;
        }
        let prev = path[i - 1];
        let dx = (step.x - prev.x).abs();
        let dy = (step.y - prev.y).abs();
        let next_step_cost = if dx != 0 && dy != 0 { diagonal_cost } else { 1.0 };
        if ap < cost_accumulated + next_step_cost {
            break;
        }
        cost_accumulated += next_step_cost;
        actual_dest = *step;
        reach_index = i;
    }

    (actual_dest, cost_accumulated, reach_index)
}

fn make_move(unit_id: &str, target: Coordinate, cost: f64, next_id: &mut u64) -> Action {
    let id = format!("ai-move-{next_id}");
    *next_id += 1;
    Action::new(id, ActionKind::Move, unit_id, cost).with_target_position(target)
}

fn make_attack(unit_id: &str, target_unit_id: &str, config: &SimConfig, next_id: &mut u64) -> Action {
    let id = format!("ai-attack-{next_id}");
    *next_id += 1;
    Action::new(id, ActionKind::Attack, unit_id, config.attack_cost).with_target_unit(target_unit_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Tile, TileType, Unit};

    fn open_floor(width: usize, height: usize) -> FloorData {
        let tiles = (0..width)
            .map(|x| (0..height).map(|y| Tile::new(Coordinate::new(x as i32, y as i32, 0), TileType::Concrete)).collect())
            .collect();
        FloorData { index: 0, width, height, tiles }
    }

    #[test]
    fn sleeping_enemy_far_from_player_emits_nothing() {
        let floor = open_floor(20, 20);
        let mut units = HashMap::new();
        let player = Unit::new_player("player", "Player", Coordinate::new(0, 0, 0));
        let enemy = Unit::new_enemy("enemy-0", "Enemy", Coordinate::new(19, 19, 0));
        units.insert(player.id.clone(), player);
        units.insert(enemy.id.clone(), enemy);
        let mut prng = Prng::new(1);
        let mut next_id = 0;
        let intents = plan(&[floor], &mut units, &[], &SimConfig::default(), &mut prng, &mut next_id);
        assert!(intents.is_empty());
        assert_eq!(units["enemy-0"].ai.unwrap().state, AiState::Sleep);
    }

    #[test]
    fn adjacent_enemy_with_enough_ap_attacks_immediately() {
        let floor = open_floor(10, 10);
        let mut units = HashMap::new();
        let player = Unit::new_player("player", "Player", Coordinate::new(5, 5, 0));
        let mut enemy = Unit::new_enemy("enemy-0", "Enemy", Coordinate::new(6, 5, 0));
        enemy.ai.as_mut().unwrap().state = AiState::Wander;
        units.insert(player.id.clone(), player);
        units.insert(enemy.id.clone(), enemy);
        let mut prng = Prng::new(1);
        let mut next_id = 0;
        let intents = plan(&[floor], &mut units, &[], &SimConfig::default(), &mut prng, &mut next_id);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].kind, ActionKind::Attack);
        assert_eq!(intents[0].target_unit_id.as_deref(), Some("player"));
        assert_eq!(units["enemy-0"].ai.unwrap().state, AiState::Chase);
    }

    #[test]
    fn detected_enemy_chases_toward_player() {
        let floor = open_floor(20, 20);
        let mut units = HashMap::new();
        let player = Unit::new_player("player", "Player", Coordinate::new(10, 10, 0));
        let mut enemy = Unit::new_enemy("enemy-0", "Enemy", Coordinate::new(5, 10, 0));
        enemy.ai.as_mut().unwrap().state = AiState::Wander;
        units.insert(player.id.clone(), player);
        units.insert(enemy.id.clone(), enemy);
        let mut prng = Prng::new(1);
        let mut next_id = 0;
        let intents = plan(&[floor], &mut units, &[], &SimConfig::default(), &mut prng, &mut next_id);
        assert!(!intents.is_empty());
        assert_eq!(intents[0].kind, ActionKind::Move);
        assert_eq!(units["enemy-0"].ai.unwrap().state, AiState::Chase);
    }

    #[test]
    fn reservation_prevents_two_enemies_choosing_same_tile() {
        let floor = open_floor(20, 20);
        let mut units = HashMap::new();
        let player = Unit::new_player("player", "Player", Coordinate::new(10, 10, 0));
        let mut e0 = Unit::new_enemy("enemy-0", "E0", Coordinate::new(9, 10, 0));
        let mut e1 = Unit::new_enemy("enemy-1", "E1", Coordinate::new(11, 10, 0));
        e0.ai.as_mut().unwrap().state = AiState::Chase;
        e0.ai.as_mut().unwrap().last_known_target_pos = Some(Coordinate::new(10, 10, 0));
        e1.ai.as_mut().unwrap().state = AiState::Chase;
        e1.ai.as_mut().unwrap().last_known_target_pos = Some(Coordinate::new(10, 10, 0));
        units.insert(player.id.clone(), player);
        units.insert(e0.id.clone(), e0);
        units.insert(e1.id.clone(), e1);
        let mut prng = Prng::new(1);
        let mut next_id = 0;
        let intents = plan(&[floor], &mut units, &[], &SimConfig::default(), &mut prng, &mut next_id);
        let move_targets: Vec<Coordinate> = intents.iter().filter(|a| a.kind == ActionKind::Move).filter_map(|a| a.target_position).collect();
        if move_targets.len() == 2 {
            assert_ne!(move_targets[0], move_targets[1]);
        }
    }

    #[test]
    fn search_state_returns_to_wander_at_last_known_position() {
        let floor = open_floor(20, 20);
        let mut units = HashMap::new();
        let player = Unit::new_player("player", "Player", Coordinate::new(19, 19, 0));
        let mut enemy = Unit::new_enemy("enemy-0", "Enemy", Coordinate::new(5, 5, 0));
        enemy.ai.as_mut().unwrap().state = AiState::Search;
        enemy.ai.as_mut().unwrap().last_known_target_pos = Some(Coordinate::new(5, 5, 0));
        units.insert(player.id.clone(), player);
        units.insert(enemy.id.clone(), enemy);
        let mut prng = Prng::new(1);
        let mut next_id = 0;
        let _ = plan(&[floor], &mut units, &[], &SimConfig::default(), &mut prng, &mut next_id);
        let mem = units["enemy-0"].ai.unwrap();
        assert_eq!(mem.state, AiState::Wander);
        assert!(mem.last_known_target_pos.is_none());
    }
}

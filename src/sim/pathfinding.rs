/// Weighted 8-directional A* over a single floor, honoring static walls and
/// dynamic unit occupancy with faction-dependent pass-through cost.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::config::SimConfig;
use crate::domain::{Coordinate, Kind, Unit};

use super::world::FloorData;

const DIRS8: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

#[derive(Debug)]
struct OpenEntry {
    f: f64,
    seq: u64,
    x: i32,
    y: i32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}
impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    /// `BinaryHeap` is a max-heap; we want the lowest `f` popped first, and
    /// among ties the earliest-inserted (lowest `seq`) popped first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn octile_heuristic(dx: i32, dy: i32) -> f64 {
    let dx = dx.unsigned_abs() as f64;
    let dy = dy.unsigned_abs() as f64;
    (dx + dy) - 0.5 * dx.min(dy)
}

fn step_cost(dx: i32, dy: i32, diagonal_cost: f64) -> f64 {
    if dx != 0 && dy != 0 { diagonal_cost } else { 1.0 }
}

fn occupant_kind_at(units: &HashMap<String, Unit>, mover_id: &str, coord: Coordinate) -> Option<Kind> {
    units.values().find(|u| u.id != mover_id && u.position == coord).map(|u| u.kind)
}

/// Finds a path from `start` to `end`, inclusive, on `start.floor`. Cross-
/// floor travel is not representable here — that only happens through the
/// CLIMB action. Returns `None` if `end` is out of bounds, statically
/// unwalkable, or unreachable given current dynamic occupancy.
pub fn find_path(
    start: Coordinate,
    end: Coordinate,
    floors: &[FloorData],
    units: &HashMap<String, Unit>,
    mover_id: &str,
    config: &SimConfig,
) -> Option<Vec<Coordinate>> {
    let floor = floors.get(start.floor)?;
    if !floor.in_bounds(start.x, start.y) {
        return None;
    }
    if !floor.in_bounds(end.x, end.y) {
        return None;
    }
    let end_tile = floor.tile(end.x, end.y)?;
    if !end_tile.is_walkable() {
        return None;
    }

    if start.x == end.x && start.y == end.y {
        return Some(vec![start]);
    }

    let mover_kind = units.get(mover_id).map(|u| u.kind);

    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;
    let mut g_scores: HashMap<(i32, i32), f64> = HashMap::new();
    let mut parents: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
    let mut closed: HashSet<(i32, i32)> = HashSet::new();

    g_scores.insert((start.x, start.y), 0.0);
    open.push(OpenEntry { f: octile_heuristic(end.x - start.x, end.y - start.y), seq, x: start.x, y: start.y });

    while let Some(current) = open.pop() {
        let ckey = (current.x, current.y);
        if closed.contains(&ckey) {
            continue;
        }
        if ckey == (end.x, end.y) {
            return Some(reconstruct_path(&parents, start, end));
        }
        closed.insert(ckey);
        let g_current = *g_scores.get(&ckey).unwrap_or(&f64::INFINITY);

        for &(dx, dy) in &DIRS8 {
            let nx = current.x + dx;
            let ny = current.y + dy;
            let nkey = (nx, ny);
            if closed.contains(&nkey) {
                continue;
            }
            let Some(tile) = floor.tile(nx, ny) else { continue };
            if !tile.is_walkable() {
                continue;
            }

            let is_goal = nx == end.x && ny == end.y;
            let occupant = occupant_kind_at(units, mover_id, Coordinate::new(nx, ny, start.floor));

            let step = match occupant {
                Some(_) if is_goal => continue, // cannot terminate on a unit
                Some(Kind::Enemy) if mover_kind == Some(Kind::Player) => config.pass_through_cost,
                Some(_) => continue, // blocked: any other faction combination
                None => step_cost(dx, dy, config.diagonal_cost),
            };

            let tentative_g = g_current + step;
            let existing = g_scores.get(&nkey).copied().unwrap_or(f64::INFINITY);
            if tentative_g < existing {
                g_scores.insert(nkey, tentative_g);
                parents.insert(nkey, ckey);
                seq += 1;
                let h = octile_heuristic(end.x - nx, end.y - ny);
                open.push(OpenEntry { f: tentative_g + h, seq, x: nx, y: ny });
            }
        }
    }

    None
}

fn reconstruct_path(parents: &HashMap<(i32, i32), (i32, i32)>, start: Coordinate, end: Coordinate) -> Vec<Coordinate> {
    let mut path = vec![(end.x, end.y)];
    let mut cur = (end.x, end.y);
    let start_key = (start.x, start.y);
    while cur != start_key {
        cur = parents[&cur];
        path.push(cur);
    }
    path.reverse();
    path.into_iter().map(|(x, y)| Coordinate::new(x, y, start.floor)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Tile, TileType, Unit};

    fn open_floor(width: usize, height: usize) -> FloorData {
        let tiles = (0..width)
            .map(|x| {
                (0..height)
                    .map(|y| Tile::new(Coordinate::new(x as i32, y as i32, 0), TileType::Concrete))
                    .collect()
            })
            .collect();
        FloorData { index: 0, width, height, tiles }
    }

    fn wall_at(floor: &mut FloorData, x: i32, y: i32) {
        floor.tiles[x as usize][y as usize] = Tile::new(Coordinate::new(x, y, 0), TileType::Wall);
    }

    #[test]
    fn straight_line_path_has_correct_endpoints() {
        let floor = open_floor(10, 10);
        let units = HashMap::new();
        let start = Coordinate::new(0, 0, 0);
        let end = Coordinate::new(4, 0, 0);
        let path = find_path(start, end, &[floor], &units, "mover", &SimConfig::default()).unwrap();
        assert_eq!(path.first().copied(), Some(start));
        assert_eq!(path.last().copied(), Some(end));
        for pair in path.windows(2) {
            let dx = (pair[1].x - pair[0].x).abs();
            let dy = (pair[1].y - pair[0].y).abs();
            assert!(dx <= 1 && dy <= 1 && (dx, dy) != (0, 0));
        }
    }

    #[test]
    fn path_to_own_tile_is_single_element() {
        let floor = open_floor(5, 5);
        let units = HashMap::new();
        let start = Coordinate::new(2, 2, 0);
        let path = find_path(start, start, &[floor], &units, "mover", &SimConfig::default()).unwrap();
        assert_eq!(path, vec![start]);
    }

    #[test]
    fn unreachable_end_behind_walls_returns_none() {
        let mut floor = open_floor(5, 5);
        for y in 0..5 {
            wall_at(&mut floor, 2, y);
        }
        let units = HashMap::new();
        let start = Coordinate::new(0, 0, 0);
        let end = Coordinate::new(4, 0, 0);
        assert!(find_path(start, end, &[floor], &units, "mover", &SimConfig::default()).is_none());
    }

    #[test]
    fn unwalkable_destination_fails_precondition() {
        let mut floor = open_floor(5, 5);
        wall_at(&mut floor, 3, 3);
        let units = HashMap::new();
        let start = Coordinate::new(0, 0, 0);
        let end = Coordinate::new(3, 3, 0);
        assert!(find_path(start, end, &[floor], &units, "mover", &SimConfig::default()).is_none());
    }

    #[test]
    fn cannot_terminate_on_an_occupied_tile() {
        let floor = open_floor(5, 5);
        let mut units = HashMap::new();
        let blocker = Unit::new_enemy("blocker", "Blocker", Coordinate::new(2, 0, 0));
        units.insert(blocker.id.clone(), blocker);
        let start = Coordinate::new(0, 0, 0);
        let end = Coordinate::new(2, 0, 0);
        assert!(find_path(start, end, &[floor], &units, "mover", &SimConfig::default()).is_none());
    }

    #[test]
    fn player_can_pass_through_enemy_at_elevated_cost() {
        let floor = open_floor(5, 1);
        let mut units = HashMap::new();
        let player = Unit::new_player("player", "Player", Coordinate::new(0, 0, 0));
        let enemy = Unit::new_enemy("enemy-1", "Enemy", Coordinate::new(1, 0, 0));
        units.insert(player.id.clone(), player);
        units.insert(enemy.id.clone(), enemy);
        let start = Coordinate::new(0, 0, 0);
        let end = Coordinate::new(2, 0, 0);
        let path = find_path(start, end, &[floor], &units, "player", &SimConfig::default()).unwrap();
        assert_eq!(path, vec![Coordinate::new(0, 0, 0), Coordinate::new(1, 0, 0), Coordinate::new(2, 0, 0)]);
    }

    #[test]
    fn enemy_cannot_pass_through_player() {
        let floor = open_floor(5, 1);
        let mut units = HashMap::new();
        let enemy = Unit::new_enemy("enemy-1", "Enemy", Coordinate::new(0, 0, 0));
        let player = Unit::new_player("player", "Player", Coordinate::new(1, 0, 0));
        units.insert(enemy.id.clone(), enemy);
        units.insert(player.id.clone(), player);
        let start = Coordinate::new(0, 0, 0);
        let end = Coordinate::new(2, 0, 0);
        assert!(find_path(start, end, &[floor], &units, "enemy-1", &SimConfig::default()).is_none());
    }
}

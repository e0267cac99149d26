/// Procedural floor generation: carve walls, force a safe spawn plaza, place
/// connecting stairs, and seed the player plus a handful of enemies.

use tracing::info;

use crate::config::SimConfig;
use crate::domain::{Coordinate, Tile, TileType, Unit};

use super::prng::Prng;
use super::world::FloorData;

const MAX_STAIR_ATTEMPTS: u32 = 1000;

pub struct GeneratedMap {
    pub floors: Vec<FloorData>,
    pub player: Unit,
    pub enemies: Vec<Unit>,
}

/// Builds `config.map_width` x `config.map_height` x `config.floor_count`
/// floors, a plaza, a pair of connecting stairs, and spawns the player plus
/// 3-5 enemies, all driven by `prng` so the same seed reproduces the same
/// map.
pub fn generate(prng: &mut Prng, config: &SimConfig) -> GeneratedMap {
    let width = config.map_width;
    let height = config.map_height;

    let mut floors: Vec<FloorData> = (0..config.floor_count)
        .map(|floor| generate_floor(prng, width, height, floor, config.wall_density))
        .collect();

    let plaza_center = (width as i32 / 2, height as i32 / 2);
    carve_plaza(&mut floors[0], plaza_center, width, height, config.plaza_size);

    let (sx, sy) = place_stairs(prng, &mut floors, width, height, plaza_center, config.stair_min_distance);

    let player_pos = Coordinate::new(plaza_center.0, plaza_center.1, 0);
    let player = Unit::new_player("player", "Player", player_pos);

    let enemy_count = config.enemy_count_min + prng.range(0, config.enemy_count_span);
    let enemies = spawn_enemies(
        prng,
        &floors[0],
        width,
        height,
        plaza_center,
        enemy_count as usize,
        config.enemy_spawn_min_distance,
    );

    info!(enemy_count = enemies.len(), stairs = ?(sx, sy), "generated map");

    GeneratedMap { floors, player, enemies }
}

fn generate_floor(prng: &mut Prng, width: usize, height: usize, floor: usize, wall_density: f64) -> FloorData {
    let mut tiles = Vec::with_capacity(width);
    for x in 0..width {
        let mut column = Vec::with_capacity(height);
        for y in 0..height {
            let tile_type = if prng.next() < wall_density { TileType::Wall } else { TileType::Concrete };
            column.push(Tile::new(Coordinate::new(x as i32, y as i32, floor), tile_type));
        }
        tiles.push(column);
    }
    FloorData { index: floor, width, height, tiles }
}

fn carve_plaza(floor: &mut FloorData, center: (i32, i32), width: usize, height: usize, plaza_size: i32) {
    let half = plaza_size / 2;
    for dx in -half..=half {
        for dy in -half..=half {
            let x = center.0 + dx;
            let y = center.1 + dy;
            if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
                continue;
            }
            floor.tiles[x as usize][y as usize] = Tile::new(Coordinate::new(x, y, floor.floor_index()), TileType::Concrete);
        }
    }
}

fn place_stairs(
    prng: &mut Prng,
    floors: &mut [FloorData],
    width: usize,
    height: usize,
    center: (i32, i32),
    min_distance: i32,
) -> (i32, i32) {
    let mut sx = 1;
    let mut sy = 1;
    for _ in 0..MAX_STAIR_ATTEMPTS {
        sx = prng.range(1, width as i32 - 2);
        sy = prng.range(1, height as i32 - 2);
        if (sx - center.0).abs().max((sy - center.1).abs()) >= min_distance {
            break;
        }
    }

    floors[0].tiles[sx as usize][sy as usize] = Tile::new(Coordinate::new(sx, sy, 0), TileType::StairsUp);
    if floors.len() > 1 {
        floors[1].tiles[sx as usize][sy as usize] = Tile::new(Coordinate::new(sx, sy, 1), TileType::StairsDown);
    }
    (sx, sy)
}

fn spawn_enemies(
    prng: &mut Prng,
    floor: &FloorData,
    width: usize,
    height: usize,
    plaza_center: (i32, i32),
    count: usize,
    min_distance: i32,
) -> Vec<Unit> {
    let mut enemies = Vec::with_capacity(count);
    let mut occupied: Vec<(i32, i32)> = Vec::with_capacity(count);
    let max_attempts = 100;

    for i in 0..count {
        let mut attempts = 0;
        loop {
            attempts += 1;
            if attempts > max_attempts {
                break;
            }
            let x = prng.range(0, width as i32 - 1);
            let y = prng.range(0, height as i32 - 1);
            let tile = &floor.tiles[x as usize][y as usize];
            let manhattan = (x - plaza_center.0).abs() + (y - plaza_center.1).abs();
            let taken = occupied.contains(&(x, y));
            if tile.is_walkable() && manhattan > min_distance && !taken {
                occupied.push((x, y));
                enemies.push(Unit::new_enemy(format!("enemy-{i}"), format!("Enemy {i}"), Coordinate::new(x, y, 0)));
                break;
            }
        }
    }
    enemies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    #[test]
    fn generated_map_has_requested_floor_count() {
        let mut prng = Prng::new(1);
        let map = generate(&mut prng, &cfg());
        assert_eq!(map.floors.len(), cfg().floor_count);
    }

    #[test]
    fn plaza_center_is_walkable_and_transparent() {
        let mut prng = Prng::new(2);
        let c = cfg();
        let map = generate(&mut prng, &c);
        let center = (c.map_width as i32 / 2, c.map_height as i32 / 2);
        let tile = &map.floors[0].tiles[center.0 as usize][center.1 as usize];
        assert!(tile.is_walkable());
        assert!(!tile.blocks_vision());
    }

    #[test]
    fn player_spawns_at_plaza_center() {
        let mut prng = Prng::new(42);
        let c = cfg();
        let map = generate(&mut prng, &c);
        let center = (c.map_width as i32 / 2, c.map_height as i32 / 2);
        assert_eq!(map.player.position, Coordinate::new(center.0, center.1, 0));
    }

    #[test]
    fn enemy_count_is_in_expected_range() {
        let mut prng = Prng::new(3);
        let map = generate(&mut prng, &cfg());
        assert!((3..=5).contains(&map.enemies.len()));
    }

    #[test]
    fn stairs_are_at_least_min_distance_from_plaza() {
        let mut prng = Prng::new(7);
        let c = cfg();
        let map = generate(&mut prng, &c);
        let center = (c.map_width as i32 / 2, c.map_height as i32 / 2);
        let mut found = None;
        for x in 0..c.map_width {
            for y in 0..c.map_height {
                if map.floors[0].tiles[x][y].tile_type == TileType::StairsUp {
                    found = Some((x as i32, y as i32));
                }
            }
        }
        let (sx, sy) = found.expect("stairs up must exist on floor 0");
        assert!((sx - center.0).abs().max((sy - center.1).abs()) >= c.stair_min_distance);
    }

    #[test]
    fn same_seed_produces_same_map() {
        let c = cfg();
        let mut p1 = Prng::new(99);
        let mut p2 = Prng::new(99);
        let m1 = generate(&mut p1, &c);
        let m2 = generate(&mut p2, &c);
        assert_eq!(m1.enemies.len(), m2.enemies.len());
        assert_eq!(m1.player.position, m2.player.position);
        for (e1, e2) in m1.enemies.iter().zip(m2.enemies.iter()) {
            assert_eq!(e1.position, e2.position);
        }
    }

    #[test]
    fn small_map_spawn_pressure_terminates_without_hanging() {
        let mut prng = Prng::new(5);
        let mut c = cfg();
        c.map_width = 5;
        c.map_height = 5;
        c.floor_count = 1;
        let map = generate(&mut prng, &c);
        assert!(map.enemies.len() <= 5);
    }
}

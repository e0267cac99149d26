/// Ray-cast field of view. Chosen over shadowcasting for simplicity and
/// symmetry with the source implementation this was distilled from: every
/// ray is independent, so occlusion is locally correct without needing a
/// recursive octant split. A partial recursive-shadowcasting variant was
/// also prototyped upstream but never shipped; this crate only implements
/// the ray-cast.

use std::collections::HashSet;

use crate::config::SimConfig;
use crate::domain::Coordinate;

use super::world::FloorData;

/// All tiles visible from `origin` on its own floor, within `sight_range`
/// tiles. Always includes `origin` itself. Ray angle/distance stepping is
/// driven by `config` so hosts can trade precision for cost.
pub fn compute(origin: Coordinate, sight_range: i32, floor: &FloorData, config: &SimConfig) -> HashSet<Coordinate> {
    let mut visible = HashSet::new();
    visible.insert(origin);

    let distance_step = config.fov_ray_step;
    let angle_step = config.fov_angle_step_degrees.max(1);
    let max_steps = (sight_range as f64 / distance_step).floor() as i32;
    let origin_x = origin.x as f64 + 0.5;
    let origin_y = origin.y as f64 + 0.5;

    let mut angle = 0;
    while angle < 360 {
        let radians = (angle as f64).to_radians();
        let (dx, dy) = (radians.cos(), radians.sin());

        for step in 1..=max_steps {
            let distance = step as f64 * distance_step;
            let px = origin_x + dx * distance;
            let py = origin_y + dy * distance;
            let tx = px.floor() as i32;
            let ty = py.floor() as i32;

            if tx < 0 || ty < 0 || tx as usize >= floor.width || ty as usize >= floor.height {
                break;
            }

            let tile = &floor.tiles[tx as usize][ty as usize];
            let coord = Coordinate::new(tx, ty, origin.floor);
            visible.insert(coord);

            if tile.blocks_vision() {
                break;
            }
        }

        angle += angle_step;
    }

    visible
}

/// The simulation proper: PRNG, map generation, field of view, pathfinding,
/// AI planning, the central `World`, and the action processor that drains
/// it. `domain` holds plain data; everything that reads or mutates that
/// data in a way the spec cares about lives here.

pub mod ai;
pub mod event;
pub mod fov;
pub mod mapgen;
pub mod pathfinding;
pub mod prng;
pub mod step;
pub mod world;

pub use event::SimEvent;
pub use mapgen::GeneratedMap;
pub use prng::Prng;
pub use step::Processor;
pub use world::{FloorData, Phase, World};

//! Deterministic plan-then-execute simulation core for a grid-based
//! tactics game: seeded map generation, ray-cast field of view, weighted
//! A* pathfinding over dynamic obstacles, an enemy perception/state-machine
//! planner, and the execution-phase resolver that drains queued intents
//! against a single mutable `World`.
//!
//! Rendering, input handling, and the wall-clock countdown timer are the
//! host's responsibility; this crate exposes the mutators and read-only
//! queries they call through (`World`, plus the free functions in `sim`).

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;

pub use config::SimConfig;
pub use domain::{
    Action, ActionKind, ActionStatus, AiMemory, AiState, Coordinate, DamageEvent, Facing, Kind,
    MovementMode, Tile, TileMetadata, TileType, Unit, UnitStatus,
};
pub use error::{SimError, SimResult};
pub use sim::{FloorData, Phase, Processor, SimEvent, World};

/// Plain data types shared across the simulation: coordinates, tiles,
/// units, and queued actions. No simulation logic lives here.

pub mod action;
pub mod coordinate;
pub mod tile;
pub mod unit;

pub use action::{Action, ActionKind, ActionStatus, DamageEvent};
pub use coordinate::Coordinate;
pub use tile::{Tile, TileMetadata, TileType};
pub use unit::{AiMemory, AiState, Facing, Kind, MovementMode, Unit, UnitStatus};

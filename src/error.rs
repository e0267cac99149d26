/// Fatal, programmer-bug-only error conditions.
///
/// Normal policy rejections (insufficient AP, no path found, out-of-bounds
/// lookups) are never represented here — those stay tolerant `Option`/`bool`
/// returns throughout `domain` and `sim`, exactly as the rest of the crate's
/// mutators are written. `SimError` exists only for states that should be
/// structurally unreachable: a corrupt floor index, a negative coordinate
/// escaping into map storage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("floor index {0} out of range (map has {1} floors)")]
    InvalidFloorIndex(usize, usize),

    #[error("coordinate ({x}, {y}) is negative or otherwise out of map storage range")]
    InvalidCoordinate { x: i32, y: i32 },

    #[error("config file at {0:?} could not be parsed: {1}")]
    ConfigParse(std::path::PathBuf, String),
}

pub type SimResult<T> = Result<T, SimError>;

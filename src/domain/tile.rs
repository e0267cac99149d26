/// Tile types and their properties.
///
/// Metadata is derived from the type at construction time rather than set
/// ad hoc, so the WALL/STAIRS invariants (opacity, walkable) can never be
/// expressed inconsistently.

use super::coordinate::Coordinate;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileType {
    Empty,
    Concrete,
    Mud,
    StairsUp,
    StairsDown,
    Wall,
}

impl TileType {
    pub fn is_stairs(self) -> bool {
        matches!(self, TileType::StairsUp | TileType::StairsDown)
    }
}

/// Numeric properties of a tile, derived from its `TileType`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileMetadata {
    /// Multiplier applied to a mover's noise radius when crossing this tile.
    pub noise_coefficient: f32,
    /// Relative weight used by rejection-sampling spawn placement.
    pub spawn_weight: f32,
    pub interactable: bool,
    /// 0.0 = fully transparent, 1.0 = fully opaque (blocks vision).
    pub opacity: f32,
    pub walkable: bool,
}

impl TileMetadata {
    fn for_type(tile_type: TileType) -> Self {
        match tile_type {
            TileType::Empty => TileMetadata {
                noise_coefficient: 1.0,
                spawn_weight: 1.0,
                interactable: false,
                opacity: 0.0,
                walkable: true,
            },
            TileType::Concrete => TileMetadata {
                noise_coefficient: 1.0,
                spawn_weight: 1.0,
                interactable: false,
                opacity: 0.0,
                walkable: true,
            },
            TileType::Mud => TileMetadata {
                noise_coefficient: 1.8,
                spawn_weight: 0.5,
                interactable: false,
                opacity: 0.0,
                walkable: true,
            },
            TileType::StairsUp | TileType::StairsDown => TileMetadata {
                noise_coefficient: 1.0,
                spawn_weight: 0.0,
                interactable: true,
                opacity: 0.0,
                walkable: true,
            },
            TileType::Wall => TileMetadata {
                noise_coefficient: 0.0,
                spawn_weight: 0.0,
                interactable: false,
                opacity: 1.0,
                walkable: false,
            },
        }
    }
}

/// A single map cell: where it is, what it is, and its derived properties.
#[derive(Clone, Copy, Debug)]
pub struct Tile {
    pub coordinate: Coordinate,
    pub tile_type: TileType,
    pub metadata: TileMetadata,
}

impl Tile {
    pub fn new(coordinate: Coordinate, tile_type: TileType) -> Self {
        let metadata = TileMetadata::for_type(tile_type);
        debug_assert!(
            tile_type != TileType::Wall || (metadata.opacity >= 1.0 && !metadata.walkable),
            "WALL tiles must be opaque and unwalkable"
        );
        debug_assert!(
            !tile_type.is_stairs() || (metadata.walkable && metadata.opacity == 0.0),
            "STAIRS tiles must be walkable and transparent"
        );
        Tile { coordinate, tile_type, metadata }
    }

    #[inline]
    pub fn is_walkable(&self) -> bool {
        self.metadata.walkable
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.metadata.opacity
    }

    #[inline]
    pub fn blocks_vision(&self) -> bool {
        self.metadata.opacity >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_is_opaque_and_unwalkable() {
        let t = Tile::new(Coordinate::new(0, 0, 0), TileType::Wall);
        assert!(!t.is_walkable());
        assert!(t.blocks_vision());
    }

    #[test]
    fn stairs_are_walkable_and_transparent() {
        let up = Tile::new(Coordinate::new(0, 0, 0), TileType::StairsUp);
        let down = Tile::new(Coordinate::new(0, 0, 1), TileType::StairsDown);
        assert!(up.is_walkable() && !up.blocks_vision());
        assert!(down.is_walkable() && !down.blocks_vision());
    }

    #[test]
    fn concrete_is_walkable_transparent() {
        let t = Tile::new(Coordinate::new(0, 0, 0), TileType::Concrete);
        assert!(t.is_walkable());
        assert!(!t.blocks_vision());
    }
}

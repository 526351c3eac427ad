//! Mutable world state derived from an immutable level definition.

use botquest_logic::actor::Actor;
use botquest_logic::grid::{tile_at, GridPos, Tile, TileKind};
use botquest_logic::interpret::TileMutation;
use botquest_logic::level::LevelDefinition;

/// Tiles plus actor — the combined mutable snapshot of a run.
///
/// Derived fresh from the level on run start, retry, stop, and level
/// select; any in-progress drift is discarded each time.
#[derive(Debug, Clone)]
pub struct WorldState {
    pub tiles: Vec<Tile>,
    pub actor: Actor,
    /// Instructions executed so far this run.
    pub steps: u32,
}

impl WorldState {
    /// Clone the level's tiles (doors forced closed) and reset the actor
    /// to the start pose.
    pub fn derive(level: &LevelDefinition) -> Self {
        let mut tiles = level.tiles.clone();
        for tile in &mut tiles {
            if tile.kind == TileKind::Door {
                tile.is_active = false;
            }
        }
        Self {
            tiles,
            actor: Actor::at_start(level.start_pos, level.start_dir),
            steps: 0,
        }
    }

    /// Apply one interpreter mutation to its tile.
    pub fn apply(&mut self, mutation: &TileMutation) {
        if let Some(tile) = self.tiles.iter_mut().find(|t| t.id == mutation.tile_id) {
            if let Some(kind) = mutation.kind {
                tile.kind = kind;
            }
            if let Some(active) = mutation.is_active {
                tile.is_active = active;
            }
        }
    }

    pub fn tile_at(&self, pos: GridPos) -> Option<&Tile> {
        tile_at(&self.tiles, pos)
    }
}

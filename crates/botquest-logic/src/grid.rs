//! Grid cells and tile kinds.
//!
//! Terrain answers "what IS this cell"; the interpreter decides what
//! happens when the actor lands on it. Walkability partitions the kinds:
//! floor-like tiles admit the actor, walls/pits never do, and a door
//! admits the actor only while it is active (open). Spikes are a special
//! case owned by the interpreter: entry is permitted, surviving is not.

use serde::{Deserialize, Serialize};

/// A cell coordinate. Signed so that out-of-bounds targets (one step past
/// an edge) are representable before validation rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: i16,
    pub col: i16,
}

impl GridPos {
    pub fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    /// The position `steps` cells away along `delta`.
    pub fn offset(self, delta: (i16, i16), steps: i16) -> Self {
        Self {
            row: self.row + delta.0 * steps,
            col: self.col + delta.1 * steps,
        }
    }
}

/// Every kind of cell a level can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Floor,
    Wall,
    Start,
    Goal,
    Coin,
    Gem,
    Button,
    Door,
    Spike,
    Pit,
    Empty,
}

/// One cell of a level. `pos` is unique within a level; `is_active` only
/// carries meaning for doors (open/closed) and defaults to closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub kind: TileKind,
    pub pos: GridPos,
    #[serde(default)]
    pub is_active: bool,
}

impl Tile {
    pub fn new(id: u32, kind: TileKind, pos: GridPos) -> Self {
        Self {
            id,
            kind,
            pos,
            is_active: false,
        }
    }

    /// Whether the actor may stand here. A door counts as walkable only
    /// while open. Spikes report non-walkable; the interpreter permits
    /// entry anyway and fails the step afterwards.
    pub fn is_walkable(&self) -> bool {
        match self.kind {
            TileKind::Floor
            | TileKind::Start
            | TileKind::Goal
            | TileKind::Coin
            | TileKind::Gem
            | TileKind::Button
            | TileKind::Empty => true,
            TileKind::Door => self.is_active,
            TileKind::Wall | TileKind::Spike | TileKind::Pit => false,
        }
    }
}

/// Find the tile at a position, if the level defines one there.
pub fn tile_at(tiles: &[Tile], pos: GridPos) -> Option<&Tile> {
    tiles.iter().find(|t| t.pos == pos)
}

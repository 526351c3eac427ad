//! Immutable level definitions — the input the catalog hands the engine.

use serde::{Deserialize, Serialize};

use crate::actor::Direction;
use crate::block::CommandKind;
use crate::grid::{GridPos, Tile, TileKind};

/// A level's win-condition policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalKind {
    ReachGoal,
    CollectAll,
    CollectAndReach,
}

/// Everything a level is: grid, tiles, start pose, vocabulary, budget,
/// goal. Read-only once loaded; the engine derives mutable world state
/// from it and never writes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub id: u32,
    pub name: String,
    /// 1–5, feeds the score base.
    pub difficulty: u8,
    pub rows: i16,
    pub cols: i16,
    pub tiles: Vec<Tile>,
    pub start_pos: GridPos,
    pub start_dir: Direction,
    pub allowed_commands: Vec<CommandKind>,
    pub max_blocks: usize,
    pub optimal_blocks: usize,
    pub goal: GoalKind,
    #[serde(default)]
    pub required_coins: Option<u32>,
    #[serde(default)]
    pub required_gems: Option<u32>,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl LevelDefinition {
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    /// Kind of the tile at (row, col), if the layout defines one.
    pub fn tile_kind_at(&self, row: i16, col: i16) -> Option<TileKind> {
        crate::grid::tile_at(&self.tiles, GridPos::new(row, col)).map(|t| t.kind)
    }

    /// Position of the goal tile, if the layout has one.
    pub fn goal_pos(&self) -> Option<GridPos> {
        self.tiles
            .iter()
            .find(|t| t.kind == TileKind::Goal)
            .map(|t| t.pos)
    }

    pub fn coin_total(&self) -> u32 {
        self.tiles.iter().filter(|t| t.kind == TileKind::Coin).count() as u32
    }

    pub fn gem_total(&self) -> u32 {
        self.tiles.iter().filter(|t| t.kind == TileKind::Gem).count() as u32
    }

    /// Coins needed for collect goals and the perfect rating. Defaults to
    /// every coin in the layout when the level sets no threshold.
    pub fn coins_required(&self) -> u32 {
        self.required_coins.unwrap_or_else(|| self.coin_total())
    }

    /// Gems needed for collect goals and the perfect rating.
    pub fn gems_required(&self) -> u32 {
        self.required_gems.unwrap_or_else(|| self.gem_total())
    }
}

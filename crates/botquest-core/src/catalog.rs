//! The level catalog — immutable level definitions parsed once from the
//! embedded JSON data file.
//!
//! Grids are authored as legend strings, one per row:
//!
//! ```text
//! .  floor      #  wall       S  start      G  goal
//! c  coin       g  gem        b  button     d  door
//! x  spike      p  pit        (space) empty
//! ```

use serde::Deserialize;

use botquest_logic::actor::Direction;
use botquest_logic::block::CommandKind;
use botquest_logic::grid::{GridPos, Tile, TileKind};
use botquest_logic::level::{GoalKind, LevelDefinition};

const LEVELS_JSON: &str = include_str!("../../../data/levels.json");

/// One level as authored in the data file.
#[derive(Debug, Deserialize)]
struct RawLevel {
    id: u32,
    name: String,
    difficulty: u8,
    grid: Vec<String>,
    start_dir: Direction,
    allowed_commands: Vec<CommandKind>,
    max_blocks: usize,
    optimal_blocks: usize,
    goal: GoalKind,
    #[serde(default)]
    required_coins: Option<u32>,
    #[serde(default)]
    required_gems: Option<u32>,
    #[serde(default)]
    hints: Vec<String>,
}

#[derive(Debug)]
pub enum CatalogError {
    Json(serde_json::Error),
    EmptyGrid { level: u32 },
    RaggedGrid { level: u32 },
    UnknownTile { level: u32, ch: char },
    MissingStart { level: u32 },
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Json(e) => write!(f, "catalog JSON error: {}", e),
            CatalogError::EmptyGrid { level } => write!(f, "level {} has an empty grid", level),
            CatalogError::RaggedGrid { level } => {
                write!(f, "level {} has rows of unequal length", level)
            }
            CatalogError::UnknownTile { level, ch } => {
                write!(f, "level {} uses unknown tile character {:?}", level, ch)
            }
            CatalogError::MissingStart { level } => {
                write!(f, "level {} has no start tile", level)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// The full, ordered level list. Unlock gating follows catalog order.
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalog {
    /// The catalog shipped with the game.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(LEVELS_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawLevel> = serde_json::from_str(json)?;
        let levels = raw.into_iter().map(parse_level).collect::<Result<_, _>>()?;
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    pub fn get(&self, id: u32) -> Option<&LevelDefinition> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Position of a level in catalog order.
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.levels.iter().position(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

fn parse_level(raw: RawLevel) -> Result<LevelDefinition, CatalogError> {
    let rows = raw.grid.len();
    if rows == 0 {
        return Err(CatalogError::EmptyGrid { level: raw.id });
    }
    let cols = raw.grid[0].chars().count();
    if cols == 0 {
        return Err(CatalogError::EmptyGrid { level: raw.id });
    }

    let mut tiles = Vec::with_capacity(rows * cols);
    let mut start_pos = None;
    let mut next_id = 0u32;

    for (row, line) in raw.grid.iter().enumerate() {
        if line.chars().count() != cols {
            return Err(CatalogError::RaggedGrid { level: raw.id });
        }
        for (col, ch) in line.chars().enumerate() {
            let pos = GridPos::new(row as i16, col as i16);
            let kind = match ch {
                '.' => TileKind::Floor,
                '#' => TileKind::Wall,
                'S' => {
                    start_pos = Some(pos);
                    TileKind::Start
                }
                'G' => TileKind::Goal,
                'c' => TileKind::Coin,
                'g' => TileKind::Gem,
                'b' => TileKind::Button,
                'd' => TileKind::Door,
                'x' => TileKind::Spike,
                'p' => TileKind::Pit,
                ' ' => TileKind::Empty,
                other => {
                    return Err(CatalogError::UnknownTile {
                        level: raw.id,
                        ch: other,
                    })
                }
            };
            tiles.push(Tile::new(next_id, kind, pos));
            next_id += 1;
        }
    }

    let start_pos = start_pos.ok_or(CatalogError::MissingStart { level: raw.id })?;

    Ok(LevelDefinition {
        id: raw.id,
        name: raw.name,
        difficulty: raw.difficulty,
        rows: rows as i16,
        cols: cols as i16,
        tiles,
        start_pos,
        start_dir: raw.start_dir,
        allowed_commands: raw.allowed_commands,
        max_blocks: raw.max_blocks,
        optimal_blocks: raw.optimal_blocks,
        goal: raw.goal,
        required_coins: raw.required_coins,
        required_gems: raw.required_gems,
        hints: raw.hints,
    })
}

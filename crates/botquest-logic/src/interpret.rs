//! The command interpreter — executes one instruction against a snapshot
//! of the world.
//!
//! [`execute`] is pure: it reads the actor and tiles, and returns a new
//! actor plus a list of tile mutations for the caller to apply. It never
//! touches shared state, so a step is atomic by construction and pausing
//! can only ever happen between instructions.
//!
//! A failed step ends the run. The outcome still carries the resulting
//! state (an actor that walked onto a spike is shown standing on it).

use crate::actor::{Actor, Direction};
use crate::block::{CommandBlock, CommandKind};
use crate::grid::{tile_at, Tile, TileKind};
use crate::level::LevelDefinition;

pub const MSG_OFF_GRID: &str = "You can't leave the grid!";
pub const MSG_BLOCKED: &str = "Bonk! Something is in the way!";
pub const MSG_SPIKE: &str = "Ouch! Hit a spike!";

/// A requested change to one tile. `None` fields are left as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileMutation {
    pub tile_id: u32,
    pub kind: Option<TileKind>,
    pub is_active: Option<bool>,
}

/// Result of executing one instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub actor: Actor,
    pub mutations: Vec<TileMutation>,
    pub message: String,
    pub success: bool,
}

impl StepOutcome {
    fn ok(actor: Actor, message: &str) -> Self {
        Self {
            actor,
            mutations: Vec::new(),
            message: message.to_string(),
            success: true,
        }
    }

    fn fail(actor: Actor, message: &str) -> Self {
        Self {
            actor,
            mutations: Vec::new(),
            message: message.to_string(),
            success: false,
        }
    }
}

/// The door a button or interact command operates on.
///
/// Currently: the first door-kind tile in the level, ignoring any
/// button→door linkage. Kept behind this one function so honoring a
/// linkage id later touches nothing else.
pub fn find_door(tiles: &[Tile]) -> Option<&Tile> {
    tiles.iter().find(|t| t.kind == TileKind::Door)
}

/// Execute one instruction. Dispatch is exhaustive over the command
/// vocabulary; control markers that survive linearization are no-ops.
pub fn execute(
    block: &CommandBlock,
    actor: &Actor,
    tiles: &[Tile],
    level: &LevelDefinition,
) -> StepOutcome {
    let mut actor = *actor;
    actor.is_moving = false;
    actor.is_jumping = false;

    match block.kind {
        CommandKind::MoveForward => try_move(actor, tiles, level, actor.dir, 1, "Moved forward!"),
        CommandKind::MoveBackward => try_move(
            actor,
            tiles,
            level,
            actor.dir.opposite(),
            1,
            "Moved backward!",
        ),
        CommandKind::Jump => try_jump(actor, tiles, level),
        CommandKind::TurnLeft => {
            actor.dir = actor.dir.turned_left();
            StepOutcome::ok(actor, "Turned left!")
        }
        CommandKind::TurnRight => {
            actor.dir = actor.dir.turned_right();
            StepOutcome::ok(actor, "Turned right!")
        }
        CommandKind::Wait => StepOutcome::ok(actor, "Waiting..."),
        CommandKind::Interact => interact(actor, tiles),
        // Control markers should not survive linearization; if one does,
        // it is a harmless no-op rather than an error.
        CommandKind::LoopStart
        | CommandKind::LoopEnd
        | CommandKind::IfStart
        | CommandKind::Else
        | CommandKind::IfEnd => StepOutcome::ok(actor, ""),
    }
}

/// Walk one cell along `dir`. The target must be in bounds and enterable;
/// a closed door blocks, an open one does not.
fn try_move(
    mut actor: Actor,
    tiles: &[Tile],
    level: &LevelDefinition,
    dir: Direction,
    steps: i16,
    success_message: &str,
) -> StepOutcome {
    let target = actor.pos.offset(dir.delta(), steps);
    if !level.in_bounds(target) {
        return StepOutcome::fail(actor, MSG_OFF_GRID);
    }
    let Some(tile) = tile_at(tiles, target) else {
        return StepOutcome::fail(actor, MSG_BLOCKED);
    };
    // Spikes admit the actor; the step then fails in landing resolution.
    if !tile.is_walkable() && tile.kind != TileKind::Spike {
        return StepOutcome::fail(actor, MSG_BLOCKED);
    }
    actor.pos = target;
    actor.is_moving = true;
    resolve_landing(actor, *tile, tiles, success_message)
}

/// Jump two cells ahead. Only the landing cell is validated — the hopped
/// cell is intentionally unchecked so a single obstacle can be cleared.
fn try_jump(actor: Actor, tiles: &[Tile], level: &LevelDefinition) -> StepOutcome {
    let mut outcome = try_move(actor, tiles, level, actor.dir, 2, "Jumped!");
    if outcome.actor.is_moving {
        outcome.actor.is_moving = false;
        outcome.actor.is_jumping = true;
    }
    outcome
}

/// What happens on the cell the actor just entered: collect, crash, or
/// press.
fn resolve_landing(
    mut actor: Actor,
    tile: Tile,
    tiles: &[Tile],
    success_message: &str,
) -> StepOutcome {
    match tile.kind {
        TileKind::Coin => {
            actor.coins += 1;
            let mut outcome = StepOutcome::ok(actor, "You got a coin!");
            outcome.mutations.push(consume(tile.id));
            outcome
        }
        TileKind::Gem => {
            actor.gems += 1;
            let mut outcome = StepOutcome::ok(actor, "You got a gem!");
            outcome.mutations.push(consume(tile.id));
            outcome
        }
        TileKind::Spike => StepOutcome::fail(actor, MSG_SPIKE),
        TileKind::Button => {
            let mut outcome = StepOutcome::ok(actor, "Click! The door is open!");
            if let Some(door) = find_door(tiles) {
                // Pressing the button opens the door for good: the tile
                // becomes plain floor.
                outcome.mutations.push(TileMutation {
                    tile_id: door.id,
                    kind: Some(TileKind::Floor),
                    is_active: Some(true),
                });
            }
            outcome
        }
        _ => StepOutcome::ok(actor, success_message),
    }
}

/// A collected tile becomes plain floor, so revisits collect nothing.
fn consume(tile_id: u32) -> TileMutation {
    TileMutation {
        tile_id,
        kind: Some(TileKind::Floor),
        is_active: None,
    }
}

/// Toggle the door if the actor faces a button; otherwise do nothing.
fn interact(actor: Actor, tiles: &[Tile]) -> StepOutcome {
    let faced = actor.pos.offset(actor.dir.delta(), 1);
    let facing_button = tile_at(tiles, faced).map(|t| t.kind) == Some(TileKind::Button);
    if !facing_button {
        return StepOutcome::ok(actor, "Nothing to interact with.");
    }
    let Some(door) = find_door(tiles) else {
        return StepOutcome::ok(actor, "Nothing happened.");
    };
    let opening = !door.is_active;
    let mut outcome = StepOutcome::ok(
        actor,
        if opening {
            "Click! The door is open!"
        } else {
            "Clunk! The door is closed!"
        },
    );
    outcome.mutations.push(TileMutation {
        tile_id: door.id,
        kind: None,
        is_active: Some(opening),
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPos;
    use crate::level::GoalKind;

    fn block(kind: CommandKind) -> CommandBlock {
        CommandBlock {
            kind,
            instance_id: 0,
            nest_level: 0,
            repeat: None,
        }
    }

    /// 3x3 open floor with a configurable middle row.
    fn level_with(tiles: Vec<Tile>) -> LevelDefinition {
        LevelDefinition {
            id: 1,
            name: "test".into(),
            difficulty: 1,
            rows: 3,
            cols: 3,
            tiles,
            start_pos: GridPos::new(0, 0),
            start_dir: Direction::Right,
            allowed_commands: Vec::new(),
            max_blocks: 10,
            optimal_blocks: 2,
            goal: GoalKind::ReachGoal,
            required_coins: None,
            required_gems: None,
            hints: Vec::new(),
        }
    }

    fn open_floor() -> Vec<Tile> {
        let mut tiles = Vec::new();
        for row in 0..3i16 {
            for col in 0..3i16 {
                let id = (row * 3 + col) as u32;
                tiles.push(Tile::new(id, TileKind::Floor, GridPos::new(row, col)));
            }
        }
        tiles
    }

    fn set_kind(tiles: &mut [Tile], pos: GridPos, kind: TileKind) {
        let tile = tiles.iter_mut().find(|t| t.pos == pos).unwrap();
        tile.kind = kind;
    }

    fn actor_at(row: i16, col: i16, dir: Direction) -> Actor {
        Actor::at_start(GridPos::new(row, col), dir)
    }

    #[test]
    fn move_forward_advances() {
        let tiles = open_floor();
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);
        let out = execute(&block(CommandKind::MoveForward), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.pos, GridPos::new(1, 2));
        assert!(out.actor.is_moving);
    }

    #[test]
    fn move_backward_uses_inverse_facing() {
        let tiles = open_floor();
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);
        let out = execute(&block(CommandKind::MoveBackward), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.pos, GridPos::new(1, 0));
    }

    #[test]
    fn off_grid_fails_without_moving() {
        let tiles = open_floor();
        let level = level_with(tiles.clone());
        // Every edge, every axis.
        for (pos, dir) in [
            (GridPos::new(0, 0), Direction::Up),
            (GridPos::new(0, 0), Direction::Left),
            (GridPos::new(2, 2), Direction::Down),
            (GridPos::new(2, 2), Direction::Right),
        ] {
            let actor = Actor::at_start(pos, dir);
            let out = execute(&block(CommandKind::MoveForward), &actor, &tiles, &level);
            assert!(!out.success);
            assert_eq!(out.message, MSG_OFF_GRID);
            assert_eq!(out.actor.pos, pos);
        }
    }

    #[test]
    fn wall_blocks_without_moving() {
        let mut tiles = open_floor();
        set_kind(&mut tiles, GridPos::new(1, 2), TileKind::Wall);
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);
        let out = execute(&block(CommandKind::MoveForward), &actor, &tiles, &level);
        assert!(!out.success);
        assert_eq!(out.message, MSG_BLOCKED);
        assert_eq!(out.actor.pos, GridPos::new(1, 1));
    }

    #[test]
    fn closed_door_blocks_open_door_admits() {
        let mut tiles = open_floor();
        set_kind(&mut tiles, GridPos::new(1, 2), TileKind::Door);
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);

        let out = execute(&block(CommandKind::MoveForward), &actor, &tiles, &level);
        assert!(!out.success);
        assert_eq!(out.message, MSG_BLOCKED);

        tiles.iter_mut().find(|t| t.kind == TileKind::Door).unwrap().is_active = true;
        let out = execute(&block(CommandKind::MoveForward), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.pos, GridPos::new(1, 2));
    }

    #[test]
    fn spike_is_entered_then_fails() {
        let mut tiles = open_floor();
        set_kind(&mut tiles, GridPos::new(1, 2), TileKind::Spike);
        let level = level_with(tiles.clone());
        // Resource counts must not matter.
        let mut actor = actor_at(1, 1, Direction::Right);
        actor.coins = 7;
        actor.gems = 3;
        let out = execute(&block(CommandKind::MoveForward), &actor, &tiles, &level);
        assert!(!out.success);
        assert_eq!(out.message, MSG_SPIKE);
        assert_eq!(out.actor.pos, GridPos::new(1, 2));
        assert_eq!(out.actor.coins, 7);
    }

    #[test]
    fn coin_collects_and_converts_to_floor() {
        let mut tiles = open_floor();
        set_kind(&mut tiles, GridPos::new(1, 2), TileKind::Coin);
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);
        let out = execute(&block(CommandKind::MoveForward), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.coins, 1);
        assert_eq!(out.mutations.len(), 1);
        assert_eq!(out.mutations[0].kind, Some(TileKind::Floor));
    }

    #[test]
    fn button_step_opens_first_door_as_floor() {
        let mut tiles = open_floor();
        set_kind(&mut tiles, GridPos::new(1, 2), TileKind::Button);
        set_kind(&mut tiles, GridPos::new(2, 2), TileKind::Door);
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);
        let out = execute(&block(CommandKind::MoveForward), &actor, &tiles, &level);
        assert!(out.success);
        let door_id = tiles.iter().find(|t| t.kind == TileKind::Door).unwrap().id;
        assert_eq!(
            out.mutations,
            vec![TileMutation {
                tile_id: door_id,
                kind: Some(TileKind::Floor),
                is_active: Some(true),
            }]
        );
    }

    #[test]
    fn turns_rotate_in_place() {
        let tiles = open_floor();
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Up);
        let out = execute(&block(CommandKind::TurnLeft), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.dir, Direction::Left);
        assert_eq!(out.actor.pos, actor.pos);
        let out = execute(&block(CommandKind::TurnRight), &actor, &tiles, &level);
        assert_eq!(out.actor.dir, Direction::Right);
    }

    #[test]
    fn jump_clears_one_obstacle() {
        let mut tiles = open_floor();
        // Wall directly ahead, clear landing two ahead.
        set_kind(&mut tiles, GridPos::new(1, 1), TileKind::Wall);
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 0, Direction::Right);
        let out = execute(&block(CommandKind::Jump), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.pos, GridPos::new(1, 2));
        assert!(out.actor.is_jumping);
        assert!(!out.actor.is_moving);
    }

    #[test]
    fn jump_landing_collects() {
        let mut tiles = open_floor();
        set_kind(&mut tiles, GridPos::new(1, 2), TileKind::Gem);
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 0, Direction::Right);
        let out = execute(&block(CommandKind::Jump), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.gems, 1);
    }

    #[test]
    fn jump_checks_only_the_landing_cell() {
        let mut tiles = open_floor();
        set_kind(&mut tiles, GridPos::new(1, 2), TileKind::Wall);
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 0, Direction::Right);
        let out = execute(&block(CommandKind::Jump), &actor, &tiles, &level);
        assert!(!out.success);
        assert_eq!(out.actor.pos, GridPos::new(1, 0));
    }

    #[test]
    fn wait_is_a_successful_noop() {
        let tiles = open_floor();
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Up);
        let out = execute(&block(CommandKind::Wait), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.pos, actor.pos);
        assert!(out.mutations.is_empty());
    }

    #[test]
    fn interact_toggles_door_both_ways() {
        let mut tiles = open_floor();
        set_kind(&mut tiles, GridPos::new(1, 2), TileKind::Button);
        set_kind(&mut tiles, GridPos::new(2, 2), TileKind::Door);
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);

        let out = execute(&block(CommandKind::Interact), &actor, &tiles, &level);
        assert!(out.success);
        assert_eq!(out.actor.pos, actor.pos);
        assert_eq!(out.mutations[0].is_active, Some(true));
        assert_eq!(out.mutations[0].kind, None);

        tiles.iter_mut().find(|t| t.kind == TileKind::Door).unwrap().is_active = true;
        let out = execute(&block(CommandKind::Interact), &actor, &tiles, &level);
        assert_eq!(out.mutations[0].is_active, Some(false));
    }

    #[test]
    fn interact_without_button_does_nothing() {
        let tiles = open_floor();
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);
        let out = execute(&block(CommandKind::Interact), &actor, &tiles, &level);
        assert!(out.success);
        assert!(out.mutations.is_empty());
    }

    #[test]
    fn stray_control_markers_are_noops() {
        let tiles = open_floor();
        let level = level_with(tiles.clone());
        let actor = actor_at(1, 1, Direction::Right);
        for kind in [
            CommandKind::LoopStart,
            CommandKind::LoopEnd,
            CommandKind::IfStart,
            CommandKind::Else,
            CommandKind::IfEnd,
        ] {
            let out = execute(&block(kind), &actor, &tiles, &level);
            assert!(out.success);
            assert_eq!(out.actor.pos, actor.pos);
            assert!(out.mutations.is_empty());
        }
    }
}

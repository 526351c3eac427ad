//! Command vocabulary and the user-authored program.
//!
//! A [`Program`] is the editable block list the child assembles. All edit
//! operations either apply fully or leave the program untouched; the
//! per-level block budget silently rejects additions past the cap. Nesting
//! levels are display metadata recomputed from bracket depth after every
//! edit, never trusted as input.

use serde::{Deserialize, Serialize};

pub const LOOP_REPEAT_MIN: u8 = 1;
pub const LOOP_REPEAT_MAX: u8 = 10;
pub const LOOP_REPEAT_DEFAULT: u8 = 2;

/// The closed command vocabulary. Interpreter dispatch matches this
/// exhaustively, so adding a variant is a compile error until every
/// consumer handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    Jump,
    Wait,
    Interact,
    LoopStart,
    LoopEnd,
    IfStart,
    Else,
    IfEnd,
}

impl CommandKind {
    /// Control-flow markers: loop brackets and the (currently inert)
    /// conditional brackets.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            CommandKind::LoopStart
                | CommandKind::LoopEnd
                | CommandKind::IfStart
                | CommandKind::Else
                | CommandKind::IfEnd
        )
    }
}

/// One authored block. `repeat` is `Some` only for `LoopStart`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommandBlock {
    pub kind: CommandKind,
    pub instance_id: u32,
    pub nest_level: u8,
    pub repeat: Option<u8>,
}

/// The editable program, with its per-level block budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    blocks: Vec<CommandBlock>,
    next_id: u32,
    max_blocks: usize,
}

impl Program {
    pub fn new(max_blocks: usize) -> Self {
        Self {
            blocks: Vec::new(),
            next_id: 0,
            max_blocks,
        }
    }

    pub fn blocks(&self) -> &[CommandBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }

    /// Append a block. Returns the new instance id, or `None` if the
    /// budget is already spent (program unchanged).
    pub fn append(&mut self, kind: CommandKind) -> Option<u32> {
        let at = self.blocks.len();
        self.insert(kind, at)
    }

    /// Insert a block at `index` (clamped to the end). Returns the new
    /// instance id, or `None` if the budget is already spent.
    pub fn insert(&mut self, kind: CommandKind, index: usize) -> Option<u32> {
        if self.blocks.len() >= self.max_blocks {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        let repeat = if kind == CommandKind::LoopStart {
            Some(LOOP_REPEAT_DEFAULT)
        } else {
            None
        };
        let at = index.min(self.blocks.len());
        self.blocks.insert(
            at,
            CommandBlock {
                kind,
                instance_id: id,
                nest_level: 0,
                repeat,
            },
        );
        self.reindex_nesting();
        Some(id)
    }

    /// Remove the block with `instance_id`. Returns whether it existed.
    pub fn remove(&mut self, instance_id: u32) -> bool {
        let Some(at) = self.position_of(instance_id) else {
            return false;
        };
        self.blocks.remove(at);
        self.reindex_nesting();
        true
    }

    /// Move a block to `new_index` (clamped). Returns whether it existed.
    pub fn move_block(&mut self, instance_id: u32, new_index: usize) -> bool {
        let Some(at) = self.position_of(instance_id) else {
            return false;
        };
        let block = self.blocks.remove(at);
        let to = new_index.min(self.blocks.len());
        self.blocks.insert(to, block);
        self.reindex_nesting();
        true
    }

    /// Set a loop block's repeat count, clamped to 1–10. Ignored (returns
    /// false) for unknown ids and non-loop blocks.
    pub fn set_loop_repeat(&mut self, instance_id: u32, count: u8) -> bool {
        let Some(at) = self.position_of(instance_id) else {
            return false;
        };
        if self.blocks[at].kind != CommandKind::LoopStart {
            return false;
        }
        self.blocks[at].repeat = Some(count.clamp(LOOP_REPEAT_MIN, LOOP_REPEAT_MAX));
        true
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    fn position_of(&self, instance_id: u32) -> Option<usize> {
        self.blocks.iter().position(|b| b.instance_id == instance_id)
    }

    /// Recompute display nesting from bracket depth. Open brackets sit at
    /// the enclosing depth, their bodies one deeper; `else` sits at its
    /// `if`'s depth. Unmatched closers saturate at zero.
    fn reindex_nesting(&mut self) {
        let mut depth: u8 = 0;
        for block in &mut self.blocks {
            match block.kind {
                CommandKind::LoopStart | CommandKind::IfStart => {
                    block.nest_level = depth;
                    depth = depth.saturating_add(1);
                }
                CommandKind::LoopEnd | CommandKind::IfEnd => {
                    depth = depth.saturating_sub(1);
                    block.nest_level = depth;
                }
                CommandKind::Else => {
                    block.nest_level = depth.saturating_sub(1);
                }
                _ => block.nest_level = depth,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(p: &Program) -> Vec<CommandKind> {
        p.blocks().iter().map(|b| b.kind).collect()
    }

    #[test]
    fn append_allocates_fresh_ids() {
        let mut p = Program::new(10);
        let a = p.append(CommandKind::MoveForward).unwrap();
        let b = p.append(CommandKind::TurnLeft).unwrap();
        assert_ne!(a, b);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn budget_rejects_silently() {
        let mut p = Program::new(2);
        assert!(p.append(CommandKind::MoveForward).is_some());
        assert!(p.append(CommandKind::MoveForward).is_some());
        assert!(p.append(CommandKind::MoveForward).is_none());
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn removed_id_frees_budget() {
        let mut p = Program::new(1);
        let id = p.append(CommandKind::Wait).unwrap();
        assert!(p.append(CommandKind::Wait).is_none());
        assert!(p.remove(id));
        assert!(p.append(CommandKind::Wait).is_some());
    }

    #[test]
    fn loop_start_defaults_repeat() {
        let mut p = Program::new(4);
        p.append(CommandKind::LoopStart);
        p.append(CommandKind::MoveForward);
        assert_eq!(p.blocks()[0].repeat, Some(LOOP_REPEAT_DEFAULT));
        assert_eq!(p.blocks()[1].repeat, None);
    }

    #[test]
    fn set_repeat_clamps_and_rejects_non_loops() {
        let mut p = Program::new(4);
        let lp = p.append(CommandKind::LoopStart).unwrap();
        let mv = p.append(CommandKind::MoveForward).unwrap();
        assert!(p.set_loop_repeat(lp, 99));
        assert_eq!(p.blocks()[0].repeat, Some(LOOP_REPEAT_MAX));
        assert!(p.set_loop_repeat(lp, 0));
        assert_eq!(p.blocks()[0].repeat, Some(LOOP_REPEAT_MIN));
        assert!(!p.set_loop_repeat(mv, 3));
        assert!(!p.set_loop_repeat(999, 3));
    }

    #[test]
    fn move_block_reorders() {
        let mut p = Program::new(4);
        let a = p.append(CommandKind::MoveForward).unwrap();
        p.append(CommandKind::TurnLeft).unwrap();
        assert!(p.move_block(a, 1));
        assert_eq!(
            kinds(&p),
            vec![CommandKind::TurnLeft, CommandKind::MoveForward]
        );
        assert!(!p.move_block(999, 0));
    }

    #[test]
    fn nesting_derived_from_brackets() {
        let mut p = Program::new(8);
        p.append(CommandKind::MoveForward);
        p.append(CommandKind::LoopStart);
        p.append(CommandKind::LoopStart);
        p.append(CommandKind::Jump);
        p.append(CommandKind::LoopEnd);
        p.append(CommandKind::LoopEnd);
        p.append(CommandKind::TurnLeft);
        let levels: Vec<u8> = p.blocks().iter().map(|b| b.nest_level).collect();
        assert_eq!(levels, vec![0, 0, 1, 2, 1, 0, 0]);
    }

    #[test]
    fn unmatched_end_saturates() {
        let mut p = Program::new(4);
        p.append(CommandKind::LoopEnd);
        p.append(CommandKind::MoveForward);
        let levels: Vec<u8> = p.blocks().iter().map(|b| b.nest_level).collect();
        assert_eq!(levels, vec![0, 0]);
    }
}

//! Loop expansion — turns the authored block list into a flat, loop-free
//! instruction stream.
//!
//! Recursive descent, left to right: plain blocks pass through, a
//! `LoopStart` captures the range to its depth-matched `LoopEnd` and
//! appends the recursively expanded body once per repeat count, a bare
//! `LoopEnd` is dropped. `If*` markers have no runtime semantics yet and
//! pass through inert. The stream is rebuilt fresh on every run start.
//!
//! Expansion length is capped: nested loops at high repeat counts grow
//! geometrically, and a child's program that would unroll past
//! [`MAX_STREAM_LEN`] fails linearization instead of running a silent
//! prefix.

use crate::block::{CommandBlock, CommandKind, LOOP_REPEAT_DEFAULT};

/// Hard cap on instruction stream length.
pub const MAX_STREAM_LEN: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearizeError {
    /// The program would expand past the cap.
    StreamTooLong { max: usize },
}

impl std::fmt::Display for LinearizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinearizeError::StreamTooLong { max } => {
                write!(f, "program expands to more than {} steps", max)
            }
        }
    }
}

impl std::error::Error for LinearizeError {}

/// Expand `blocks` into a flat instruction stream.
pub fn linearize(blocks: &[CommandBlock]) -> Result<Vec<CommandBlock>, LinearizeError> {
    let mut out = Vec::new();
    expand(blocks, &mut out)?;
    Ok(out)
}

fn expand(blocks: &[CommandBlock], out: &mut Vec<CommandBlock>) -> Result<(), LinearizeError> {
    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];
        match block.kind {
            CommandKind::LoopStart => {
                // Body runs to the depth-matched LoopEnd; an unterminated
                // loop captures everything to the end of the list.
                let end = matching_loop_end(blocks, i).unwrap_or(blocks.len());
                let body = &blocks[i + 1..end];
                let repeat = block.repeat.unwrap_or(LOOP_REPEAT_DEFAULT);
                for _ in 0..repeat {
                    expand(body, out)?;
                }
                i = end + 1;
            }
            CommandKind::LoopEnd => {
                // Bare closer with no open loop: dropped.
                i += 1;
            }
            _ => {
                if out.len() >= MAX_STREAM_LEN {
                    return Err(LinearizeError::StreamTooLong {
                        max: MAX_STREAM_LEN,
                    });
                }
                out.push(*block);
                i += 1;
            }
        }
    }
    Ok(())
}

/// Index of the LoopEnd matching the LoopStart at `start`, tracking
/// nesting depth.
fn matching_loop_end(blocks: &[CommandBlock], start: usize) -> Option<usize> {
    let mut depth = 0u32;
    for (i, block) in blocks.iter().enumerate().skip(start + 1) {
        match block.kind {
            CommandKind::LoopStart => depth += 1,
            CommandKind::LoopEnd => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

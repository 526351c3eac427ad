//! Pure game logic for BotQuest.
//!
//! This crate contains the block-programming minigame's logic, independent
//! of any engine, persistence, or UI. Functions take plain data and return
//! results, making them unit-testable and portable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actor`] | Robot pose, 4-cycle facing direction, collected resources |
//! | [`block`] | Command vocabulary, authored program, budget-capped editing |
//! | [`grid`] | Tile kinds, walkability, grid positions |
//! | [`interpret`] | One-instruction interpreter over a world snapshot |
//! | [`level`] | Immutable level definitions and goal kinds |
//! | [`linearize`] | Loop expansion into a capped flat instruction stream |
//! | [`scoring`] | Goal evaluation, star rating, score and rewards |

pub mod actor;
pub mod block;
pub mod grid;
pub mod interpret;
pub mod level;
pub mod linearize;
pub mod scoring;

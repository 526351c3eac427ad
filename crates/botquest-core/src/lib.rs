//! BotQuest Core - Block-Program Session Engine
//!
//! The engine behind the programming-education minigame: a level catalog,
//! an execution controller stepping one instruction per external tick, a
//! pausable session state machine, and a per-level progress ledger.
//!
//! # Architecture
//!
//! Pure logic (blocks, linearizer, interpreter, scoring) lives in
//! `botquest-logic`; this crate owns the stateful pieces:
//! - **Catalog**: immutable level definitions parsed from embedded JSON
//! - **World**: mutable tiles + actor, derived fresh for every run
//! - **Session**: the state machine driving editing, execution, scoring
//! - **Progress**: the best-result-per-level store with unlock gating
//!
//! # Example
//!
//! ```rust,no_run
//! use botquest_core::prelude::*;
//! use botquest_logic::block::CommandKind;
//!
//! let catalog = LevelCatalog::builtin().unwrap();
//! let mut session = GameSession::new(catalog, ProgressStore::new());
//!
//! session.start();
//! session.select_level(1);
//! loop {
//!     session.tick(); // countdown, then one instruction per tick
//!     if session.phase() == SessionPhase::Building {
//!         break;
//!     }
//! }
//! session.append_block(CommandKind::MoveForward);
//! ```

pub mod catalog;
pub mod progress;
pub mod session;
pub mod world;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::LevelCatalog;
    pub use crate::progress::ProgressStore;
    pub use crate::session::{GameSession, SessionPhase, TickSpeed};
    pub use crate::world::WorldState;
}

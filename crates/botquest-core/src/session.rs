//! The game session — state machine plus execution controller.
//!
//! One [`GameSession`] owns everything a live play-through needs: the
//! selected level, the editable program, the derived world, the frozen
//! instruction stream and its cursor, and the progress store. Nothing is
//! ambient or global, so independent sessions never cross-contaminate.
//!
//! The session is driven cooperatively: the caller sources ticks (at
//! whatever cadence [`TickSpeed`] suggests) and each tick executes at most
//! one instruction, atomically. Pausing therefore lands exactly on an
//! instruction boundary; stopping is immediate and discards the run.

use std::time::Instant;

use log::{debug, info, warn};

use botquest_logic::block::{CommandBlock, CommandKind, Program};
use botquest_logic::interpret;
use botquest_logic::level::LevelDefinition;
use botquest_logic::linearize::{linearize, LinearizeError};
use botquest_logic::scoring::{
    goal_met, score_failure, score_success, RunResult, MSG_GOAL_NOT_REACHED,
};

use crate::catalog::LevelCatalog;
use crate::progress::ProgressStore;
use crate::world::WorldState;

/// Ticks of countdown shown before the building stage opens.
pub const COUNTDOWN_TICKS: u32 = 3;

/// Which stage of a session is active. Serialized as the kebab-case tag
/// the presentation layer keys its screens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    Menu,
    LevelSelect,
    Countdown,
    Building,
    Executing,
    Paused,
    Results,
    Failed,
}

/// Tick cadence hint for the caller's tick source. Changing it between
/// ticks only changes pacing, never outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickSpeed {
    Slow,
    Normal,
    Fast,
}

impl TickSpeed {
    pub fn interval_ms(self) -> u64 {
        match self {
            TickSpeed::Slow => 1000,
            TickSpeed::Normal => 500,
            TickSpeed::Fast => 200,
        }
    }
}

/// Why a run request was refused. The session stays in its current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStartError {
    NotBuilding,
    EmptyProgram,
    ProgramTooLong(LinearizeError),
}

impl std::fmt::Display for RunStartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStartError::NotBuilding => write!(f, "not in the building stage"),
            RunStartError::EmptyProgram => write!(f, "program has no blocks"),
            RunStartError::ProgramTooLong(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunStartError {}

/// One live play session.
pub struct GameSession {
    phase: SessionPhase,
    catalog: LevelCatalog,
    progress: ProgressStore,
    speed: TickSpeed,
    level: Option<LevelDefinition>,
    program: Program,
    world: Option<WorldState>,
    stream: Vec<CommandBlock>,
    cursor: usize,
    countdown: u32,
    started_at: Option<Instant>,
    last_result: Option<RunResult>,
}

impl GameSession {
    pub fn new(catalog: LevelCatalog, progress: ProgressStore) -> Self {
        Self {
            phase: SessionPhase::Menu,
            catalog,
            progress,
            speed: TickSpeed::Normal,
            level: None,
            program: Program::new(0),
            world: None,
            stream: Vec::new(),
            cursor: 0,
            countdown: 0,
            started_at: None,
            last_result: None,
        }
    }

    // ── Read surface for the presentation layer ─────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn level(&self) -> Option<&LevelDefinition> {
        self.level.as_ref()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    /// Index of the next instruction to execute (for highlighting).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn stream_len(&self) -> usize {
        self.stream.len()
    }

    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    pub fn speed(&self) -> TickSpeed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: TickSpeed) {
        self.speed = speed;
    }

    pub fn is_unlocked(&self, level_id: u32) -> bool {
        self.progress.is_unlocked(level_id, &self.catalog)
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Menu → level select.
    pub fn start(&mut self) {
        if self.phase != SessionPhase::Menu {
            warn!("start ignored in phase {:?}", self.phase);
            return;
        }
        self.phase = SessionPhase::LevelSelect;
    }

    /// Level select → countdown. Re-derives world state for the chosen
    /// level and resets the program to that level's budget. Locked or
    /// unknown levels are rejected.
    pub fn select_level(&mut self, level_id: u32) -> bool {
        if self.phase != SessionPhase::LevelSelect {
            warn!("select_level ignored in phase {:?}", self.phase);
            return false;
        }
        if !self.is_unlocked(level_id) {
            warn!("level {} is locked", level_id);
            return false;
        }
        let Some(level) = self.catalog.get(level_id).cloned() else {
            warn!("unknown level {}", level_id);
            return false;
        };
        info!("selected level {} ({})", level.id, level.name);
        self.program = Program::new(level.max_blocks);
        self.world = Some(WorldState::derive(&level));
        self.level = Some(level);
        self.stream.clear();
        self.cursor = 0;
        self.countdown = COUNTDOWN_TICKS;
        self.phase = SessionPhase::Countdown;
        true
    }

    /// External tick: advances the countdown or executes one instruction.
    /// Ticks arriving in any other phase are ignored.
    pub fn tick(&mut self) {
        match self.phase {
            SessionPhase::Countdown => {
                self.countdown = self.countdown.saturating_sub(1);
                if self.countdown == 0 {
                    self.enter_building();
                }
            }
            SessionPhase::Executing => self.step_once(),
            _ => {}
        }
    }

    /// Building → executing. Freezes the program into an instruction
    /// stream and re-derives the world, discarding any stray drift.
    pub fn run(&mut self) -> Result<(), RunStartError> {
        if self.phase != SessionPhase::Building {
            return Err(RunStartError::NotBuilding);
        }
        if self.program.is_empty() {
            return Err(RunStartError::EmptyProgram);
        }
        let stream = linearize(self.program.blocks()).map_err(RunStartError::ProgramTooLong)?;
        let Some(level) = self.level.as_ref() else {
            return Err(RunStartError::NotBuilding);
        };
        self.world = Some(WorldState::derive(level));
        self.stream = stream;
        self.cursor = 0;
        self.started_at = Some(Instant::now());
        self.phase = SessionPhase::Executing;
        info!(
            "run started: {} blocks, {} instructions",
            self.program.len(),
            self.stream.len()
        );
        Ok(())
    }

    /// Building/executing → paused. The caller must halt its tick source;
    /// cursor and world are left untouched.
    pub fn pause(&mut self) {
        match self.phase {
            SessionPhase::Building | SessionPhase::Executing => {
                self.phase = SessionPhase::Paused;
            }
            _ => warn!("pause ignored in phase {:?}", self.phase),
        }
    }

    /// Paused → executing if the run still has instructions left, else
    /// back to building (an exhausted run is not re-evaluated).
    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Paused {
            warn!("resume ignored in phase {:?}", self.phase);
            return;
        }
        if self.cursor < self.stream.len() {
            self.phase = SessionPhase::Executing;
        } else {
            self.enter_building();
        }
    }

    /// Unconditional abort: discard the run and return to building with a
    /// freshly derived world.
    pub fn stop(&mut self) {
        match self.phase {
            SessionPhase::Executing | SessionPhase::Paused => {
                self.rederive_world();
                self.enter_building();
            }
            _ => warn!("stop ignored in phase {:?}", self.phase),
        }
    }

    /// Results/failed → building, world re-derived, program kept for
    /// another attempt.
    pub fn retry(&mut self) {
        match self.phase {
            SessionPhase::Results | SessionPhase::Failed => {
                self.rederive_world();
                self.enter_building();
            }
            _ => warn!("retry ignored in phase {:?}", self.phase),
        }
    }

    /// Results/failed → level select (advance or quit).
    pub fn exit_to_level_select(&mut self) {
        match self.phase {
            SessionPhase::Results | SessionPhase::Failed => {
                self.phase = SessionPhase::LevelSelect;
            }
            _ => warn!("exit_to_level_select ignored in phase {:?}", self.phase),
        }
    }

    // ── Editing surface (building phase only) ───────────────────────────

    /// Append a block. Rejected outside building, for commands the level
    /// does not allow, and once the budget is spent.
    pub fn append_block(&mut self, kind: CommandKind) -> Option<u32> {
        if !self.edit_allowed(kind) {
            return None;
        }
        self.program.append(kind)
    }

    /// Insert a block at an index (clamped). Same rejections as append.
    pub fn insert_block(&mut self, kind: CommandKind, index: usize) -> Option<u32> {
        if !self.edit_allowed(kind) {
            return None;
        }
        self.program.insert(kind, index)
    }

    pub fn remove_block(&mut self, instance_id: u32) -> bool {
        self.editing() && self.program.remove(instance_id)
    }

    pub fn move_block(&mut self, instance_id: u32, new_index: usize) -> bool {
        self.editing() && self.program.move_block(instance_id, new_index)
    }

    pub fn set_loop_repeat(&mut self, instance_id: u32, count: u8) -> bool {
        self.editing() && self.program.set_loop_repeat(instance_id, count)
    }

    pub fn clear_program(&mut self) {
        if self.editing() {
            self.program.clear();
        }
    }

    fn editing(&self) -> bool {
        if self.phase != SessionPhase::Building {
            warn!("edit ignored in phase {:?}", self.phase);
            return false;
        }
        true
    }

    fn edit_allowed(&self, kind: CommandKind) -> bool {
        if !self.editing() {
            return false;
        }
        let allowed = self
            .level
            .as_ref()
            .map(|l| l.allowed_commands.contains(&kind))
            .unwrap_or(false);
        if !allowed {
            warn!("command {:?} not allowed in this level", kind);
        }
        allowed
    }

    // ── Execution ───────────────────────────────────────────────────────

    /// Execute the instruction under the cursor, or evaluate the goal if
    /// the stream is exhausted.
    fn step_once(&mut self) {
        let (Some(level), Some(world)) = (self.level.as_ref(), self.world.as_mut()) else {
            warn!("executing without a level; aborting run");
            self.phase = SessionPhase::LevelSelect;
            return;
        };

        if self.cursor >= self.stream.len() {
            let success = goal_met(level, &world.actor);
            let message = if success {
                "You did it!".to_string()
            } else {
                MSG_GOAL_NOT_REACHED.to_string()
            };
            self.finish(success, message);
            return;
        }

        let block = self.stream[self.cursor];
        let outcome = interpret::execute(&block, &world.actor, &world.tiles, level);
        self.cursor += 1;
        world.actor = outcome.actor;
        for mutation in &outcome.mutations {
            world.apply(mutation);
        }
        world.steps += 1;
        debug!(
            "step {}: {:?} -> {} ({})",
            world.steps, block.kind, outcome.success, outcome.message
        );

        if !outcome.success {
            self.finish(false, outcome.message);
        }
    }

    /// Freeze the terminal outcome: score it, record it, and move to the
    /// matching display phase. World state stays as the last step left it.
    fn finish(&mut self, success: bool, message: String) {
        let (Some(level), Some(world)) = (self.level.as_ref(), self.world.as_ref()) else {
            return;
        };
        let time_spent = self
            .started_at
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        let blocks_used = self.program.len() as u32;

        let result = if success {
            score_success(level, &world.actor, blocks_used, world.steps, time_spent, message)
        } else {
            score_failure(level, &world.actor, blocks_used, world.steps, time_spent, message)
        };

        info!(
            "run finished: completed={} stars={} steps={} ({})",
            result.completed, result.stars, result.steps, result.message
        );
        self.progress.record(level.id, &result);
        self.phase = if success {
            SessionPhase::Results
        } else {
            SessionPhase::Failed
        };
        self.last_result = Some(result);
    }

    fn rederive_world(&mut self) {
        if let Some(level) = self.level.as_ref() {
            self.world = Some(WorldState::derive(level));
        }
    }

    /// Entering the building stage always clears the stream, so a later
    /// resume-from-pause falls through to building rather than resuming a
    /// stale run.
    fn enter_building(&mut self) {
        self.stream.clear();
        self.cursor = 0;
        self.phase = SessionPhase::Building;
    }
}

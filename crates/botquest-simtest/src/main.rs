//! BotQuest Headless Validation Harness
//!
//! Validates the block-program engine end to end without any UI.
//! Runs entirely in-process — no rendering, no persistence side effects.
//!
//! Usage:
//!   cargo run -p botquest-simtest
//!   cargo run -p botquest-simtest -- --verbose

use rand::seq::SliceRandom;
use rand::Rng;

use botquest_core::prelude::*;
use botquest_core::session::COUNTDOWN_TICKS;
use botquest_logic::block::{CommandKind, Program};
use botquest_logic::interpret::MSG_SPIKE;
use botquest_logic::level::GoalKind;
use botquest_logic::linearize::{linearize, MAX_STREAM_LEN};
use botquest_logic::scoring::star_rating;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== BotQuest Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Level catalog validation
    results.extend(validate_catalog(verbose));

    // 2. Linearizer sweep (including randomized programs)
    results.extend(validate_linearizer(verbose));

    // 3. Scoring thresholds
    results.extend(validate_scoring(verbose));

    // 4. Scripted campaign over the shipped levels
    results.extend(validate_campaign(verbose));

    // 5. Randomized session fuzzing
    results.extend(validate_random_sessions(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Level catalog ────────────────────────────────────────────────────

fn validate_catalog(_verbose: bool) -> Vec<TestResult> {
    println!("--- Level Catalog ---");
    let mut results = Vec::new();

    let catalog = match LevelCatalog::builtin() {
        Ok(c) => c,
        Err(e) => {
            results.push(check("catalog_parse", false, format!("{}", e)));
            return results;
        }
    };
    results.push(check(
        "catalog_parse",
        catalog.len() >= 5,
        format!("{} levels loaded", catalog.len()),
    ));

    let mut ids: Vec<u32> = catalog.levels().iter().map(|l| l.id).collect();
    ids.sort_unstable();
    ids.dedup();
    results.push(check(
        "catalog_unique_ids",
        ids.len() == catalog.len(),
        "level ids are unique".into(),
    ));

    let bad_start: Vec<u32> = catalog
        .levels()
        .iter()
        .filter(|l| !l.in_bounds(l.start_pos))
        .map(|l| l.id)
        .collect();
    results.push(check(
        "catalog_start_in_bounds",
        bad_start.is_empty(),
        format!("levels without valid start: {:?}", bad_start),
    ));

    let missing_goal: Vec<u32> = catalog
        .levels()
        .iter()
        .filter(|l| {
            matches!(l.goal, GoalKind::ReachGoal | GoalKind::CollectAndReach)
                && l.goal_pos().is_none()
        })
        .map(|l| l.id)
        .collect();
    results.push(check(
        "catalog_goal_tiles",
        missing_goal.is_empty(),
        format!("reach levels without goal tile: {:?}", missing_goal),
    ));

    let progress = ProgressStore::new();
    let first = catalog.levels()[0].id;
    results.push(check(
        "catalog_first_level_open",
        progress.is_unlocked(first, &catalog),
        format!("level {} unlocked on a fresh store", first),
    ));
    let locked = catalog
        .levels()
        .iter()
        .skip(1)
        .all(|l| !progress.is_unlocked(l.id, &catalog));
    results.push(check(
        "catalog_rest_locked",
        locked,
        "later levels locked on a fresh store".into(),
    ));

    results
}

// ── 2. Linearizer ───────────────────────────────────────────────────────

const PLAIN_COMMANDS: &[CommandKind] = &[
    CommandKind::MoveForward,
    CommandKind::MoveBackward,
    CommandKind::TurnLeft,
    CommandKind::TurnRight,
    CommandKind::Jump,
    CommandKind::Wait,
    CommandKind::Interact,
];

fn validate_linearizer(verbose: bool) -> Vec<TestResult> {
    println!("--- Linearizer ---");
    let mut results = Vec::new();
    let mut rng = rand::thread_rng();

    // Identity on random loop-free programs.
    let mut identity_ok = true;
    for _ in 0..100 {
        let mut program = Program::new(64);
        let len = rng.gen_range(0..32);
        for _ in 0..len {
            program.append(*PLAIN_COMMANDS.choose(&mut rng).unwrap());
        }
        match linearize(program.blocks()) {
            Ok(stream) if stream == program.blocks() => {}
            other => {
                identity_ok = false;
                if verbose {
                    println!("  identity violated: {:?}", other.map(|s| s.len()));
                }
                break;
            }
        }
    }
    results.push(check(
        "linearize_identity",
        identity_ok,
        "loop-free programs pass through unchanged".into(),
    ));

    // Single loop multiplies its body for every repeat count.
    let mut repeat_ok = true;
    for n in 1..=10u8 {
        let mut program = Program::new(8);
        program.append(CommandKind::MoveForward);
        let lp = program.append(CommandKind::LoopStart).unwrap();
        program.append(CommandKind::TurnRight);
        program.append(CommandKind::LoopEnd);
        program.append(CommandKind::Jump);
        program.set_loop_repeat(lp, n);
        let stream = linearize(program.blocks()).unwrap();
        if stream.len() != 2 + n as usize {
            repeat_ok = false;
        }
    }
    results.push(check(
        "linearize_repeat_counts",
        repeat_ok,
        "loop body duplicated once per repeat, 1..=10".into(),
    ));

    // Random nested programs never exceed the cap when Ok.
    let mut cap_ok = true;
    let mut overflows = 0;
    for _ in 0..200 {
        let mut program = Program::new(32);
        for _ in 0..rng.gen_range(1..24) {
            let roll = rng.gen_range(0..10);
            let kind = match roll {
                0..=1 => CommandKind::LoopStart,
                2..=3 => CommandKind::LoopEnd,
                _ => *PLAIN_COMMANDS.choose(&mut rng).unwrap(),
            };
            if let Some(id) = program.append(kind) {
                if kind == CommandKind::LoopStart {
                    program.set_loop_repeat(id, rng.gen_range(1..=10));
                }
            }
        }
        match linearize(program.blocks()) {
            Ok(stream) => {
                if stream.len() > MAX_STREAM_LEN
                    || stream.iter().any(|b| {
                        matches!(b.kind, CommandKind::LoopStart | CommandKind::LoopEnd)
                    })
                {
                    cap_ok = false;
                }
            }
            Err(_) => overflows += 1,
        }
    }
    results.push(check(
        "linearize_cap_and_no_markers",
        cap_ok,
        format!(
            "200 random programs within cap, {} rejected as too long",
            overflows
        ),
    ));

    results
}

// ── 3. Scoring ──────────────────────────────────────────────────────────

fn validate_scoring(_verbose: bool) -> Vec<TestResult> {
    println!("--- Scoring ---");
    let mut results = Vec::new();

    let mut thresholds_ok = true;
    for optimal in 1..=20u32 {
        let two_star_limit = (optimal * 3 + 1) / 2;
        if star_rating(optimal, optimal) != 3 {
            thresholds_ok = false;
        }
        if star_rating(two_star_limit, optimal) != 2 {
            thresholds_ok = false;
        }
        if star_rating(two_star_limit + 1, optimal) != 1 {
            thresholds_ok = false;
        }
        // Rating never increases as the program grows.
        let mut prev = 3;
        for used in optimal..optimal * 3 {
            let stars = star_rating(used, optimal);
            if stars > prev {
                thresholds_ok = false;
            }
            prev = stars;
        }
    }
    results.push(check(
        "star_thresholds",
        thresholds_ok,
        "3 at optimal, 2 to round(1.5x), 1 beyond, monotone".into(),
    ));

    results
}

// ── 4. Scripted campaign ────────────────────────────────────────────────

/// A scripted solution: blocks to append plus loop repeats to set.
struct Solution {
    level_id: u32,
    blocks: &'static [CommandKind],
    loop_repeat: Option<u8>,
}

const SOLUTIONS: &[Solution] = &[
    Solution {
        level_id: 1,
        blocks: &[CommandKind::MoveForward, CommandKind::MoveForward],
        loop_repeat: None,
    },
    Solution {
        level_id: 2,
        blocks: &[CommandKind::MoveForward, CommandKind::MoveForward],
        loop_repeat: None,
    },
    Solution {
        level_id: 3,
        blocks: &[
            CommandKind::LoopStart,
            CommandKind::MoveForward,
            CommandKind::LoopEnd,
        ],
        loop_repeat: Some(5),
    },
    Solution {
        level_id: 4,
        blocks: &[
            CommandKind::MoveForward,
            CommandKind::MoveForward,
            CommandKind::MoveForward,
            CommandKind::MoveForward,
            CommandKind::MoveForward,
        ],
        loop_repeat: None,
    },
    Solution {
        level_id: 5,
        blocks: &[
            CommandKind::MoveForward,
            CommandKind::Jump,
            CommandKind::MoveForward,
            CommandKind::MoveForward,
            CommandKind::MoveForward,
        ],
        loop_repeat: None,
    },
];

fn drive_to_building(session: &mut GameSession, level_id: u32) -> bool {
    if !session.select_level(level_id) {
        return false;
    }
    for _ in 0..COUNTDOWN_TICKS {
        session.tick();
    }
    session.phase() == SessionPhase::Building
}

fn drive_run(session: &mut GameSession) {
    if session.run().is_err() {
        return;
    }
    let budget = session.stream_len() + 1;
    for _ in 0..budget {
        if session.phase() != SessionPhase::Executing {
            break;
        }
        session.tick();
    }
}

fn validate_campaign(verbose: bool) -> Vec<TestResult> {
    println!("--- Scripted Campaign ---");
    let mut results = Vec::new();

    let catalog = match LevelCatalog::builtin() {
        Ok(c) => c,
        Err(_) => return results, // already reported by validate_catalog
    };
    let mut session = GameSession::new(catalog, ProgressStore::new());
    session.start();

    for solution in SOLUTIONS {
        let name = format!("campaign_level_{}", solution.level_id);
        if !drive_to_building(&mut session, solution.level_id) {
            results.push(check(&name, false, "level not reachable".into()));
            continue;
        }
        for &kind in solution.blocks {
            if session.append_block(kind).is_none() {
                break;
            }
        }
        if let Some(repeat) = solution.loop_repeat {
            let loop_id = session
                .program()
                .blocks()
                .iter()
                .find(|b| b.kind == CommandKind::LoopStart)
                .map(|b| b.instance_id);
            if let Some(id) = loop_id {
                session.set_loop_repeat(id, repeat);
            }
        }
        drive_run(&mut session);

        let completed = session
            .last_result()
            .map(|r| r.completed)
            .unwrap_or(false);
        let stars = session.last_result().map(|r| r.stars).unwrap_or(0);
        if verbose {
            if let Some(result) = session.last_result() {
                let json = serde_json::to_string(result).unwrap_or_default();
                println!("  level {} -> {}", solution.level_id, json);
            }
        }
        results.push(check(
            &name,
            completed && session.phase() == SessionPhase::Results,
            format!("completed with {} stars", stars),
        ));
        session.exit_to_level_select();
    }

    // Every scripted solution uses the optimal block count: all 3-star.
    let all_three_star = SOLUTIONS.iter().all(|s| {
        session
            .progress()
            .get(s.level_id)
            .map(|p| p.best_stars == 3)
            .unwrap_or(false)
    });
    results.push(check(
        "campaign_optimal_solutions",
        all_three_star,
        "scripted solutions earn 3 stars everywhere".into(),
    ));

    // A deliberate crash on level 5's spike. The earlier campaign already
    // completed levels 1-4 in this session's store, so reuse it.
    let unlocked_progress = session.progress().clone();
    let mut session = GameSession::new(LevelCatalog::builtin().unwrap(), unlocked_progress);
    session.start();
    if drive_to_building(&mut session, 5) {
        session.append_block(CommandKind::MoveForward);
        session.append_block(CommandKind::MoveForward);
        drive_run(&mut session);
        let message = session
            .last_result()
            .map(|r| r.message.clone())
            .unwrap_or_default();
        results.push(check(
            "campaign_spike_crash",
            session.phase() == SessionPhase::Failed && message == MSG_SPIKE,
            format!("failed with message {:?}", message),
        ));
    } else {
        results.push(check(
            "campaign_spike_crash",
            false,
            "level 5 not reachable".into(),
        ));
    }

    results
}

// ── 5. Randomized sessions ──────────────────────────────────────────────

fn validate_random_sessions(verbose: bool) -> Vec<TestResult> {
    println!("--- Randomized Sessions ---");
    let mut results = Vec::new();
    let mut rng = rand::thread_rng();

    // A roomy open level so random walks rarely end immediately.
    let json = r#"[{
        "id": 1, "name": "sandbox", "difficulty": 1,
        "grid": ["S.......", "........", "........", ".......G"],
        "start_dir": "right",
        "allowed_commands": [
            "move-forward", "move-backward", "turn-left", "turn-right",
            "jump", "wait", "interact", "loop-start", "loop-end"
        ],
        "max_blocks": 16, "optimal_blocks": 9, "goal": "reach-goal"
    }]"#;
    let catalog = match LevelCatalog::from_json(json) {
        Ok(c) => c,
        Err(e) => {
            results.push(check("fuzz_catalog", false, format!("{}", e)));
            return results;
        }
    };

    let kinds: Vec<CommandKind> = vec![
        CommandKind::MoveForward,
        CommandKind::MoveBackward,
        CommandKind::TurnLeft,
        CommandKind::TurnRight,
        CommandKind::Jump,
        CommandKind::Wait,
        CommandKind::Interact,
        CommandKind::LoopStart,
        CommandKind::LoopEnd,
    ];

    let mut all_terminated = true;
    let mut actor_in_bounds = true;
    let mut runs = 0;
    for _ in 0..300 {
        let mut session = GameSession::new(catalog.clone(), ProgressStore::new());
        session.start();
        if !drive_to_building(&mut session, 1) {
            all_terminated = false;
            break;
        }
        let block_count = rng.gen_range(1..=16);
        for _ in 0..block_count {
            let kind = *kinds.choose(&mut rng).unwrap();
            if let Some(id) = session.append_block(kind) {
                if kind == CommandKind::LoopStart {
                    session.set_loop_repeat(id, rng.gen_range(1..=10));
                }
            }
        }
        if session.program().is_empty() {
            continue;
        }
        if session.run().is_err() {
            // Over-cap expansion is a legitimate rejection; stay counted.
            continue;
        }
        runs += 1;

        let budget = session.stream_len() + 1;
        for _ in 0..budget {
            if session.phase() != SessionPhase::Executing {
                break;
            }
            session.tick();
        }
        if session.phase() == SessionPhase::Executing {
            all_terminated = false;
        }
        if let (Some(world), Some(level)) = (session.world(), session.level()) {
            if !level.in_bounds(world.actor.pos) {
                actor_in_bounds = false;
            }
        }
    }

    if verbose {
        println!("  {} randomized runs executed", runs);
    }
    results.push(check(
        "fuzz_runs_terminate",
        all_terminated && runs > 0,
        format!("{} runs, all terminal within stream length + 1", runs),
    ));
    results.push(check(
        "fuzz_actor_in_bounds",
        actor_in_bounds,
        "actor never left the grid".into(),
    ));

    results
}

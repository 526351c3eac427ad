//! Goal evaluation and scoring — turns a terminal run into stars, score,
//! and rewards.

use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::level::{GoalKind, LevelDefinition};

pub const MSG_GOAL_NOT_REACHED: &str = "Goal not reached";

const COIN_BONUS: u32 = 10;
const GEM_BONUS: u32 = 25;
const EFFICIENCY_BONUS: u32 = 5;
const BASE_PER_DIFFICULTY: u32 = 100;
const PERFECT_SPARK_BONUS: u32 = 25;

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub completed: bool,
    pub stars: u8,
    pub blocks_used: u32,
    pub optimal_blocks: u32,
    pub coins_collected: u32,
    pub gems_collected: u32,
    pub steps: u32,
    pub time_spent_secs: f32,
    pub score: u32,
    pub xp_earned: u32,
    pub sparks_earned: u32,
    pub is_perfect: bool,
    pub message: String,
}

/// Has the run's win condition been met at stream exhaustion?
pub fn goal_met(level: &LevelDefinition, actor: &Actor) -> bool {
    let at_goal = || level.goal_pos() == Some(actor.pos);
    let collected = || {
        actor.coins >= level.coins_required() && actor.gems >= level.gems_required()
    };
    match level.goal {
        GoalKind::ReachGoal => at_goal(),
        GoalKind::CollectAll => collected(),
        GoalKind::CollectAndReach => at_goal() && collected(),
    }
}

/// Star rating for a successful run. The 2-star threshold is 1.5x the
/// optimal block count, computed in integers rounding half up so that a
/// program of exactly round(1.5 * optimal) blocks still earns 2 stars.
pub fn star_rating(blocks_used: u32, optimal_blocks: u32) -> u8 {
    if blocks_used <= optimal_blocks {
        3
    } else if blocks_used <= (optimal_blocks * 3 + 1) / 2 {
        2
    } else {
        1
    }
}

/// Score a successful run.
pub fn score_success(
    level: &LevelDefinition,
    actor: &Actor,
    blocks_used: u32,
    steps: u32,
    time_spent_secs: f32,
    message: String,
) -> RunResult {
    let optimal = level.optimal_blocks as u32;
    let stars = star_rating(blocks_used, optimal);
    let score = BASE_PER_DIFFICULTY * level.difficulty as u32
        + actor.coins * COIN_BONUS
        + actor.gems * GEM_BONUS
        + optimal.saturating_sub(blocks_used) * EFFICIENCY_BONUS;
    let is_perfect = stars == 3
        && actor.coins >= level.coins_required()
        && actor.gems >= level.gems_required();
    let sparks = 20 * stars as u32
        + 5 * actor.coins
        + 10 * actor.gems
        + if is_perfect { PERFECT_SPARK_BONUS } else { 0 };

    RunResult {
        completed: true,
        stars,
        blocks_used,
        optimal_blocks: optimal,
        coins_collected: actor.coins,
        gems_collected: actor.gems,
        steps,
        time_spent_secs,
        score,
        xp_earned: 50 * stars as u32 + score / 10,
        sparks_earned: sparks,
        is_perfect,
        message,
    }
}

/// Score a failed run: no stars, no score, no rewards. The message is the
/// failing step's (or goal evaluation's) reason, kept for display.
pub fn score_failure(
    level: &LevelDefinition,
    actor: &Actor,
    blocks_used: u32,
    steps: u32,
    time_spent_secs: f32,
    message: String,
) -> RunResult {
    RunResult {
        completed: false,
        stars: 0,
        blocks_used,
        optimal_blocks: level.optimal_blocks as u32,
        coins_collected: actor.coins,
        gems_collected: actor.gems,
        steps,
        time_spent_secs,
        score: 0,
        xp_earned: 0,
        sparks_earned: 0,
        is_perfect: false,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Direction;
    use crate::block::CommandKind;
    use crate::grid::{GridPos, Tile, TileKind};

    fn level(goal: GoalKind) -> LevelDefinition {
        LevelDefinition {
            id: 1,
            name: "test".into(),
            difficulty: 2,
            rows: 3,
            cols: 3,
            tiles: vec![
                Tile::new(0, TileKind::Start, GridPos::new(0, 0)),
                Tile::new(1, TileKind::Coin, GridPos::new(0, 1)),
                Tile::new(2, TileKind::Goal, GridPos::new(0, 2)),
                Tile::new(3, TileKind::Gem, GridPos::new(1, 1)),
            ],
            start_pos: GridPos::new(0, 0),
            start_dir: Direction::Right,
            allowed_commands: vec![CommandKind::MoveForward],
            max_blocks: 10,
            optimal_blocks: 4,
            goal,
            required_coins: None,
            required_gems: None,
            hints: Vec::new(),
        }
    }

    fn actor_with(pos: GridPos, coins: u32, gems: u32) -> Actor {
        let mut a = Actor::at_start(pos, Direction::Right);
        a.coins = coins;
        a.gems = gems;
        a
    }

    #[test]
    fn reach_goal_checks_position_only() {
        let level = level(GoalKind::ReachGoal);
        assert!(goal_met(&level, &actor_with(GridPos::new(0, 2), 0, 0)));
        assert!(!goal_met(&level, &actor_with(GridPos::new(0, 1), 9, 9)));
    }

    #[test]
    fn collect_all_checks_counters_only() {
        let level = level(GoalKind::CollectAll);
        assert!(goal_met(&level, &actor_with(GridPos::new(0, 0), 1, 1)));
        assert!(!goal_met(&level, &actor_with(GridPos::new(0, 2), 0, 1)));
        assert!(!goal_met(&level, &actor_with(GridPos::new(0, 2), 1, 0)));
    }

    #[test]
    fn collect_and_reach_needs_every_clause() {
        let level = level(GoalKind::CollectAndReach);
        let goal = GridPos::new(0, 2);
        assert!(goal_met(&level, &actor_with(goal, 1, 1)));
        // Each unmet clause alone forces failure.
        assert!(!goal_met(&level, &actor_with(GridPos::new(0, 0), 1, 1)));
        assert!(!goal_met(&level, &actor_with(goal, 0, 1)));
        assert!(!goal_met(&level, &actor_with(goal, 1, 0)));
    }

    #[test]
    fn star_thresholds() {
        // optimal 4: 3 stars at <=4, 2 stars at <=6, 1 star beyond.
        assert_eq!(star_rating(3, 4), 3);
        assert_eq!(star_rating(4, 4), 3);
        assert_eq!(star_rating(6, 4), 2);
        assert_eq!(star_rating(7, 4), 1);
        // odd optimal: round(1.5 * 3) = 5 still earns 2 stars.
        assert_eq!(star_rating(5, 3), 2);
        assert_eq!(star_rating(6, 3), 1);
    }

    #[test]
    fn score_adds_bonuses() {
        let level = level(GoalKind::ReachGoal);
        let actor = actor_with(GridPos::new(0, 2), 2, 1);
        let result = score_success(&level, &actor, 3, 3, 1.0, "done".into());
        // 100*2 + 2*10 + 1*25 + (4-3)*5
        assert_eq!(result.score, 200 + 20 + 25 + 5);
        assert_eq!(result.stars, 3);
        assert!(result.completed);
    }

    #[test]
    fn perfect_needs_three_stars_and_thresholds() {
        let level = level(GoalKind::CollectAndReach);
        let goal = GridPos::new(0, 2);

        let full = score_success(&level, &actor_with(goal, 1, 1), 4, 4, 1.0, String::new());
        assert!(full.is_perfect);

        // 3 stars but a missing gem: not perfect.
        let missing = score_success(&level, &actor_with(goal, 1, 0), 4, 4, 1.0, String::new());
        assert!(!missing.is_perfect);

        // Everything collected but too many blocks: not perfect.
        let slow = score_success(&level, &actor_with(goal, 1, 1), 7, 7, 1.0, String::new());
        assert_eq!(slow.stars, 1);
        assert!(!slow.is_perfect);
    }

    #[test]
    fn failure_earns_nothing() {
        let level = level(GoalKind::ReachGoal);
        let actor = actor_with(GridPos::new(0, 1), 3, 2);
        let result = score_failure(&level, &actor, 5, 2, 1.0, MSG_GOAL_NOT_REACHED.into());
        assert!(!result.completed);
        assert_eq!(result.stars, 0);
        assert_eq!(result.score, 0);
        assert_eq!(result.xp_earned, 0);
        assert_eq!(result.sparks_earned, 0);
        // Collected counters are still reported for display.
        assert_eq!(result.coins_collected, 3);
        assert_eq!(result.message, MSG_GOAL_NOT_REACHED);
    }
}

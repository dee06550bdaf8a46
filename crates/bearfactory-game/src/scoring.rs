/*
[INPUT]:  Decision correctness, response time and active deadline
[OUTPUT]: Points per decision, accuracy and the terminal round summary
[POS]:    Scoring helpers shared by the round machine and leaderboard
[UPDATE]: When point values or accuracy rounding change
*/

use bearfactory_adapter::NewHighScore;
use std::time::Duration;

pub const BASE_POINTS: u32 = 100;
pub const MAX_SPEED_BONUS: u32 = 50;

/// Remaining share of the deadline, clamped to `[0, 1]`.
pub fn time_ratio(response_time: Duration, deadline: Duration) -> f64 {
    if deadline.is_zero() {
        return 0.0;
    }
    (1.0 - response_time.as_secs_f64() / deadline.as_secs_f64()).clamp(0.0, 1.0)
}

/// Points for one resolution. Wrong answers and misses score nothing.
pub fn points_for(correct: bool, response_time: Duration, deadline: Duration) -> u32 {
    if !correct {
        return 0;
    }
    let bonus = (time_ratio(response_time, deadline) * MAX_SPEED_BONUS as f64).floor() as u32;
    BASE_POINTS + bonus.min(MAX_SPEED_BONUS)
}

/// Percentage of correct sorts, rounded to two decimals.
pub fn accuracy_percent(correct_sorts: usize, total_tasks: usize) -> f64 {
    if total_tasks == 0 {
        return 0.0;
    }
    let raw = correct_sorts as f64 / total_tasks as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Terminal aggregate of a finished round; the only data the leaderboard sees.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub goal: String,
    pub score: u32,
    pub correct_sorts: usize,
    pub missed: usize,
    pub total_tasks: usize,
}

impl RoundSummary {
    pub fn accuracy(&self) -> f64 {
        accuracy_percent(self.correct_sorts, self.total_tasks)
    }

    pub fn to_high_score(&self, player_name: &str) -> NewHighScore {
        NewHighScore {
            player_name: player_name.trim().to_string(),
            score: self.score,
            goal: self.goal.clone(),
            accuracy: self.accuracy(),
            tasks_completed: self.total_tasks as u32,
        }
    }
}

/*
[INPUT]:  StartRound / Decide / Timeout / Reset messages with a caller-supplied clock
[OUTPUT]: Phase transitions, per-task resolutions and score, as events and snapshots
[POS]:    Core - round state machine
[UPDATE]: When phase rules, advance timing or scoring hooks change
[UPDATE]: 2026-09-02 Timers moved onto the machine as deadline instants
*/

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::GameError;
use crate::scoring::{points_for, RoundSummary};
use crate::speed::SpeedSchedule;
use crate::task::{Choice, Task, TaskId, UserChoice};
use crate::tour::{Tour, TourProgress, TourStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Input,
    Generating,
    Playing,
    Results,
}

/// Delays between resolution and what follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// From a decision to the next task becoming active.
    pub settle_delay: Duration,
    /// From the last task leaving the belt to the results screen.
    pub results_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            results_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub task_id: TaskId,
    pub choice: UserChoice,
    pub correct: bool,
    pub points: u32,
    pub response_time: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    PhaseChanged { from: Phase, to: Phase },
    TaskActivated { task_id: TaskId, index: usize, deadline: Duration },
    TaskResolved(Resolution),
    Tour(TourProgress),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotPlaying,
    NoActiveTask,
    NotActiveTask,
    AlreadyProcessed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecideOutcome {
    Resolved(Resolution),
    Tour(TourProgress),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Default)]
struct Round {
    goal: String,
    tasks: Vec<Task>,
    current_index: usize,
    score: u32,
    correct_sorts: usize,
    deadline: Duration,
}

impl Round {
    fn active_mut(&mut self) -> Option<&mut Task> {
        self.tasks.get_mut(self.current_index)
    }
}

#[derive(Debug, Clone, Copy)]
struct ArmedTimeout {
    task_id: TaskId,
    at: Instant,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct RoundSnapshot {
    pub phase: Phase,
    pub goal: String,
    pub tasks: Vec<Task>,
    pub current_index: usize,
    pub score: u32,
    pub correct_sorts: usize,
    pub total_tasks: usize,
    pub deadline: Duration,
    /// When the active task times out; `None` while settling or during the tour.
    pub active_deadline_at: Option<Instant>,
    pub tour: Tour,
    pub error: Option<String>,
}

impl RoundSnapshot {
    pub fn active_task(&self) -> Option<&Task> {
        if self.phase != Phase::Playing {
            return None;
        }
        self.tasks.get(self.current_index)
    }

    /// Most recently resolved task, for feedback flashes.
    pub fn last_resolved(&self) -> Option<&Task> {
        self.tasks.iter().rev().find(|task| task.processed())
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.active_deadline_at
            .map(|at| at.saturating_duration_since(now))
    }

    /// Terminal aggregate, available only in Results.
    pub fn summary(&self) -> Option<RoundSummary> {
        if self.phase != Phase::Results {
            return None;
        }
        Some(RoundSummary {
            goal: self.goal.clone(),
            score: self.score,
            correct_sorts: self.correct_sorts,
            missed: self
                .tasks
                .iter()
                .filter(|task| task.user_choice() == Some(UserChoice::Missed))
                .count(),
            total_tasks: self.total_tasks,
        })
    }
}

/// Single-owner state machine for one round at a time.
///
/// Every operation takes `now` from the caller; the machine never reads a
/// clock and never sleeps. Due timers are reported by [`next_wakeup`] and
/// fired by [`tick`].
///
/// [`next_wakeup`]: RoundMachine::next_wakeup
/// [`tick`]: RoundMachine::tick
#[derive(Debug)]
pub struct RoundMachine {
    phase: Phase,
    round: Round,
    schedule: SpeedSchedule,
    timing: Timing,
    tour: Tour,
    task_timeout: Option<ArmedTimeout>,
    advance_at: Option<Instant>,
    results_at: Option<Instant>,
    last_error: Option<String>,
    events: Vec<RoundEvent>,
}

impl Default for RoundMachine {
    fn default() -> Self {
        Self::new(SpeedSchedule::default(), Timing::default(), Tour::new())
    }
}

impl RoundMachine {
    pub fn new(schedule: SpeedSchedule, timing: Timing, tour: Tour) -> Self {
        Self {
            phase: Phase::Input,
            round: Round::default(),
            schedule,
            timing,
            tour,
            task_timeout: None,
            advance_at: None,
            results_at: None,
            last_error: None,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn goal(&self) -> &str {
        &self.round.goal
    }

    pub fn score(&self) -> u32 {
        self.round.score
    }

    pub fn correct_sorts(&self) -> usize {
        self.round.correct_sorts
    }

    pub fn total_tasks(&self) -> usize {
        self.round.tasks.len()
    }

    pub fn current_index(&self) -> usize {
        self.round.current_index
    }

    pub fn tasks(&self) -> &[Task] {
        &self.round.tasks
    }

    /// Active timeout duration for the current task.
    pub fn deadline(&self) -> Duration {
        self.round.deadline
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn active_task(&self) -> Option<&Task> {
        if self.phase != Phase::Playing {
            return None;
        }
        self.round.tasks.get(self.round.current_index)
    }

    /// Input -> Generating. The provider call runs outside the machine.
    pub fn begin_generating(&mut self, goal: &str) -> Result<(), GameError> {
        self.expect_phase(Phase::Input)?;
        let goal = goal.trim();
        if goal.is_empty() {
            self.last_error = Some(GameError::EmptyGoal.to_string());
            return Err(GameError::EmptyGoal);
        }
        self.round = Round {
            goal: goal.to_string(),
            ..Round::default()
        };
        self.last_error = None;
        self.set_phase(Phase::Generating);
        Ok(())
    }

    /// Generating -> Playing with the provider's tasks, or back to Input when empty.
    pub fn finish_generating(&mut self, tasks: Vec<Task>, now: Instant) -> Result<(), GameError> {
        self.expect_phase(Phase::Generating)?;
        if tasks.is_empty() {
            let err = GameError::EmptyTaskSet;
            self.fail_generating(&err);
            return Err(err);
        }

        self.round.tasks = tasks;
        self.round.current_index = 0;
        self.round.score = 0;
        self.round.correct_sorts = 0;
        self.set_phase(Phase::Playing);

        if self.tour.begin() {
            self.events
                .push(RoundEvent::Tour(TourProgress::Advanced(TourStep::Welcome)));
        }
        self.activate(0, now);
        Ok(())
    }

    /// Generating -> Input, keeping the failure for display.
    pub fn fail_generating(&mut self, err: &GameError) {
        if self.phase != Phase::Generating {
            return;
        }
        tracing::warn!(error = %err, goal = %self.round.goal, "round could not start");
        self.round = Round::default();
        self.last_error = Some(err.to_string());
        self.set_phase(Phase::Input);
    }

    /// Synchronous start with an already available task list.
    pub fn start_round(&mut self, goal: &str, tasks: Vec<Task>, now: Instant) -> Result<(), GameError> {
        if tasks.is_empty() {
            self.expect_phase(Phase::Input)?;
            return Err(GameError::EmptyTaskSet);
        }
        self.begin_generating(goal)?;
        self.finish_generating(tasks, now)
    }

    pub fn decide(&mut self, task_id: TaskId, choice: Choice, now: Instant) -> DecideOutcome {
        if self.phase != Phase::Playing {
            return self.ignore(task_id, IgnoreReason::NotPlaying);
        }
        if self.tour.is_active() {
            let progress = self.tour.press(choice);
            self.on_tour_progress(progress, now);
            return DecideOutcome::Tour(progress);
        }

        let deadline = self.round.deadline;
        let Some(task) = self.round.active_mut() else {
            return self.ignore(task_id, IgnoreReason::NoActiveTask);
        };
        if task.id() != task_id {
            let reason = if self.round.tasks.iter().any(|t| t.id() == task_id && t.processed()) {
                IgnoreReason::AlreadyProcessed
            } else {
                IgnoreReason::NotActiveTask
            };
            return self.ignore(task_id, reason);
        }
        if task.processed() {
            return self.ignore(task_id, IgnoreReason::AlreadyProcessed);
        }

        let response_time = task
            .start_time()
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        let correct = task.is_correct(choice);
        let points = points_for(correct, response_time, deadline);
        task.resolve(choice.into(), response_time);

        self.round.score += points;
        if correct {
            self.round.correct_sorts += 1;
        }
        self.task_timeout = None;
        self.advance_at = Some(now + self.timing.settle_delay);

        let resolution = Resolution {
            task_id,
            choice: choice.into(),
            correct,
            points,
            response_time,
        };
        tracing::debug!(
            task_id = %task_id,
            choice = ?choice,
            correct,
            points,
            score = self.round.score,
            "task decided"
        );
        self.events.push(RoundEvent::TaskResolved(resolution.clone()));
        DecideOutcome::Resolved(resolution)
    }

    /// The active task's deadline elapsed. Returns whether anything changed.
    pub fn timeout(&mut self, task_id: TaskId, now: Instant) -> bool {
        if self.phase != Phase::Playing || self.tour.is_active() {
            tracing::debug!(task_id = %task_id, phase = ?self.phase, "timeout ignored");
            return false;
        }
        let deadline = self.round.deadline;
        let Some(task) = self.round.active_mut() else {
            return false;
        };
        if task.id() != task_id || !task.resolve(UserChoice::Missed, deadline) {
            tracing::debug!(task_id = %task_id, "timeout for resolved or inactive task ignored");
            return false;
        }

        self.task_timeout = None;
        tracing::debug!(task_id = %task_id, "task missed");
        self.events.push(RoundEvent::TaskResolved(Resolution {
            task_id,
            choice: UserChoice::Missed,
            correct: false,
            points: 0,
            response_time: deadline,
        }));
        self.advance(now);
        true
    }

    pub fn tour_next(&mut self, now: Instant) -> TourProgress {
        if self.phase != Phase::Playing {
            return TourProgress::Ignored;
        }
        let progress = self.tour.next();
        self.on_tour_progress(progress, now);
        progress
    }

    pub fn skip_tour(&mut self, now: Instant) -> TourProgress {
        if self.phase != Phase::Playing {
            return TourProgress::Ignored;
        }
        let progress = self.tour.skip();
        self.on_tour_progress(progress, now);
        progress
    }

    /// Any phase -> Input. Discards the round and every pending timer.
    pub fn reset(&mut self) {
        self.round = Round::default();
        self.task_timeout = None;
        self.advance_at = None;
        self.results_at = None;
        self.last_error = None;
        self.tour.reset();
        if self.phase != Phase::Input {
            self.set_phase(Phase::Input);
        }
    }

    /// Earliest pending timer, if any.
    pub fn next_wakeup(&self) -> Option<Instant> {
        [
            self.task_timeout.map(|armed| armed.at),
            self.advance_at,
            self.results_at,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Fire every timer due at `now`.
    pub fn tick(&mut self, now: Instant) {
        while let Some(due) = self.next_wakeup() {
            if due > now {
                break;
            }
            self.fire_due(now);
        }
    }

    pub fn take_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            goal: self.round.goal.clone(),
            tasks: self.round.tasks.clone(),
            current_index: self.round.current_index,
            score: self.round.score,
            correct_sorts: self.round.correct_sorts,
            total_tasks: self.round.tasks.len(),
            deadline: self.round.deadline,
            active_deadline_at: self.task_timeout.map(|armed| armed.at),
            tour: self.tour,
            error: self.last_error.clone(),
        }
    }

    pub fn summary(&self) -> Option<RoundSummary> {
        self.snapshot().summary()
    }

    fn fire_due(&mut self, now: Instant) {
        if let Some(armed) = self.task_timeout.filter(|armed| armed.at <= now) {
            self.timeout(armed.task_id, now);
            return;
        }
        if self.advance_at.is_some_and(|at| at <= now) {
            self.advance(now);
            return;
        }
        if self.results_at.is_some_and(|at| at <= now) {
            self.results_at = None;
            tracing::info!(
                goal = %self.round.goal,
                score = self.round.score,
                correct_sorts = self.round.correct_sorts,
                total_tasks = self.round.tasks.len(),
                "round finished"
            );
            self.set_phase(Phase::Results);
        }
    }

    fn advance(&mut self, now: Instant) {
        self.advance_at = None;
        let next = self.round.current_index + 1;
        if next >= self.round.tasks.len() {
            self.round.current_index = self.round.tasks.len();
            self.results_at = Some(now + self.timing.results_delay);
        } else {
            self.activate(next, now);
        }
    }

    fn activate(&mut self, index: usize, now: Instant) {
        let total = self.round.tasks.len();
        self.round.current_index = index;
        self.round.deadline = self.schedule.deadline(index, total);
        if !self.tour.is_active() {
            self.go_live(now);
        }
    }

    /// Stamp and arm the current task.
    fn go_live(&mut self, now: Instant) {
        let index = self.round.current_index;
        let deadline = self.round.deadline;
        let Some(task) = self.round.active_mut() else {
            return;
        };
        if task.processed() {
            return;
        }
        task.stamp_start(now);
        let task_id = task.id();
        self.task_timeout = Some(ArmedTimeout {
            task_id,
            at: now + deadline,
        });
        tracing::debug!(task_id = %task_id, index, deadline_ms = deadline.as_millis() as u64, "task active");
        self.events.push(RoundEvent::TaskActivated {
            task_id,
            index,
            deadline,
        });
    }

    fn on_tour_progress(&mut self, progress: TourProgress, now: Instant) {
        if progress == TourProgress::Ignored {
            return;
        }
        self.events.push(RoundEvent::Tour(progress));
        if progress == TourProgress::Finished {
            self.go_live(now);
        }
    }

    fn ignore(&self, task_id: TaskId, reason: IgnoreReason) -> DecideOutcome {
        tracing::debug!(task_id = %task_id, reason = ?reason, phase = ?self.phase, "decision ignored");
        DecideOutcome::Ignored(reason)
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        self.phase = to;
        tracing::info!(from = ?from, to = ?to, "phase changed");
        self.events.push(RoundEvent::PhaseChanged { from, to });
    }
}

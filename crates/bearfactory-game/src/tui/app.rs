/*
[INPUT]:  Session snapshots and events, leaderboard store, keyboard-driven text fields
[OUTPUT]: AppState consumed by the renderers and key handlers
[POS]:    TUI app state and snapshot management
[UPDATE]: When adding screens or per-screen state
*/

use std::sync::Arc;
use std::time::Duration;

use bearfactory_adapter::HighScore;
use bearfactory_game::leaderboard::{LeaderboardStore, ScoreSubmission};
use bearfactory_game::round::{Phase, Resolution, RoundEvent, RoundSnapshot};
use bearfactory_game::session::SessionHandle;
use bearfactory_game::task::{Choice, UserChoice};
use tokio::time::Instant;
use tui_input::Input;

use crate::tui::LogBufferHandle;

const FEEDBACK_DURATION: Duration = Duration::from_millis(700);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tab {
    Game,
    Leaderboard,
    Logs,
}

impl Tab {
    pub(super) const ALL: [Tab; 3] = [Tab::Game, Tab::Leaderboard, Tab::Logs];

    pub(super) fn title(self) -> &'static str {
        match self {
            Tab::Game => "Game",
            Tab::Leaderboard => "Leaderboard",
            Tab::Logs => "Logs",
        }
    }

    pub(super) fn index(self) -> usize {
        match self {
            Tab::Game => 0,
            Tab::Leaderboard => 1,
            Tab::Logs => 2,
        }
    }
}

/// Flash shown over the belt after a task resolves.
#[derive(Debug, Clone)]
pub(super) struct Feedback {
    pub(super) choice: UserChoice,
    pub(super) correct: bool,
    pub(super) points: u32,
    pub(super) until: Instant,
}

pub(super) struct AppState {
    pub(super) session: SessionHandle,
    pub(super) leaderboard: Arc<dyn LeaderboardStore>,
    pub(super) leaderboard_limit: usize,
    pub(super) log_buffer: LogBufferHandle,
    pub(super) current_tab: Tab,
    pub(super) snapshot: RoundSnapshot,
    pub(super) goal_input: Input,
    pub(super) name_input: Input,
    pub(super) submission: Option<ScoreSubmission>,
    pub(super) high_scores: Vec<HighScore>,
    pub(super) feedback: Option<Feedback>,
    pub(super) status_message: String,
}

impl AppState {
    pub(super) fn new(
        session: SessionHandle,
        leaderboard: Arc<dyn LeaderboardStore>,
        leaderboard_limit: usize,
        log_buffer: LogBufferHandle,
    ) -> Self {
        let snapshot = session.snapshot();
        Self {
            session,
            leaderboard,
            leaderboard_limit,
            log_buffer,
            current_tab: Tab::Game,
            snapshot,
            goal_input: Input::default(),
            name_input: Input::default(),
            submission: None,
            high_scores: Vec::new(),
            feedback: None,
            status_message: "Type a goal and press Enter".to_string(),
        }
    }

    pub(super) fn next_tab(&mut self) -> Tab {
        let next = Tab::ALL[(self.current_tab.index() + 1) % Tab::ALL.len()];
        self.current_tab = next;
        next
    }

    /// Pull the latest snapshot and open or close the save form with the phase.
    pub(super) fn refresh_snapshot(&mut self) {
        let snapshot = self.session.snapshot();
        match snapshot.summary() {
            Some(summary) if self.submission.is_none() => {
                self.status_message = "Enter your name and press Enter to save".to_string();
                self.submission = Some(ScoreSubmission::new(summary));
            }
            Some(_) => {}
            None => self.submission = None,
        }
        if let Some(error) = snapshot.error.as_ref() {
            if self.snapshot.error.as_ref() != Some(error) {
                self.status_message = format!("could not start round: {error}");
            }
        }
        self.snapshot = snapshot;
    }

    pub(super) fn on_round_event(&mut self, event: RoundEvent) {
        if let RoundEvent::TaskResolved(Resolution {
            choice,
            correct,
            points,
            ..
        }) = event
        {
            self.feedback = Some(Feedback {
                choice,
                correct,
                points,
                until: Instant::now() + FEEDBACK_DURATION,
            });
        }
    }

    pub(super) fn active_feedback(&self) -> Option<&Feedback> {
        self.feedback
            .as_ref()
            .filter(|feedback| feedback.until > Instant::now())
    }

    pub(super) async fn start_round(&mut self) {
        let goal = self.goal_input.value().trim().to_string();
        if goal.is_empty() {
            self.status_message = "goal must not be empty".to_string();
            return;
        }
        match self.session.start_round(goal).await {
            Ok(()) => self.status_message = "Generating tasks...".to_string(),
            Err(err) => self.status_message = format!("start round failed: {err}"),
        }
    }

    pub(super) async fn decide(&mut self, choice: Choice) {
        let Some(task_id) = self.snapshot.active_task().map(|task| task.id()) else {
            return;
        };
        if let Err(err) = self.session.decide(task_id, choice).await {
            self.status_message = format!("decision failed: {err}");
        }
    }

    pub(super) async fn tour_next(&mut self) {
        if let Err(err) = self.session.tour_next().await {
            self.status_message = format!("tour failed: {err}");
        }
    }

    pub(super) async fn skip_tour(&mut self) {
        if let Err(err) = self.session.skip_tour().await {
            self.status_message = format!("tour failed: {err}");
        }
    }

    pub(super) async fn reset(&mut self) {
        match self.session.reset().await {
            Ok(()) => {
                self.feedback = None;
                self.status_message = "Type a goal and press Enter".to_string();
            }
            Err(err) => self.status_message = format!("reset failed: {err}"),
        }
    }

    pub(super) async fn save_score(&mut self) {
        let Some(submission) = self.submission.as_mut() else {
            return;
        };
        let name = self.name_input.value().to_string();
        let result = submission
            .submit(self.leaderboard.as_ref(), &name)
            .await
            .map(|row| format!("Saved {} points for {}", row.score, row.player_name));
        match result {
            Ok(message) => {
                self.status_message = message;
                self.refresh_scores().await;
            }
            Err(err) if err.is_retryable() => {
                self.status_message = format!("{err} (press Enter to retry)");
            }
            Err(err) => self.status_message = err.to_string(),
        }
    }

    pub(super) async fn refresh_scores(&mut self) {
        match self.leaderboard.top(self.leaderboard_limit).await {
            Ok(rows) => self.high_scores = rows,
            Err(err) => self.status_message = format!("load leaderboard failed: {err}"),
        }
    }

    pub(super) fn phase(&self) -> Phase {
        self.snapshot.phase
    }
}

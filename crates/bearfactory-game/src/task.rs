/*
[INPUT]:  Task text and ground-truth relevance from a task provider
[OUTPUT]: Task records with set-once resolution and timing fields
[POS]:    Domain model - one item on the conveyor belt
[UPDATE]: When task fields or resolution rules change
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Unique per task and never reused across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A player intent: drop the task in the toolbox or the trash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Keep,
    Toss,
}

/// How a task was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserChoice {
    Keep,
    Toss,
    Missed,
}

impl From<Choice> for UserChoice {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Keep => UserChoice::Keep,
            Choice::Toss => UserChoice::Toss,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    key: String,
    text: String,
    is_relevant: bool,
    user_choice: Option<UserChoice>,
    start_time: Option<Instant>,
    response_time: Option<Duration>,
}

impl Task {
    /// `key` is the provider's short label (`r0`, `ir3`, ...), kept for display and logs.
    pub fn new(key: impl Into<String>, text: impl Into<String>, is_relevant: bool) -> Self {
        Self {
            id: TaskId::new(),
            key: key.into(),
            text: text.into(),
            is_relevant,
            user_choice: None,
            start_time: None,
            response_time: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_relevant(&self) -> bool {
        self.is_relevant
    }

    /// True exactly when a choice has been recorded.
    pub fn processed(&self) -> bool {
        self.user_choice.is_some()
    }

    pub fn user_choice(&self) -> Option<UserChoice> {
        self.user_choice
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    pub fn response_time(&self) -> Option<Duration> {
        self.response_time
    }

    /// Whether `choice` classifies this task correctly.
    pub fn is_correct(&self, choice: Choice) -> bool {
        (choice == Choice::Keep) == self.is_relevant
    }

    /// Whether the recorded resolution was a correct classification.
    pub fn was_sorted_correctly(&self) -> bool {
        match self.user_choice {
            Some(UserChoice::Keep) => self.is_relevant,
            Some(UserChoice::Toss) => !self.is_relevant,
            Some(UserChoice::Missed) | None => false,
        }
    }

    /// Stamp the activation time. Later calls keep the first stamp.
    pub(crate) fn stamp_start(&mut self, now: Instant) -> bool {
        if self.start_time.is_some() {
            return false;
        }
        self.start_time = Some(now);
        true
    }

    /// Record the resolution. Returns `false` and changes nothing if already resolved.
    pub(crate) fn resolve(&mut self, choice: UserChoice, response_time: Duration) -> bool {
        if self.processed() {
            return false;
        }
        self.user_choice = Some(choice);
        self.response_time = Some(response_time);
        true
    }
}

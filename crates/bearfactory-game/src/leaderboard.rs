/*
[INPUT]:  Finished round summaries and a player name
[OUTPUT]: Saved high score rows and top-N listings
[POS]:    Collaborator seam - leaderboard store plus once-per-round save guard
[UPDATE]: When adding stores or changing save rules
*/

use async_trait::async_trait;
use bearfactory_adapter::{FactoryClient, HighScore, NewHighScore};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::GameError;
use crate::scoring::RoundSummary;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn save(&self, entry: NewHighScore) -> Result<HighScore, GameError>;

    /// Best scores first.
    async fn top(&self, limit: usize) -> Result<Vec<HighScore>, GameError>;
}

/// The hosted `high_scores` table.
#[derive(Debug, Clone)]
pub struct RemoteLeaderboard {
    client: Arc<FactoryClient>,
}

impl RemoteLeaderboard {
    pub fn new(client: Arc<FactoryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LeaderboardStore for RemoteLeaderboard {
    async fn save(&self, entry: NewHighScore) -> Result<HighScore, GameError> {
        let row = self
            .client
            .insert_high_score(&entry)
            .await
            .map_err(GameError::PersistenceFailure)?;
        tracing::info!(player = %row.player_name, score = row.score, "high score saved");
        Ok(row)
    }

    async fn top(&self, limit: usize) -> Result<Vec<HighScore>, GameError> {
        self.client
            .top_high_scores(limit)
            .await
            .map_err(GameError::PersistenceFailure)
    }
}

/// Process-local table for sessions without a hosted store.
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    rows: Mutex<Vec<HighScore>>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaderboardStore for MemoryLeaderboard {
    async fn save(&self, entry: NewHighScore) -> Result<HighScore, GameError> {
        let row = HighScore {
            id: Uuid::new_v4().to_string(),
            player_name: entry.player_name,
            score: entry.score,
            goal: entry.goal,
            accuracy: entry.accuracy,
            tasks_completed: entry.tasks_completed,
            created_at: Utc::now(),
        };
        let mut rows = self.rows.lock().await;
        rows.push(row.clone());
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(row)
    }

    async fn top(&self, limit: usize) -> Result<Vec<HighScore>, GameError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().take(limit).cloned().collect())
    }
}

/// Save guard for one finished round: non-empty name, at most one successful save.
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    summary: RoundSummary,
    saved: Option<HighScore>,
}

impl ScoreSubmission {
    pub fn new(summary: RoundSummary) -> Self {
        Self {
            summary,
            saved: None,
        }
    }

    pub fn summary(&self) -> &RoundSummary {
        &self.summary
    }

    pub fn saved(&self) -> Option<&HighScore> {
        self.saved.as_ref()
    }

    pub fn is_saved(&self) -> bool {
        self.saved.is_some()
    }

    /// A failed save leaves the submission open for a retry.
    pub async fn submit<S>(&mut self, store: &S, player_name: &str) -> Result<&HighScore, GameError>
    where
        S: LeaderboardStore + ?Sized,
    {
        if self.saved.is_some() {
            return Err(GameError::AlreadySaved);
        }
        if player_name.trim().is_empty() {
            return Err(GameError::MissingPlayerName);
        }
        let row = store.save(self.summary.to_high_score(player_name)).await?;
        Ok(&*self.saved.insert(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bearfactory_adapter::FactoryError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn summary(score: u32) -> RoundSummary {
        RoundSummary {
            goal: "Train for a marathon".to_string(),
            score,
            correct_sorts: 7,
            missed: 2,
            total_tasks: 10,
        }
    }

    /// Fails the first `failures` saves, then delegates to memory.
    struct FlakyStore {
        failures: AtomicUsize,
        inner: MemoryLeaderboard,
    }

    #[async_trait]
    impl LeaderboardStore for FlakyStore {
        async fn save(&self, entry: NewHighScore) -> Result<HighScore, GameError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(GameError::PersistenceFailure(FactoryError::Timeout { duration: 30 }));
            }
            self.inner.save(entry).await
        }

        async fn top(&self, limit: usize) -> Result<Vec<HighScore>, GameError> {
            self.inner.top(limit).await
        }
    }

    #[tokio::test]
    async fn test_memory_leaderboard_sorts_desc() {
        let store = MemoryLeaderboard::new();
        for score in [300, 1200, 800] {
            store.save(summary(score).to_high_score("Bruno")).await.unwrap();
        }
        let scores: Vec<u32> = store.top(2).await.unwrap().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1200, 800]);
    }

    #[tokio::test]
    async fn test_submission_saves_once() {
        let store = MemoryLeaderboard::new();
        let mut submission = ScoreSubmission::new(summary(900));

        let row = submission.submit(&store, " Honey ").await.unwrap();
        assert_eq!(row.player_name, "Honey");
        assert_eq!(row.accuracy, 70.0);

        let err = submission.submit(&store, "Honey").await.unwrap_err();
        assert!(matches!(err, GameError::AlreadySaved));
        assert_eq!(store.top(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submission_requires_name() {
        let store = MemoryLeaderboard::new();
        let mut submission = ScoreSubmission::new(summary(900));
        let err = submission.submit(&store, "   ").await.unwrap_err();
        assert!(matches!(err, GameError::MissingPlayerName));
        assert!(!submission.is_saved());
    }

    #[tokio::test]
    async fn test_failed_save_does_not_consume_the_round() {
        let store = FlakyStore {
            failures: AtomicUsize::new(1),
            inner: MemoryLeaderboard::new(),
        };
        let mut submission = ScoreSubmission::new(summary(450));

        let err = submission.submit(&store, "Kodiak").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!submission.is_saved());

        submission.submit(&store, "Kodiak").await.unwrap();
        assert!(submission.is_saved());
        assert_eq!(submission.summary().score, 450);
    }
}

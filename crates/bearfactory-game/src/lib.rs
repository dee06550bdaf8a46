/*
[INPUT]:  Public API exports for the bearfactory-game crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod error;
pub mod leaderboard;
pub mod provider;
pub mod round;
pub mod scoring;
pub mod session;
pub mod speed;
pub mod task;
pub mod tour;

// Re-export main types for convenience
pub use config::GameConfig;
pub use error::GameError;
pub use leaderboard::{LeaderboardStore, MemoryLeaderboard, RemoteLeaderboard, ScoreSubmission};
pub use provider::{FallbackTaskProvider, RemoteTaskProvider, StaticTaskProvider, TaskProvider};
pub use round::{Phase, RoundEvent, RoundMachine, RoundSnapshot, Timing};
pub use scoring::RoundSummary;
pub use session::{GameSession, SessionCommand, SessionHandle};
pub use speed::SpeedSchedule;
pub use task::{Choice, Task, TaskId, UserChoice};
pub use tour::{Tour, TourProgress, TourStep};

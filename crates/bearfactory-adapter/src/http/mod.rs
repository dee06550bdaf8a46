/*
[INPUT]:  HTTP client configuration, API keys and endpoint paths
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - Gemini and Supabase REST communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod generate;
pub mod leaderboard;

pub use error::{FactoryError, Result};

pub use client::{ClientConfig, Credentials, FactoryClient};
pub use generate::{TASKS_PER_LABEL, parse_generated_tasks, task_prompt};

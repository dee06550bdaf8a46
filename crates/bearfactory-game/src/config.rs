/*
[INPUT]:  YAML configuration file and BEARFACTORY_* environment variables
[OUTPUT]: Validated game configuration and the collaborators built from it
[POS]:    Configuration layer - startup wiring
[UPDATE]: When adding new configuration options
[UPDATE]: 2026-09-04 Layer environment variables over the YAML file
*/

use anyhow::{Context, Result, bail};
use bearfactory_adapter::{ClientConfig, Credentials, DEFAULT_MODEL, FactoryClient, GENERATION_BASE_URL};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::leaderboard::{DEFAULT_LEADERBOARD_LIMIT, LeaderboardStore, MemoryLeaderboard, RemoteLeaderboard};
use crate::provider::{FallbackTaskProvider, RemoteTaskProvider, TaskProvider};
use crate::round::{RoundMachine, Timing};
use crate::speed::{FINAL_SPEED, FINAL_STRETCH, INITIAL_SPEED, SpeedSchedule};
use crate::tour::Tour;

pub const ENV_PREFIX: &str = "BEARFACTORY";
const CONFIG_FILE_NAME: &str = "config.yaml";
/// Upper bound for belt speeds, in seconds.
pub const MAX_SPEED_SECS: f64 = 3600.0;
/// Upper bound for settle and results delays, in milliseconds.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Top-level configuration for the game binary
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GameConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub game: RoundConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Task text generation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Gemini API key; without it every round uses the fallback list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Override for the generation API root, mostly for tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Hosted high score table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LeaderboardConfig {
    /// Supabase project URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    #[serde(default = "default_leaderboard_limit")]
    pub limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            limit: default_leaderboard_limit(),
        }
    }
}

/// Belt speed, delays and onboarding
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoundConfig {
    #[serde(default = "default_initial_speed_secs")]
    pub initial_speed_secs: f64,
    #[serde(default = "default_final_speed_secs")]
    pub final_speed_secs: f64,
    #[serde(default = "default_final_stretch")]
    pub final_stretch: usize,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_results_delay_ms")]
    pub results_delay_ms: u64,
    /// Show the practice tour before the first round
    #[serde(default = "default_tour")]
    pub tour: bool,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            initial_speed_secs: default_initial_speed_secs(),
            final_speed_secs: default_final_speed_secs(),
            final_stretch: default_final_stretch(),
            settle_delay_ms: default_settle_delay_ms(),
            results_delay_ms: default_results_delay_ms(),
            tour: default_tour(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files; terminal-only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_leaderboard_limit() -> usize {
    DEFAULT_LEADERBOARD_LIMIT
}

fn default_initial_speed_secs() -> f64 {
    INITIAL_SPEED.as_secs_f64()
}

fn default_final_speed_secs() -> f64 {
    FINAL_SPEED.as_secs_f64()
}

fn default_final_stretch() -> usize {
    FINAL_STRETCH
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_results_delay_ms() -> u64 {
    1000
}

fn default_tour() -> bool {
    true
}

impl GameConfig {
    /// `<config dir>/bearfactory/config.yaml`, used when no `--config` is given.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bearfactory").join(CONFIG_FILE_NAME))
    }

    /// Load from an optional YAML file, then apply `BEARFACTORY_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    pub(crate) fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }
        let settings = builder
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()
            .context("build configuration")?;
        let config: Self = settings
            .try_deserialize()
            .context("deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let game = &self.game;
        if !(game.final_speed_secs > 0.0) {
            bail!("game.final_speed_secs must be positive");
        }
        if !(game.initial_speed_secs <= MAX_SPEED_SECS) {
            bail!("game.initial_speed_secs must be at most {MAX_SPEED_SECS}");
        }
        if game.initial_speed_secs < game.final_speed_secs {
            bail!("game.initial_speed_secs must be at least game.final_speed_secs");
        }
        if game.settle_delay_ms > MAX_DELAY_MS {
            bail!("game.settle_delay_ms must be at most {MAX_DELAY_MS}");
        }
        if game.results_delay_ms > MAX_DELAY_MS {
            bail!("game.results_delay_ms must be at most {MAX_DELAY_MS}");
        }
        if self.provider.model.trim().is_empty() {
            bail!("provider.model must not be empty");
        }
        if self.provider.timeout_secs == 0 {
            bail!("provider.timeout_secs must be positive");
        }
        if self.leaderboard.limit == 0 {
            bail!("leaderboard.limit must be positive");
        }
        if self.leaderboard.url.is_some() != self.leaderboard.anon_key.is_some() {
            bail!("leaderboard.url and leaderboard.anon_key must be set together");
        }
        Ok(())
    }

    pub fn schedule(&self) -> SpeedSchedule {
        SpeedSchedule::new(
            Duration::from_secs_f64(self.game.initial_speed_secs),
            Duration::from_secs_f64(self.game.final_speed_secs),
            self.game.final_stretch,
        )
    }

    pub fn timing(&self) -> Timing {
        Timing {
            settle_delay: Duration::from_millis(self.game.settle_delay_ms),
            results_delay: Duration::from_millis(self.game.results_delay_ms),
        }
    }

    pub fn tour(&self) -> Tour {
        if self.game.tour { Tour::new() } else { Tour::completed() }
    }

    pub fn machine(&self) -> RoundMachine {
        RoundMachine::new(self.schedule(), self.timing(), self.tour())
    }

    /// HTTP client for both remote collaborators
    pub fn client(&self) -> Result<FactoryClient> {
        let client_config = ClientConfig {
            timeout: Duration::from_secs(self.provider.timeout_secs),
            ..ClientConfig::default()
        };
        let base_url = self.provider.base_url.as_deref().unwrap_or(GENERATION_BASE_URL);
        let mut client = FactoryClient::with_config_and_base_urls(
            client_config,
            base_url,
            self.leaderboard.url.as_deref(),
        )
        .context("build http client")?;
        client.set_model(self.provider.model.clone());
        client.set_credentials(Credentials {
            gemini_api_key: self.provider.api_key.clone(),
            supabase_anon_key: self.leaderboard.anon_key.clone(),
        });
        Ok(client)
    }

    /// Remote generation with the static list as a safety net
    pub fn task_provider(&self, client: Arc<FactoryClient>) -> Arc<dyn TaskProvider> {
        if self.provider.api_key.is_none() {
            tracing::warn!("no provider.api_key configured; rounds will use the fallback list");
        }
        Arc::new(FallbackTaskProvider::new(RemoteTaskProvider::new(client)))
    }

    /// Hosted table when configured, otherwise an in-memory one for this process
    pub fn leaderboard_store(&self, client: Arc<FactoryClient>) -> Arc<dyn LeaderboardStore> {
        if client.has_leaderboard() {
            Arc::new(RemoteLeaderboard::new(client))
        } else {
            tracing::info!("no leaderboard configured; scores are kept in memory");
            Arc::new(MemoryLeaderboard::new())
        }
    }
}

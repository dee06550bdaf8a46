/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When GameConfig schema changes
*/

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};
use std::path::{Path, PathBuf};

use bearfactory_game::config::{GameConfig, LeaderboardConfig, LoggingConfig, ProviderConfig};

pub fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to Bear's Task Factory").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a game configuration.").dim()
    );

    if output.exists() {
        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            bail!("refusing to overwrite {}", output.display());
        }
    }

    let config = prompt_config()?;
    write_config(&config, &output)?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );
    println!(
        "Start playing with: {}",
        style(format!("bearfactory --config {} play", output.display())).cyan()
    );

    Ok(())
}

fn prompt_config() -> Result<GameConfig> {
    let theme = ColorfulTheme::default();
    let mut config = GameConfig::default();

    println!("\n{}", style("--- Task generation ---").bold());
    let api_key = Password::with_theme(&theme)
        .with_prompt("Gemini API key (empty to always use the built-in tasks)")
        .allow_empty_password(true)
        .interact()?;
    let model: String = Input::with_theme(&theme)
        .with_prompt("Model")
        .default(config.provider.model.clone())
        .interact_text()?;
    config.provider = ProviderConfig {
        api_key: non_empty(api_key),
        model,
        ..config.provider
    };

    println!("\n{}", style("--- Leaderboard ---").bold());
    let hosted = Confirm::with_theme(&theme)
        .with_prompt("Use a hosted Supabase leaderboard?")
        .default(false)
        .interact()?;
    if hosted {
        let url: String = Input::with_theme(&theme)
            .with_prompt("Supabase project URL")
            .validate_with(|value: &String| -> std::result::Result<(), &str> {
                if value.starts_with("https://") || value.starts_with("http://") {
                    Ok(())
                } else {
                    Err("URL must start with http:// or https://")
                }
            })
            .interact_text()?;
        let anon_key = Password::with_theme(&theme)
            .with_prompt("Supabase anon key")
            .interact()?;
        config.leaderboard = LeaderboardConfig {
            url: Some(url),
            anon_key: Some(anon_key),
            ..config.leaderboard
        };
    }

    println!("\n{}", style("--- Game ---").bold());
    config.game.tour = Confirm::with_theme(&theme)
        .with_prompt("Show the practice tour before the first round?")
        .default(true)
        .interact()?;

    let log_dir: String = Input::with_theme(&theme)
        .with_prompt("Log directory (empty for none)")
        .allow_empty(true)
        .interact_text()?;
    config.logging = LoggingConfig {
        directory: non_empty(log_dir).map(PathBuf::from),
    };

    config.validate()?;
    Ok(config)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn write_config(config: &GameConfig, output: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("failed to serialize config to YAML")?;
    std::fs::write(output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;
    Ok(())
}

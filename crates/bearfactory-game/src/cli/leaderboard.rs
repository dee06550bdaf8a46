/*
[INPUT]:  Leaderboard store and row limit
[OUTPUT]: Top scores printed to stdout
[POS]:    CLI leaderboard listing
[UPDATE]: When high score columns change
*/

use anyhow::{Context, Result};
use bearfactory_adapter::HighScore;
use console::style;

use bearfactory_game::leaderboard::LeaderboardStore;

pub async fn run_leaderboard(store: &dyn LeaderboardStore, limit: usize) -> Result<()> {
    let rows = store.top(limit).await.context("load leaderboard")?;
    println!("{}", style(format!("Top {limit} sorters")).bold().cyan());
    if rows.is_empty() {
        println!("{}", style("No scores yet.").yellow());
        return Ok(());
    }
    for line in format_rows(&rows) {
        println!("{line}");
    }
    Ok(())
}

fn format_rows(rows: &[HighScore]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(rank, row)| {
            format!(
                "{:>3}. {:<16} {:>6}  {:>6.2}%  {:>3} tasks  {}",
                rank + 1,
                row.player_name,
                row.score,
                row.accuracy,
                row.tasks_completed,
                row.goal
            )
        })
        .collect()
}

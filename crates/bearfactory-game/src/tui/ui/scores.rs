/*
[INPUT]:  Top-N high score rows
[OUTPUT]: Leaderboard table
[POS]:    TUI UI leaderboard panel
[UPDATE]: When high score columns change
*/

use bearfactory_adapter::HighScore;
use ratatui::layout::Constraint;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::tui::runtime::border_style;

pub(in crate::tui) fn draw_high_scores(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    rows: &[HighScore],
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Top Sorters");

    if rows.is_empty() {
        let empty = Paragraph::new("No scores yet. Finish a round and save yours!").block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Player"),
        Cell::from("Score"),
        Cell::from("Accuracy"),
        Cell::from("Tasks"),
        Cell::from("Goal"),
        Cell::from("When"),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let table_rows = rows.iter().enumerate().map(|(rank, row)| {
        Row::new(vec![
            Cell::from((rank + 1).to_string()),
            Cell::from(row.player_name.clone()),
            Cell::from(row.score.to_string()),
            Cell::from(format!("{:.1}%", row.accuracy)),
            Cell::from(row.tasks_completed.to_string()),
            Cell::from(row.goal.clone()),
            Cell::from(row.created_at.format("%Y-%m-%d").to_string()),
        ])
    });

    let table = Table::new(table_rows, [
        Constraint::Length(4),
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(11),
    ])
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

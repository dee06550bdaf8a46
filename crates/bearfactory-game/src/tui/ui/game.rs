/*
[INPUT]:  AppState with the latest round snapshot
[OUTPUT]: Goal form, belt with timer gauge, tour overlay, results and save form
[POS]:    TUI UI game panel
[UPDATE]: When the belt or results presentation changes
*/

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Row, Table, Wrap};
use tokio::time::Instant;
use tui_input::Input;
use unicode_width::UnicodeWidthStr;

use bearfactory_game::round::{Phase, RoundSnapshot};
use bearfactory_game::task::UserChoice;
use bearfactory_game::tour::TourStep;

use crate::tui::app::{AppState, Feedback};
use crate::tui::runtime::{border_style, centered_rect, verdict_style};

pub(in crate::tui) fn draw_game(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    match app.phase() {
        Phase::Input => draw_goal_form(frame, area, app),
        Phase::Generating => draw_generating(frame, area, &app.snapshot),
        Phase::Playing => {
            draw_belt(frame, area, &app.snapshot, app.active_feedback());
            if let Some(step) = app.snapshot.tour.step() {
                draw_tour(frame, area, step);
            }
        }
        Phase::Results => draw_results(frame, area, app),
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(title)
}

fn draw_goal_form(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let [intro_area, input_area, _] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled(
            "What are you working toward?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("The bears will load the belt with tasks. Keep the ones that help,"),
        Line::from("toss the distractions, and do it before they fall off the end."),
    ])
    .block(panel("Goal"));
    frame.render_widget(intro, intro_area);

    draw_text_input(frame, input_area, &app.goal_input, "Your goal");
}

fn draw_text_input(frame: &mut ratatui::Frame, area: Rect, input: &Input, title: &str) {
    let width = area.width.saturating_sub(3) as usize;
    let scroll = input.visual_scroll(width);
    let widget = Paragraph::new(input.value())
        .scroll((0, scroll as u16))
        .block(panel(title));
    frame.render_widget(widget, area);

    let cursor = input.visual_cursor().saturating_sub(scroll) as u16;
    frame.set_cursor_position((area.x + 1 + cursor, area.y + 1));
}

fn draw_generating(frame: &mut ratatui::Frame, area: Rect, snapshot: &RoundSnapshot) {
    let text = vec![
        Line::from(""),
        Line::from(format!("The bears are sorting out tasks for \"{}\"...", snapshot.goal)),
        Line::from(""),
        Line::from(Span::styled("Esc to cancel", Style::default().fg(Color::DarkGray))),
    ];
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(panel("Loading the belt"));
    frame.render_widget(widget, area);
}

fn draw_belt(
    frame: &mut ratatui::Frame,
    area: Rect,
    snapshot: &RoundSnapshot,
    feedback: Option<&Feedback>,
) {
    let [stats_area, belt_area, timer_area, bins_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(area);

    let position = (snapshot.current_index + 1).min(snapshot.total_tasks);
    let stats = Paragraph::new(Line::from(vec![
        Span::styled(format!("Score {}", snapshot.score), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "   Task {position}/{}   Correct {}   Goal: {}",
            snapshot.total_tasks, snapshot.correct_sorts, snapshot.goal
        )),
    ]))
    .block(panel("Round"));
    frame.render_widget(stats, stats_area);

    let now = Instant::now();
    let progress = belt_progress(snapshot, now);
    let belt_block = panel("Conveyor belt");
    let inner = belt_block.inner(belt_area);
    frame.render_widget(belt_block, belt_area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let (label, label_style) = match (feedback, snapshot.active_task()) {
        (Some(feedback), _) => feedback_label(feedback),
        (None, Some(task)) if !task.processed() => (
            format!("[ {} ]", task.text()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        _ => ("...".to_string(), Style::default().fg(Color::DarkGray)),
    };
    let label_width = label.width() as u16;
    let travel = inner.width.saturating_sub(label_width);
    let offset = (travel as f64 * progress).round() as u16;
    let row = inner.y + inner.height / 2;
    let item_area = Rect::new(inner.x + offset, row, label_width.min(inner.width), 1);
    frame.render_widget(Paragraph::new(Span::styled(label, label_style)), item_area);

    let track = "=".repeat(inner.width as usize);
    if row + 1 < inner.y + inner.height {
        frame.render_widget(
            Paragraph::new(Span::styled(track, Style::default().fg(Color::DarkGray))),
            Rect::new(inner.x, row + 1, inner.width, 1),
        );
    }

    let remaining = snapshot.remaining(now);
    let ratio = match remaining {
        Some(left) if !snapshot.deadline.is_zero() => {
            (left.as_secs_f64() / snapshot.deadline.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    };
    let gauge_label = match remaining {
        Some(left) => format!("{:.1}s", left.as_secs_f64()),
        None => "-".to_string(),
    };
    let gauge_color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    let gauge = Gauge::default()
        .block(panel("Time left"))
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio)
        .label(gauge_label);
    frame.render_widget(gauge, timer_area);

    let [keep_area, toss_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(bins_area);
    frame.render_widget(
        Paragraph::new("Toolbox  (k / Left)")
            .alignment(Alignment::Center)
            .block(panel("Keep")),
        keep_area,
    );
    frame.render_widget(
        Paragraph::new("Trash  (t / Right)")
            .alignment(Alignment::Center)
            .block(panel("Toss")),
        toss_area,
    );
}

/// Fraction of the belt the active task has travelled.
fn belt_progress(snapshot: &RoundSnapshot, now: Instant) -> f64 {
    let Some(task) = snapshot.active_task() else {
        return 0.0;
    };
    let (Some(start), false) = (task.start_time(), snapshot.deadline.is_zero()) else {
        return 0.0;
    };
    if task.processed() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start).as_secs_f64();
    (elapsed / snapshot.deadline.as_secs_f64()).clamp(0.0, 1.0)
}

fn feedback_label(feedback: &Feedback) -> (String, Style) {
    let text = match (feedback.choice, feedback.correct) {
        (UserChoice::Missed, _) => "Missed! It fell off the belt.".to_string(),
        (_, true) => format!("Nice sort! +{}", feedback.points),
        (_, false) => "Oops, wrong bin.".to_string(),
    };
    (text, verdict_style(feedback.correct))
}

fn draw_tour(frame: &mut ratatui::Frame, area: Rect, step: TourStep) {
    let popup = centered_rect(area, 60, 50);
    frame.render_widget(Clear, popup);

    let action = match step.expected_choice() {
        Some(_) => "Try it now.",
        None => "Press Enter to continue, s to skip.",
    };
    let text = vec![
        Line::from(Span::styled(
            step.title(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(step.hint()),
        Line::from(""),
        Line::from(Span::styled(action, Style::default().fg(Color::DarkGray))),
    ];
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Practice {}/4 ", step.index() + 1)),
        );
    frame.render_widget(widget, popup);
}

fn draw_results(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let snapshot = &app.snapshot;
    let [summary_area, tasks_area, name_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(5),
        Constraint::Length(3),
    ])
    .areas(area);

    let (accuracy, missed) = snapshot
        .summary()
        .map(|summary| (summary.accuracy(), summary.missed))
        .unwrap_or_default();
    let summary = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Final score: {}", snapshot.score),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Sorted {}/{} correctly ({accuracy:.2}%), missed {missed}",
            snapshot.correct_sorts, snapshot.total_tasks
        )),
        Line::from(format!("Goal: {}", snapshot.goal)),
    ])
    .block(panel("Results"));
    frame.render_widget(summary, summary_area);

    let rows = snapshot.tasks.iter().map(|task| {
        let expected = if task.is_relevant() { "keep" } else { "toss" };
        let chosen = match task.user_choice() {
            Some(UserChoice::Keep) => "keep",
            Some(UserChoice::Toss) => "toss",
            Some(UserChoice::Missed) => "missed",
            None => "-",
        };
        let time = task
            .response_time()
            .map(|t| format!("{:.2}s", t.as_secs_f64()))
            .unwrap_or_default();
        Row::new(vec![task.text().to_string(), expected.to_string(), chosen.to_string(), time])
            .style(verdict_style(task.was_sorted_correctly()))
    });
    let table = Table::new(rows, [
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
    ])
    .header(
        Row::new(vec!["Task", "Should", "You", "Time"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(panel("Belt history"));
    frame.render_widget(table, tasks_area);

    match app.submission.as_ref().and_then(|submission| submission.saved()) {
        Some(saved) => {
            let title = format!("Saved as {}", saved.player_name);
            let widget = Paragraph::new("Esc to play again").block(panel(&title));
            frame.render_widget(widget, name_area);
        }
        None => draw_text_input(frame, name_area, &app.name_input, "Your name for the leaderboard"),
    }
}

/*
[INPUT]:  Crossterm key events
[OUTPUT]: Session commands, text field edits and tab switches
[POS]:    TUI key routing
[UPDATE]: When keybindings change
*/

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_input::{Input, InputRequest};

use bearfactory_game::round::Phase;
use bearfactory_game::task::Choice;

use super::app::{AppState, Tab};

/// Handles key events for the TUI.
///
/// Returns `true` if quit is requested, `false` otherwise.
pub(super) async fn handle_key_event(app: &mut AppState, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    if key.code == KeyCode::Tab {
        if app.next_tab() == Tab::Leaderboard {
            app.refresh_scores().await;
        }
        return false;
    }

    match app.current_tab {
        Tab::Game => handle_game_key(app, key).await,
        Tab::Leaderboard => match key.code {
            KeyCode::Char('q') => true,
            KeyCode::Char('r') => {
                app.refresh_scores().await;
                false
            }
            _ => false,
        },
        Tab::Logs => key.code == KeyCode::Char('q'),
    }
}

async fn handle_game_key(app: &mut AppState, key: KeyEvent) -> bool {
    match app.phase() {
        Phase::Input => {
            if key.code == KeyCode::Enter {
                app.start_round().await;
            } else {
                edit_input(&mut app.goal_input, key);
            }
            false
        }
        Phase::Generating => {
            if key.code == KeyCode::Esc {
                app.reset().await;
            }
            false
        }
        Phase::Playing if app.snapshot.tour.is_active() => {
            match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => app.tour_next().await,
                KeyCode::Char('s') => app.skip_tour().await,
                KeyCode::Char('k') | KeyCode::Left => app.decide(Choice::Keep).await,
                KeyCode::Char('t') | KeyCode::Right => app.decide(Choice::Toss).await,
                KeyCode::Esc => app.reset().await,
                KeyCode::Char('q') => return true,
                _ => {}
            }
            false
        }
        Phase::Playing => {
            match key.code {
                KeyCode::Char('k') | KeyCode::Left => app.decide(Choice::Keep).await,
                KeyCode::Char('t') | KeyCode::Right => app.decide(Choice::Toss).await,
                KeyCode::Esc => app.reset().await,
                KeyCode::Char('q') => return true,
                _ => {}
            }
            false
        }
        Phase::Results => {
            match key.code {
                KeyCode::Enter => app.save_score().await,
                KeyCode::Esc => app.reset().await,
                _ => edit_input(&mut app.name_input, key),
            }
            false
        }
    }
}

fn edit_input(input: &mut Input, key: KeyEvent) {
    if let Some(request) = input_request(key) {
        input.handle(request);
    }
}

fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char(c) if !ctrl => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

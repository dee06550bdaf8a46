/*
[INPUT]:  TUI app state and round snapshots
[OUTPUT]: Panel render functions and module exports
[POS]:    TUI UI module root
[UPDATE]: When adding panels
*/

mod game;
mod layout;
mod logs;
mod scores;

pub(in crate::tui) use game::draw_game;
pub(in crate::tui) use layout::draw_tabs;
pub(in crate::tui) use logs::draw_logs;
pub(in crate::tui) use scores::draw_high_scores;

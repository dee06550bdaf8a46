/*
[INPUT]:  Current tab
[OUTPUT]: Tab bar widget
[POS]:    TUI UI tab bar
[UPDATE]: When tabs are added or renamed
*/

use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Tabs};

use crate::tui::app::Tab;
use crate::tui::runtime::{border_style, header_style};

pub(in crate::tui) fn draw_tabs(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    current_tab: Tab,
) {
    let titles = Tab::ALL.iter().map(|tab| Line::from(tab.title()));
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title("Bear's Task Factory"),
        )
        .highlight_style(header_style())
        .select(current_tab.index());

    frame.render_widget(tabs, area);
}

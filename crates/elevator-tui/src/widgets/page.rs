use std::io::Write;

use elevator_core::elevator::FocusSignal;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::App;

pub struct PageWidget;

impl PageWidget {
    pub fn render<F: FocusSignal, W: Write>(frame: &mut Frame, area: Rect, app: &App<F, W>) {
        let lines: Vec<Line> = app
            .page()
            .visible_rows()
            .iter()
            .map(|row| Line::from(Span::styled(row.text.as_str(), app.theme.row(row.style))))
            .collect();

        let paragraph =
            Paragraph::new(lines).block(Block::default().style(Style::default().bg(app.theme.bg0)));
        frame.render_widget(paragraph, area);
    }
}

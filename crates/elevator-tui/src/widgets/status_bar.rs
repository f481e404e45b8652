use std::io::Write;

use elevator_core::elevator::FocusSignal;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render<F: FocusSignal, W: Write>(frame: &mut Frame, area: Rect, app: &App<F, W>) {
        let theme = &app.theme;
        let bar = Style::default().bg(theme.bg2);

        let phase_color = if app.phase_label() == "IDLE" {
            theme.accent
        } else {
            theme.moving
        };

        let mut spans = vec![
            Span::styled(
                format!(" {} ", app.phase_label()),
                bar.fg(phase_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("| row {:.1} | target {} ", app.scroll_offset(), app.target_label()),
                bar.fg(theme.fg0),
            ),
        ];

        match app.now_playing() {
            Some(track) => spans.push(Span::styled(
                format!("| ♪ {} ", track),
                bar.fg(theme.playing),
            )),
            None if !app.audio_enabled() => {
                spans.push(Span::styled("| muted ", bar.fg(theme.muted)))
            }
            None => {}
        }

        if let Some(message) = app.status_message() {
            spans.push(Span::styled(format!("| {} ", message), bar.fg(theme.yellow)));
        }

        let help_hint = " e:elevate t:target a:audio q:quit ";
        let used: usize = spans.iter().map(|span| span.content.width()).sum();
        let padding_len = usize::from(area.width).saturating_sub(used + help_hint.width());
        spans.push(Span::styled(" ".repeat(padding_len), bar));
        spans.push(Span::styled(help_hint, bar.fg(theme.grey2)));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

use ratatui::style::{Color, Modifier, Style};

use crate::page::RowStyle;

/// Runtime theme with configurable colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey0: Color,
    pub grey2: Color,

    // Palette colors
    pub yellow: Color,
    pub green: Color,
    pub aqua: Color,

    // Semantic colors
    pub accent: Color,
    pub moving: Color,
    pub playing: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            yellow: Color::Rgb(0xd8, 0xa6, 0x57),
            green: Color::Rgb(0xa9, 0xb6, 0x65),
            aqua: Color::Rgb(0x89, 0xb4, 0x82),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            moving: Color::Rgb(0xe7, 0x8a, 0x4e),
            playing: Color::Rgb(0xd3, 0x86, 0x9b),
            muted: Color::Rgb(0x92, 0x83, 0x74),
        }
    }
}

impl Theme {
    /// Style for a row of the page
    pub fn row(&self, style: RowStyle) -> Style {
        let base = Style::default().bg(self.bg0);
        match style {
            RowStyle::Title => base.fg(self.yellow).add_modifier(Modifier::BOLD),
            RowStyle::Subtitle => base.fg(self.fg0),
            RowStyle::Hint => base.fg(self.grey2).add_modifier(Modifier::ITALIC),
            RowStyle::Rule => base.fg(self.grey0),
            RowStyle::Picture => base.fg(self.aqua),
            RowStyle::Text => base.fg(self.fg0),
            RowStyle::Button => base.fg(self.green).add_modifier(Modifier::BOLD),
            RowStyle::Blank => base,
        }
    }
}

//! The demo page: a hero header, twelve sections inside a page container
//! and a footer with the elevator button.
//!
//! Everything is measured in terminal rows. The page lays itself out for a
//! given width, so a section's offset changes when the terminal is resized.

use elevator_core::elevator::sim::FlatViewport;
use elevator_core::elevator::Viewport;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const HERO_ID: &str = "hero";
pub const CONTAINER_ID: &str = "page";
pub const FOOTER_ID: &str = "footer";

/// (picture, caption) for each section, top to bottom
const SECTIONS: [(&str, &str); 12] = [
    ("bear-2", "Let's make our way to the page's end."),
    ("bear", "Remember, we're starting from the very top."),
    (
        "camera",
        "Thus, a \"back to top\" feature isn't immediately necessary.",
    ),
    ("chick", "Heading deeper and deeper."),
    ("down", "Quite the journey with all this scrolling, isn't it?"),
    (
        "elevator",
        "The payoff for this scroll had better be significant.",
    ),
    (
        "hedgehog",
        "Returning to the top seems like it'll be a lengthy endeavor.",
    ),
    ("kitty", "Wishing for a simpler method to ascend..."),
    (
        "rose",
        "...one that's not only efficient but also entertaining.",
    ),
    (
        "sun",
        "I prefer to think of \"back to top\" options as elevators...",
    ),
    (
        "down",
        "...and they ought to mimic the real experience more closely.",
    ),
    (
        "elevator",
        "Finally, we've reached our destination... go ahead and activate that elevator!",
    ),
];

const SUBTITLE: &str = "A smooth scrolling page with elevator music, inspired by elevator.js. \
    Fixes those awkward \"scroll to top\" moments the old fashioned way.";

const HINT: &str =
    "j/k scroll, G bottom, e ride the elevator, t pick a floor, a toggle music, q quit";

const INDENT: &str = "  ";

/// How a row should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Title,
    Subtitle,
    Hint,
    Rule,
    Picture,
    Text,
    Button,
    Blank,
}

/// One laid-out terminal row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub text: String,
    pub style: RowStyle,
}

impl Row {
    fn new(text: impl Into<String>, style: RowStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::new("", RowStyle::Blank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Hero,
    Container,
    /// Index into `SECTIONS`
    Section(usize),
    Footer,
}

#[derive(Debug, Clone)]
struct Block {
    id: String,
    kind: BlockKind,
    parent: Option<usize>,
    offset_top: f64,
}

/// Scrollable demo page
#[derive(Debug, Clone)]
pub struct Page {
    blocks: Vec<Block>,
    rows: Vec<Row>,
    offset: f64,
    width: u16,
    height: u16,
}

impl Page {
    /// Build the demo page and lay it out for a `width` x `height` viewport
    pub fn new(width: u16, height: u16) -> Self {
        let mut blocks = vec![
            Block {
                id: HERO_ID.to_string(),
                kind: BlockKind::Hero,
                parent: None,
                offset_top: 0.0,
            },
            Block {
                id: CONTAINER_ID.to_string(),
                kind: BlockKind::Container,
                parent: None,
                offset_top: 0.0,
            },
        ];
        for index in 0..SECTIONS.len() {
            blocks.push(Block {
                id: section_id(index + 1),
                kind: BlockKind::Section(index),
                parent: Some(1),
                offset_top: 0.0,
            });
        }
        blocks.push(Block {
            id: FOOTER_ID.to_string(),
            kind: BlockKind::Footer,
            parent: None,
            offset_top: 0.0,
        });

        let mut page = Self {
            blocks,
            rows: Vec::new(),
            offset: 0.0,
            width: 0,
            height: 0,
        };
        page.layout(width, height);
        page
    }

    /// Re-measure for a new viewport size. No-op when the size is unchanged.
    pub fn layout(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height && !self.rows.is_empty() {
            return;
        }
        self.width = width;
        self.height = height;
        self.rows.clear();

        let width = usize::from(width);
        let mut container_start = 0;
        for index in 0..self.blocks.len() {
            let kind = self.blocks[index].kind;
            let start = self.rows.len();
            match kind {
                BlockKind::Hero => self.rows.extend(hero_rows(width)),
                BlockKind::Container => container_start = start,
                BlockKind::Section(section) => {
                    self.rows.extend(section_rows(section, width));
                }
                BlockKind::Footer => self.rows.extend(footer_rows(width)),
            }

            // Sections are positioned relative to the container
            let offset_top = match kind {
                BlockKind::Section(_) => start - container_start,
                _ => start,
            };
            self.blocks[index].offset_top = offset_top as f64;
        }

        self.offset = self.offset.clamp(0.0, self.max_scroll());
        tracing::debug!(
            "Laid out page at {}x{}: {} rows",
            self.width,
            self.height,
            self.rows.len()
        );
    }

    /// Furthest the page can scroll
    pub fn max_scroll(&self) -> f64 {
        self.rows.len().saturating_sub(usize::from(self.height)) as f64
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn viewport_height(&self) -> u16 {
        self.height
    }

    /// Row at the top of the viewport
    pub fn top_row(&self) -> usize {
        (self.offset.round() as usize).min(self.rows.len())
    }

    /// Rows currently inside the viewport
    pub fn visible_rows(&self) -> &[Row] {
        let start = self.top_row();
        let end = (start + usize::from(self.height)).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn scroll_by(&mut self, rows: f64) {
        self.set_scroll_offset(self.offset + rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.set_scroll_offset(self.max_scroll());
    }

    /// Ids of every section, top to bottom
    pub fn section_ids(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|block| matches!(block.kind, BlockKind::Section(_)))
            .map(|block| block.id.clone())
            .collect()
    }

    /// Snapshot the current geometry into a [`FlatViewport`] for headless runs
    pub fn flatten(&self) -> FlatViewport {
        let mut flat = FlatViewport::new(self.offset);
        for block in &self.blocks {
            flat.add_element(&block.id, block.offset_top, block.parent);
        }
        flat
    }
}

impl Viewport for Page {
    type Element = usize;

    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        if !offset.is_finite() {
            tracing::warn!("Ignoring scroll to {}", offset);
            return;
        }
        self.offset = offset.clamp(0.0, self.max_scroll());
    }

    fn element_by_id(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    fn offset_top(&self, element: usize) -> f64 {
        self.blocks.get(element).map_or(0.0, |block| block.offset_top)
    }

    fn offset_parent(&self, element: usize) -> Option<usize> {
        self.blocks.get(element).and_then(|block| block.parent)
    }
}

pub fn section_id(number: usize) -> String {
    format!("section-{}", number)
}

fn hero_rows(width: usize) -> Vec<Row> {
    let inner = width.saturating_sub(INDENT.len() * 2);
    let mut rows = vec![
        Row::blank(),
        Row::new(format!("{}useElevator (terminal)", INDENT), RowStyle::Title),
        Row::blank(),
    ];
    rows.extend(indented(SUBTITLE, inner, RowStyle::Subtitle));
    rows.push(Row::blank());
    rows.extend(indented(HINT, inner, RowStyle::Hint));
    rows.push(Row::blank());
    rows
}

fn section_rows(index: usize, width: usize) -> Vec<Row> {
    let (picture, caption) = SECTIONS[index];
    let inner = width.saturating_sub(INDENT.len() * 2);

    let mut rows = vec![
        Row::new(rule(&(index + 1).to_string(), width), RowStyle::Rule),
        Row::blank(),
        Row::new(format!("{}[{}]", INDENT, picture), RowStyle::Picture),
    ];
    rows.extend(indented(caption, inner, RowStyle::Text));
    rows.push(Row::blank());
    rows
}

fn footer_rows(width: usize) -> Vec<Row> {
    vec![
        Row::new(rule("", width), RowStyle::Rule),
        Row::blank(),
        Row::new(format!("{}[ ^ Lessgoooo ]  press e", INDENT), RowStyle::Button),
        Row::blank(),
    ]
}

fn indented(text: &str, width: usize, style: RowStyle) -> impl Iterator<Item = Row> {
    wrap(text, width)
        .into_iter()
        .map(move |line| Row::new(format!("{}{}", INDENT, line), style))
}

/// Horizontal rule with an optional label, `width` columns wide
fn rule(label: &str, width: usize) -> String {
    let mut line = if label.is_empty() {
        String::new()
    } else {
        format!("── {} ", label)
    };
    let used = line.width();
    line.extend(std::iter::repeat('─').take(width.saturating_sub(used)));
    line
}

/// Greedy word wrap by display width. Words wider than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        if line_width > 0 && line_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }

        if word_width > width {
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            for ch in word.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if line_width > 0 && line_width + ch_width > width {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(ch);
                line_width += ch_width;
            }
            continue;
        }

        if line_width > 0 {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(word);
        line_width += word_width;
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use elevator_core::resolve_target_offset;

    #[test]
    fn test_wrap_by_words() {
        assert_eq!(wrap("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_uses_display_width() {
        assert_eq!(wrap("你好世界", 4), vec!["你好", "世界"]);
    }

    #[test]
    fn test_rule_fills_width() {
        assert_eq!(rule("3", 10).width(), 10);
        assert_eq!(rule("", 4), "────");
    }

    #[test]
    fn test_sections_resolve_through_container() {
        let page = Page::new(80, 24);
        let hero_rows = hero_rows(80).len() as f64;
        let first = section_rows(0, 80).len() as f64;

        assert_eq!(resolve_target_offset(&page, "section-1", 0.0), hero_rows);
        assert_eq!(
            resolve_target_offset(&page, "section-2", 2.0),
            hero_rows + first - 2.0
        );
        assert_eq!(resolve_target_offset(&page, "nowhere", 3.0), 3.0);
    }

    #[test]
    fn test_twelve_sections() {
        let page = Page::new(80, 24);
        let ids = page.section_ids();
        assert_eq!(ids.len(), 12);
        assert_eq!(ids[0], "section-1");
        assert_eq!(ids[11], "section-12");
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut page = Page::new(80, 24);
        page.set_scroll_offset(-5.0);
        assert_eq!(page.scroll_offset(), 0.0);

        page.set_scroll_offset(1e9);
        assert_eq!(page.scroll_offset(), page.max_scroll());
        assert_eq!(page.visible_rows().len(), 24);
    }

    #[test]
    fn test_non_finite_scroll_is_ignored() {
        let mut page = Page::new(80, 24);
        page.set_scroll_offset(10.0);
        page.set_scroll_offset(f64::NAN);
        assert_eq!(page.scroll_offset(), 10.0);
    }

    #[test]
    fn test_narrow_layout_is_taller() {
        let mut page = Page::new(120, 24);
        let wide = page.total_rows();
        page.layout(30, 24);
        assert!(page.total_rows() > wide);
    }

    #[test]
    fn test_flatten_keeps_geometry() {
        let mut page = Page::new(60, 20);
        page.scroll_by(7.0);
        let flat = page.flatten();

        assert_eq!(flat.scroll_offset(), 7.0);
        for id in page.section_ids() {
            assert_eq!(
                resolve_target_offset(&flat, &id, 1.0),
                resolve_target_offset(&page, &id, 1.0)
            );
        }
    }
}

use crate::theme::{self, Palette};
use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// What a key did to the search bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// Query text changed
    Changed,
    /// Input finished; the query stays applied
    Done,
    /// Input cancelled; the query was cleared
    Cleared,
    Ignored,
}

/// Filter input shown above list screens
pub struct SearchBar {
    pub query: String,
    /// Focused and capturing keys
    pub active: bool,
    pub placeholder: String,
}

impl Default for SearchBar {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            active: false,
            placeholder: "Press / to filter".to_string(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    pub fn handle_key(&mut self, key: KeyCode) -> SearchEvent {
        if !self.active {
            return SearchEvent::Ignored;
        }

        match key {
            KeyCode::Char(c) => {
                self.query.push(c);
                SearchEvent::Changed
            }
            KeyCode::Backspace => {
                self.query.pop();
                SearchEvent::Changed
            }
            KeyCode::Enter => {
                self.active = false;
                SearchEvent::Done
            }
            KeyCode::Esc => {
                self.active = false;
                self.query.clear();
                SearchEvent::Cleared
            }
            _ => SearchEvent::Ignored,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, suffix: Option<&str>) {
        let (text, style) = if self.query.is_empty() && !self.active {
            (self.placeholder.as_str(), theme::muted())
        } else {
            (self.query.as_str(), Style::default().fg(Palette::FG))
        };

        let mut spans = vec![
            Span::styled("🔍 ", Style::default().fg(Palette::FOCUS)),
            Span::styled(text, style),
        ];
        if self.active {
            spans.push(Span::styled(
                "_",
                Style::default()
                    .fg(Palette::FOCUS)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        if let Some(suffix) = suffix {
            spans.push(Span::styled(format!("   {}", suffix), theme::muted()));
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border(self.active))
                .title(Span::styled(
                    " Filter ",
                    Style::default()
                        .fg(Palette::FG)
                        .add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(paragraph, area);
    }
}

/// Split `text` into spans with case-insensitive matches of `query` highlighted
pub fn highlight_matches(text: &str, query: &str) -> Vec<Span<'static>> {
    let query = query.trim();
    let text_lower = text.to_lowercase();
    // Lowercasing can change byte lengths outside ASCII; offsets would no
    // longer line up with `text`, so skip highlighting in that case.
    if query.is_empty() || text_lower.len() != text.len() {
        return vec![Span::raw(text.to_string())];
    }

    let query_lower = query.to_lowercase();
    let mut spans = Vec::new();
    let mut last_end = 0;

    for (idx, matched) in text_lower.match_indices(&query_lower) {
        if idx > last_end {
            spans.push(Span::raw(text[last_end..idx].to_string()));
        }
        let end = idx + matched.len();
        spans.push(Span::styled(
            text[idx..end].to_string(),
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
        last_end = end;
    }

    if last_end < text.len() {
        spans.push(Span::raw(text[last_end..].to_string()));
    }

    if spans.is_empty() {
        vec![Span::raw(text.to_string())]
    } else {
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_bar_ignores_keys() {
        let mut bar = SearchBar::new();
        assert_eq!(bar.handle_key(KeyCode::Char('a')), SearchEvent::Ignored);
        assert!(bar.is_empty());
    }

    #[test]
    fn test_typing_and_escape() {
        let mut bar = SearchBar::new();
        bar.active = true;
        bar.handle_key(KeyCode::Char('l'));
        bar.handle_key(KeyCode::Char('a'));
        bar.handle_key(KeyCode::Char('x'));
        assert_eq!(bar.handle_key(KeyCode::Backspace), SearchEvent::Changed);
        assert_eq!(bar.query, "la");

        assert_eq!(bar.handle_key(KeyCode::Esc), SearchEvent::Cleared);
        assert!(!bar.active);
        assert!(bar.is_empty());
    }

    #[test]
    fn test_enter_keeps_query() {
        let mut bar = SearchBar::new();
        bar.active = true;
        bar.handle_key(KeyCode::Char('p'));
        assert_eq!(bar.handle_key(KeyCode::Enter), SearchEvent::Done);
        assert_eq!(bar.query, "p");
    }

    #[test]
    fn test_highlight_case_insensitive() {
        let spans = highlight_matches("Cuaderno rayado", "CUADERNO");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].content, "Cuaderno");
    }

    #[test]
    fn test_highlight_multiple_matches() {
        let spans = highlight_matches("lápiz y lapicera", "y");
        // Non-ASCII lowercase keeps byte length here, so matches are found
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn test_highlight_no_match() {
        let spans = highlight_matches("Regalos", "xyz");
        assert_eq!(spans.len(), 1);
    }
}

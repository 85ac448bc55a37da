//! Yes/no confirmation dialog

use crate::theme::Palette;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Yes,
    No,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    visible: bool,
    title: String,
    message: String,
    default_option: ConfirmResult,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            visible: false,
            title: title.into(),
            message: message.into(),
            default_option: ConfirmResult::No,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `Some` once a choice was made; the dialog hides itself
    pub fn handle_key(&mut self, key: KeyCode) -> Option<ConfirmResult> {
        if !self.visible {
            return None;
        }

        let result = match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => ConfirmResult::Yes,
            KeyCode::Char('n') | KeyCode::Char('N') => ConfirmResult::No,
            KeyCode::Esc => ConfirmResult::Cancel,
            KeyCode::Enter => self.default_option,
            _ => return None,
        };
        self.hide();
        Some(result)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let dialog_width = ((area.width as f32 * 0.5).max(40.0) as u16).min(area.width);
        let dialog_height = 8.min(area.height);
        let dialog_area = Rect {
            x: area.x + area.width.saturating_sub(dialog_width) / 2,
            y: area.y + area.height.saturating_sub(dialog_height) / 2,
            width: dialog_width,
            height: dialog_height,
        };

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::WARNING))
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(Palette::WARNING)
                    .add_modifier(Modifier::BOLD),
            ));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(2)])
            .split(inner);

        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message.as_str(),
                Style::default().fg(Palette::FG),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[0]);

        let bold = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        let buttons = Line::from(vec![
            Span::styled("[Y] ", bold(Palette::SUCCESS)),
            Span::styled("Yes", Style::default().fg(Palette::FG)),
            Span::raw("  "),
            Span::styled("[N] ", bold(Palette::ERROR)),
            Span::styled("No", Style::default().fg(Palette::FG)),
            Span::raw("  "),
            Span::styled("[Esc] ", bold(Palette::MUTED)),
            Span::styled("Cancel", Style::default().fg(Palette::MUTED)),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_dialog_ignores_keys() {
        let mut dialog = ConfirmDialog::new("Delete", "Sure?");
        assert_eq!(dialog.handle_key(KeyCode::Char('y')), None);
    }

    #[test]
    fn test_enter_defaults_to_no() {
        let mut dialog = ConfirmDialog::new("Delete", "Sure?");
        dialog.show();
        assert_eq!(dialog.handle_key(KeyCode::Enter), Some(ConfirmResult::No));
        assert!(!dialog.is_visible());
    }

    #[test]
    fn test_yes_hides_dialog() {
        let mut dialog = ConfirmDialog::new("Delete", "Sure?");
        dialog.show();
        assert_eq!(dialog.handle_key(KeyCode::Char('x')), None);
        assert!(dialog.is_visible());
        assert_eq!(dialog.handle_key(KeyCode::Char('Y')), Some(ConfirmResult::Yes));
        assert!(!dialog.is_visible());
    }
}

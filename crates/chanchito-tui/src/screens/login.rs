//! Login screen

use crate::theme::{self, Palette};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Field {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    Submit { username: String, password: String },
    Quit,
}

#[derive(Debug, Default)]
pub struct LoginScreen {
    pub username: String,
    password: String,
    focus: Field,
    /// Inline message under the form
    pub error: Option<String>,
    /// Login call in flight
    pub busy: bool,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget typed credentials and messages
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<LoginAction> {
        match key {
            KeyCode::Esc => return Some(LoginAction::Quit),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    Field::Username => Field::Password,
                    Field::Password => Field::Username,
                };
            }
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => {
                self.input().pop();
            }
            KeyCode::Char(c) if !self.busy => {
                self.input().push(c);
            }
            _ => {}
        }
        None
    }

    fn input(&mut self) -> &mut String {
        match self.focus {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }

    fn submit(&mut self) -> Option<LoginAction> {
        if self.busy {
            return None;
        }
        if self.focus == Field::Username && self.password.is_empty() {
            self.focus = Field::Password;
            return None;
        }
        if self.username.trim().is_empty() || self.password.is_empty() {
            self.error = Some("Enter your username and password".to_string());
            return None;
        }

        self.error = None;
        self.busy = true;
        Some(LoginAction::Submit {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Login call settled with an inline message (or none on success)
    pub fn finish(&mut self, error: Option<String>) {
        self.busy = false;
        self.password.clear();
        self.error = error;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, status: Option<Line<'static>>) {
        let width = 50.min(area.width);
        let height = 13.min(area.height);
        let card = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };
        frame.render_widget(Clear, card);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::ACCENT))
            .title(Span::styled(" 🐷 Chanchito Feliz ", theme::title()))
            .title_alignment(Alignment::Center);

        let field_line = |label: &str, value: String, focused: bool| {
            let cursor = if focused { "_" } else { "" };
            Line::from(vec![
                Span::styled(
                    format!("{:<10}", label),
                    if focused {
                        Style::default()
                            .fg(Palette::FOCUS)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Palette::FG)
                    },
                ),
                Span::styled(format!("{}{}", value, cursor), Style::default().fg(Palette::FG)),
            ])
        };

        let mut lines = vec![
            Line::from(Span::styled("Sign in", theme::title())).alignment(Alignment::Center),
            Line::from(""),
            field_line(
                "Username",
                self.username.clone(),
                self.focus == Field::Username,
            ),
            Line::from(""),
            field_line(
                "Password",
                "•".repeat(self.password.chars().count()),
                self.focus == Field::Password,
            ),
            Line::from(""),
        ];

        if let Some(status) = status {
            lines.push(status);
        } else if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Palette::ERROR),
            )));
        } else {
            lines.push(Line::from(""));
        }

        lines.push(Line::from(""));
        lines.push(
            Line::from(vec![
                Span::styled("[Enter] ", theme::key_hint()),
                Span::raw("sign in  "),
                Span::styled("[Tab] ", theme::key_hint()),
                Span::raw("switch  "),
                Span::styled("[Esc] ", theme::key_hint()),
                Span::raw("quit"),
            ])
            .alignment(Alignment::Center),
        );

        frame.render_widget(Paragraph::new(lines).block(block), card);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_on_username_moves_to_password() {
        let mut screen = LoginScreen::new();
        type_str(&mut screen, "admin1");
        assert_eq!(screen.handle_key(KeyCode::Enter), None);
        type_str(&mut screen, "x");
        assert_eq!(
            screen.handle_key(KeyCode::Enter),
            Some(LoginAction::Submit {
                username: "admin1".to_string(),
                password: "x".to_string()
            })
        );
        assert!(screen.busy);
    }

    #[test]
    fn test_empty_fields_are_rejected_locally() {
        let mut screen = LoginScreen::new();
        screen.handle_key(KeyCode::Tab);
        type_str(&mut screen, "secret");
        assert_eq!(screen.handle_key(KeyCode::Enter), None);
        assert!(screen.error.is_some());
        assert!(!screen.busy);
    }

    #[test]
    fn test_busy_blocks_second_submit() {
        let mut screen = LoginScreen::new();
        type_str(&mut screen, "emp");
        screen.handle_key(KeyCode::Tab);
        type_str(&mut screen, "x");
        assert!(screen.handle_key(KeyCode::Enter).is_some());
        assert_eq!(screen.handle_key(KeyCode::Enter), None);

        screen.finish(Some("Invalid credentials. Try again!".to_string()));
        assert!(!screen.busy);
        assert_eq!(screen.username, "emp");
        assert_eq!(
            screen.error.as_deref(),
            Some("Invalid credentials. Try again!")
        );
    }
}

//! Toast notifications

use crate::theme::Palette;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Warning,
    Error,
    Info,
}

impl ToastType {
    pub fn color(&self) -> Color {
        match self {
            Self::Success => Palette::SUCCESS,
            Self::Warning => Palette::WARNING,
            Self::Error => Palette::ERROR,
            Self::Info => Palette::FOCUS,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Warning => "⚠",
            Self::Error => "✗",
            Self::Info => "ℹ",
        }
    }
}

/// Single toast message
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub toast_type: ToastType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        // Errors stay up longer; they usually need reading
        let duration = match toast_type {
            ToastType::Error => Duration::from_secs(6),
            _ => Duration::from_secs(3),
        };
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Info)
    }
}

/// Stack of live toasts, newest last
#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self { toasts: Vec::new() }
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn clear_expired(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.clear_expired();

        if self.toasts.is_empty() {
            return;
        }

        // Stack from the bottom up, at most 4 visible
        let max_visible = 4;
        let visible: Vec<_> = self.toasts.iter().rev().take(max_visible).rev().collect();

        let toast_height: u16 = 3;
        let mut y_offset =
            area.height.saturating_sub((visible.len() as u16 * toast_height) + 2);

        for toast in visible {
            let toast_width = (toast.message.chars().count() + 6).min(area.width as usize) as u16;
            let x_offset = area.width.saturating_sub(toast_width) / 2;

            let toast_area = Rect {
                x: area.x + x_offset,
                y: area.y + y_offset,
                width: toast_width,
                height: toast_height.min(area.height.saturating_sub(y_offset)),
            };

            render_single_toast(frame, toast_area, toast);
            y_offset += toast_height;
        }
    }
}

fn render_single_toast(frame: &mut Frame, area: Rect, toast: &Toast) {
    let color = toast.toast_type.color();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let content = Line::from(vec![
        Span::styled(
            format!("{} ", toast.toast_type.icon()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(toast.message.as_str(), Style::default().fg(Palette::FG)),
    ]);

    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_is_most_recent() {
        let mut toasts = ToastManager::new();
        toasts.push(Toast::info("first"));
        toasts.push(Toast::error("second"));

        assert_eq!(toasts.len(), 2);
        let latest = toasts.latest().unwrap();
        assert_eq!(latest.message, "second");
        assert_eq!(latest.toast_type, ToastType::Error);
    }

    #[test]
    fn test_expired_toasts_are_dropped() {
        let mut toasts = ToastManager::new();
        let mut old = Toast::success("saved");
        old.duration = Duration::ZERO;
        old.created_at = Instant::now() - Duration::from_millis(5);
        toasts.push(old);
        toasts.push(Toast::info("fresh"));

        toasts.clear_expired();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.latest().unwrap().message, "fresh");
    }
}

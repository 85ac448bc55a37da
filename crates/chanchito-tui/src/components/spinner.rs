//! Animated spinner shown while a call is in flight

use crate::theme::Palette;
use ratatui::{
    style::Style,
    text::{Line, Span},
};
use std::time::{Duration, Instant};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug)]
pub struct Spinner {
    current_frame: usize,
    last_update: Instant,
    frame_duration: Duration,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            current_frame: 0,
            last_update: Instant::now(),
            frame_duration: Duration::from_millis(80),
        }
    }

    /// Advance the animation (call on each render)
    pub fn tick(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_update) >= self.frame_duration {
            self.current_frame = (self.current_frame + 1) % FRAMES.len();
            self.last_update = now;
        }
    }

    pub fn current_frame(&self) -> &'static str {
        FRAMES[self.current_frame]
    }

    /// Frame followed by a label, e.g. `⠙ Loading products...`
    pub fn line(&self, label: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("{} ", self.current_frame()),
                Style::default().fg(Palette::FOCUS),
            ),
            Span::styled(label.to_string(), Style::default().fg(Palette::MUTED)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_cycles() {
        let mut spinner = Spinner::new();
        spinner.last_update = Instant::now() - Duration::from_millis(100);
        spinner.tick();
        assert_eq!(spinner.current_frame(), FRAMES[1]);
    }
}

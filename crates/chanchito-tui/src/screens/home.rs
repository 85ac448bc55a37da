//! Home: dashboard counts for the signed-in user

use super::Ctx;
use crate::app::TaskResult;
use crate::components::Spinner;
use crate::theme::{self, Palette};
use chanchito_core::{load_dashboard, ApiError, Dashboard, Session};
use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Default)]
pub struct HomeScreen {
    dashboard: Option<Dashboard>,
    loading: bool,
    epoch: u64,
    refreshed_at: Option<DateTime<Local>>,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop data from a previous session and ignore its in-flight calls
    pub fn reset(&mut self) {
        self.dashboard = None;
        self.loading = false;
        self.refreshed_at = None;
        self.epoch += 1;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    pub fn load(&mut self, ctx: &mut Ctx, low_stock_threshold: i64) {
        if self.loading {
            return;
        }
        self.loading = true;

        let epoch = self.epoch;
        let client = ctx.client.clone();
        let tx = ctx.tx.clone();
        tokio::spawn(async move {
            let result = load_dashboard(&client, low_stock_threshold).await;
            let _ = tx.send(TaskResult::Dashboard { epoch, result });
        });
    }

    pub fn apply(&mut self, epoch: u64, result: Result<Dashboard, ApiError>, ctx: &mut Ctx) {
        if epoch != self.epoch {
            return;
        }
        self.loading = false;
        match result {
            Ok(dashboard) => {
                self.dashboard = Some(dashboard);
                self.refreshed_at = Some(Local::now());
            }
            Err(e) => {
                if let Some(message) = ctx.report(&e) {
                    ctx.toasts.push(crate::components::Toast::error(message));
                }
            }
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        session: Option<&Session>,
        spinner: &Spinner,
        low_stock_threshold: i64,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border(false))
            .title(Span::styled(" Home ", theme::title()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(1),
            ])
            .split(inner);

        let greeting = match session {
            Some(session) => format!("Welcome! You are signed in as {}.", session.role.label()),
            None => "Welcome!".to_string(),
        };
        let mut header = vec![Line::from(Span::styled(
            greeting,
            Style::default().fg(Palette::FG).add_modifier(Modifier::BOLD),
        ))];
        if self.loading {
            header.push(spinner.line("Loading dashboard..."));
        } else if let Some(at) = self.refreshed_at {
            header.push(Line::from(Span::styled(
                format!("Updated {}", at.format("%H:%M:%S")),
                theme::muted(),
            )));
        }
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let Some(dashboard) = &self.dashboard else {
            return;
        };

        let mut cards: Vec<(&str, String, ratatui::style::Color)> = vec![
            ("Products", dashboard.products.to_string(), Palette::ACCENT),
            (
                "Low stock",
                dashboard.low_stock.to_string(),
                if dashboard.low_stock > 0 {
                    Palette::WARNING
                } else {
                    Palette::SUCCESS
                },
            ),
        ];
        if let Some(categories) = dashboard.categories {
            cards.push(("Categories", categories.to_string(), Palette::FOCUS));
        }
        if let Some(users) = dashboard.users {
            cards.push(("Users", users.to_string(), Palette::FOCUS));
        }

        let card_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
            .split(chunks[1]);

        for ((label, value, color), card_area) in cards.into_iter().zip(card_areas.iter()) {
            let card = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    value,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
                .centered(),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(format!(" {} ", label)),
            );
            frame.render_widget(card, *card_area);
        }

        let hint = Line::from(vec![
            Span::styled(
                format!("Low stock means {} units or fewer. ", low_stock_threshold),
                theme::muted(),
            ),
            Span::styled("[Tab] ", theme::key_hint()),
            Span::raw("next view  "),
            Span::styled("[L] ", theme::key_hint()),
            Span::raw("log out"),
        ]);
        frame.render_widget(Paragraph::new(hint), chunks[2]);
    }
}

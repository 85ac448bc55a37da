//! Navigation sidebar: the entries the current session may open

use crate::theme::{self, Palette};
use chanchito_core::{NavEntry, RouteId, Session};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    entries: &[NavEntry],
    active: RouteId,
    session: Option<&Session>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Palette::ACCENT))
        .title(Span::styled(" 🐷 Chanchito Feliz ", theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(inner);

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", idx + 1), theme::muted()),
                Span::raw(entry.label),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(entries.iter().position(|e| e.route == active));

    let list = List::new(items).highlight_style(theme::selected());
    frame.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(session) = session {
        let footer = vec![
            Line::from(Span::styled(
                session.user_id.as_deref().map_or_else(
                    || "Signed in".to_string(),
                    |id| format!("User #{}", id),
                ),
                Style::default().fg(Palette::FG),
            )),
            Line::from(Span::styled(
                session.role.label(),
                Style::default()
                    .fg(Palette::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
        ];
        frame.render_widget(Paragraph::new(footer), chunks[1]);
    }
}

//! Frame layout: full-screen login, otherwise sidebar + content + status bar

use crate::app::App;
use crate::components::sidebar;
use crate::theme::{self, Palette};
use chanchito_core::RouteId;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if app.route == RouteId::Login {
        let status = app.login.busy.then(|| app.spinner.line("Signing in..."));
        app.login.render(frame, area, status);
    } else {
        render_main(frame, area, app);
    }

    app.toasts.render(frame, area);
}

fn render_main(frame: &mut Frame, area: Rect, app: &mut App) {
    let session = app.session();
    let is_admin = session.as_ref().is_some_and(|s| s.is_admin());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(40)])
        .split(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(columns[1]);
    let content = rows[0];

    sidebar::render(
        frame,
        columns[0],
        &app.entries(),
        app.route,
        session.as_ref(),
    );

    match app.route {
        RouteId::Home => app.home.render(
            frame,
            content,
            session.as_ref(),
            &app.spinner,
            app.options.low_stock_threshold,
        ),
        RouteId::Productos => app.productos.render(frame, content, &app.spinner, true),
        RouteId::Categorias => app.categorias.render(frame, content, &app.spinner, is_admin),
        RouteId::Usuarios => app.usuarios.render(frame, content, &app.spinner, is_admin),
        RouteId::Login => {}
    }

    if let Some(form) = &app.alert {
        form.render(frame, content);
    }

    render_status_bar(frame, rows[1], app);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut hints = vec![
        Span::styled(" [Tab] ", theme::key_hint()),
        Span::raw("view  "),
        Span::styled("[1-9] ", theme::key_hint()),
        Span::raw("jump  "),
    ];
    if app.route == RouteId::Productos {
        hints.extend([
            Span::styled("[p] ", theme::key_hint()),
            Span::raw("PDF report  "),
            Span::styled("[m] ", theme::key_hint()),
            Span::raw("stock alert  "),
        ]);
    }
    if app.is_busy() {
        hints.push(Span::styled(
            format!("{} ", app.spinner.current_frame()),
            Style::default().fg(Palette::FOCUS),
        ));
    }
    hints.extend([
        Span::styled("[L] ", theme::key_hint()),
        Span::raw("log out  "),
        Span::styled("[q] ", theme::key_hint()),
        Span::raw("quit"),
    ]);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(32)])
        .split(area);

    frame.render_widget(Paragraph::new(Line::from(hints)), halves[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(
            app.client.base_url().to_string(),
            Style::default().fg(Palette::MUTED),
        ))
        .alignment(Alignment::Right),
        halves[1],
    );
}

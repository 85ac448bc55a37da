//! Generic list/create/edit/delete screen, one instance per resource
//!
//! The screen owns its list, filter, selection and modal state. Calls are
//! spawned on the runtime and come back as [`CrudMsg`]s tagged with the
//! screen's epoch; results from an older epoch (a previous session) are
//! dropped.

use super::Ctx;
use crate::app::TaskResult;
use crate::components::{
    highlight_matches, ConfirmDialog, ConfirmResult, FormAction, FormModal, SearchBar,
    SearchEvent, Spinner, Toast,
};
use crate::theme::{self, Palette};
use chanchito_core::filter;
use chanchito_core::resources::{FieldKind, FormValues};
use chanchito_core::{ApiError, Categoria, FormMode, ListFilter, Resource};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Created,
    Updated,
    Deleted,
}

impl Mutation {
    fn past_tense(&self) -> &'static str {
        match self {
            Mutation::Created => "created",
            Mutation::Updated => "updated",
            Mutation::Deleted => "deleted",
        }
    }
}

/// Completion of a call started by a [`CrudScreen`]
#[derive(Debug)]
pub enum CrudMsg<R> {
    Loaded {
        epoch: u64,
        result: Result<Vec<R>, ApiError>,
    },
    /// Options for lookup fields (categories)
    Lookup {
        epoch: u64,
        result: Result<Vec<Categoria>, ApiError>,
    },
    Saved {
        epoch: u64,
        mutation: Mutation,
        name: String,
        result: Result<(), ApiError>,
    },
}

struct PendingDelete {
    dialog: ConfirmDialog,
    id: i64,
    name: String,
}

pub struct CrudScreen<R: Resource> {
    items: Vec<R>,
    table: TableState,
    filter: ListFilter,
    search: SearchBar,
    /// List call in flight
    loading: bool,
    /// Mutation in flight
    busy: bool,
    loaded: bool,
    epoch: u64,
    form: Option<FormModal>,
    confirm: Option<PendingDelete>,
    lookup: Vec<(i64, String)>,
    /// Last list failure, shown when there is nothing else to show
    error: Option<String>,
    wrap: fn(CrudMsg<R>) -> TaskResult,
}

impl<R: Resource> CrudScreen<R> {
    /// `wrap` tags this screen's messages for the app's task channel
    pub fn new(wrap: fn(CrudMsg<R>) -> TaskResult) -> Self {
        Self {
            items: Vec::new(),
            table: TableState::default(),
            filter: ListFilter::default(),
            search: SearchBar::new(),
            loading: false,
            busy: false,
            loaded: false,
            epoch: 0,
            form: None,
            confirm: None,
            lookup: Vec::new(),
            error: None,
            wrap,
        }
    }

    /// Drop everything from a previous session; in-flight results are ignored
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self::new(self.wrap);
        self.epoch = epoch;
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn list_filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn form(&self) -> Option<&FormModal> {
        self.form.as_ref()
    }

    pub fn is_confirming(&self) -> bool {
        self.confirm.is_some()
    }

    /// A modal or the filter input is taking keystrokes
    pub fn captures_input(&self) -> bool {
        self.form.is_some() || self.confirm.is_some() || self.search.active
    }

    /// Items passing the filter, in list order
    pub fn visible(&self) -> Vec<&R> {
        filter::apply(&self.items, &self.filter)
    }

    pub fn selected(&self) -> Option<&R> {
        let index = self.table.selected()?;
        self.visible().get(index).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.table.select(None);
        } else {
            let index = self.table.selected().unwrap_or(0).min(len - 1);
            self.table.select(Some(index));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let current = self.table.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table.select(Some(next as usize));
    }

    fn needs_lookup() -> bool {
        R::fields(FormMode::Create)
            .iter()
            .any(|f| matches!(f.kind, FieldKind::Lookup(_)))
    }

    /// Fetch the list (and lookup options when the form needs them)
    pub fn load(&mut self, ctx: &mut Ctx) {
        if self.loading {
            return;
        }
        self.loading = true;

        let epoch = self.epoch;
        let wrap = self.wrap;
        let client = ctx.client.clone();
        let tx = ctx.tx.clone();
        tokio::spawn(async move {
            let result = client.crud::<R>().list().await;
            let _ = tx.send(wrap(CrudMsg::Loaded { epoch, result }));
        });

        if Self::needs_lookup() {
            let client = ctx.client.clone();
            let tx = ctx.tx.clone();
            tokio::spawn(async move {
                let result = client.crud::<Categoria>().list().await;
                let _ = tx.send(wrap(CrudMsg::Lookup { epoch, result }));
            });
        }
    }

    fn may_mutate(&self, ctx: &mut Ctx) -> bool {
        if self.busy {
            return false;
        }
        let allowed = !R::ADMIN_MUTATIONS
            || ctx
                .client
                .session()
                .current()
                .is_some_and(|s| s.is_admin());
        if !allowed {
            ctx.toasts.push(Toast::warning(format!(
                "Only administrators can modify {}",
                R::PLURAL
            )));
        }
        allowed
    }

    fn open_form(&mut self, mode: FormMode, values: Option<FormValues>) {
        let fields = R::fields(mode);
        let values = values.unwrap_or_else(|| FormValues::defaults_for(&fields));
        let title = match mode {
            FormMode::Create => format!("New {}", R::SINGULAR),
            FormMode::Edit(id) => format!("Edit {} #{}", R::SINGULAR, id),
        };
        self.form =
            Some(FormModal::new(title, mode, fields, values).with_lookup(self.lookup.clone()));
    }

    /// Returns false when the key meant nothing to this screen
    pub fn handle_key(&mut self, key: KeyCode, ctx: &mut Ctx) -> bool {
        if let Some(pending) = self.confirm.as_mut() {
            if let Some(result) = pending.dialog.handle_key(key) {
                let pending = self.confirm.take();
                if let (ConfirmResult::Yes, Some(pending)) = (result, pending) {
                    self.delete(pending.id, pending.name, ctx);
                }
            }
            return true;
        }

        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                Some(FormAction::Submit) => self.submit_form(ctx),
                Some(FormAction::Cancel) => self.form = None,
                None => {}
            }
            return true;
        }

        if self.search.active {
            match self.search.handle_key(key) {
                SearchEvent::Changed | SearchEvent::Cleared => {
                    self.filter.query = self.search.query.clone();
                    self.clamp_selection();
                }
                SearchEvent::Done | SearchEvent::Ignored => {}
            }
            return true;
        }

        match key {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home | KeyCode::Char('g') => self.move_selection(isize::MIN / 2),
            KeyCode::End | KeyCode::Char('G') => self.move_selection(isize::MAX / 2),
            KeyCode::Char('/') => self.search.active = true,
            KeyCode::Esc => {
                self.search.clear();
                self.filter = ListFilter::default();
                self.clamp_selection();
            }
            KeyCode::Char('f') if R::FILTERS_BY_ROLE => {
                self.filter.cycle_role();
                self.clamp_selection();
            }
            KeyCode::Char('r') => self.load(ctx),
            KeyCode::Char('a') | KeyCode::Char('n') => {
                if self.may_mutate(ctx) {
                    self.open_form(FormMode::Create, None);
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let Some((id, values)) = self.selected().map(|r| (r.id(), r.to_form())) else {
                    return true;
                };
                if self.may_mutate(ctx) {
                    self.open_form(FormMode::Edit(id), Some(values));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let Some((id, name)) = self
                    .selected()
                    .map(|r| (r.id(), r.display_name().to_string()))
                else {
                    return true;
                };
                if self.may_mutate(ctx) {
                    let mut dialog = ConfirmDialog::new(
                        format!("Delete {}", R::SINGULAR),
                        format!("Delete {} '{}'? This cannot be undone.", R::SINGULAR, name),
                    );
                    dialog.show();
                    self.confirm = Some(PendingDelete { dialog, id, name });
                }
            }
            _ => return false,
        }
        true
    }

    fn submit_form(&mut self, ctx: &mut Ctx) {
        if self.busy {
            return;
        }
        let Some(form) = self.form.as_mut() else {
            return;
        };

        let draft = match R::draft(&form.values, form.mode) {
            Ok(draft) => draft,
            Err(e) => {
                form.error = Some(e.to_string());
                return;
            }
        };
        form.error = None;

        let mode = form.mode;
        let name = R::fields(mode)
            .first()
            .map(|f| form.values.get(f.key).trim().to_string())
            .unwrap_or_default();

        self.busy = true;
        let epoch = self.epoch;
        let wrap = self.wrap;
        let client = ctx.client.clone();
        let tx = ctx.tx.clone();
        tokio::spawn(async move {
            let api = client.crud::<R>();
            let (mutation, result) = match mode {
                FormMode::Create => (Mutation::Created, api.create(&draft).await),
                FormMode::Edit(id) => (Mutation::Updated, api.update(id, &draft).await),
            };
            let _ = tx.send(wrap(CrudMsg::Saved {
                epoch,
                mutation,
                name,
                result,
            }));
        });
    }

    fn delete(&mut self, id: i64, name: String, ctx: &mut Ctx) {
        self.busy = true;
        let epoch = self.epoch;
        let wrap = self.wrap;
        let client = ctx.client.clone();
        let tx = ctx.tx.clone();
        tokio::spawn(async move {
            let result = client.crud::<R>().delete(id).await;
            let _ = tx.send(wrap(CrudMsg::Saved {
                epoch,
                mutation: Mutation::Deleted,
                name,
                result,
            }));
        });
    }

    /// Apply a completed call
    pub fn apply(&mut self, msg: CrudMsg<R>, ctx: &mut Ctx) {
        match msg {
            CrudMsg::Loaded { epoch, result } => {
                if epoch != self.epoch {
                    debug!(resource = R::SEGMENT, "Dropping stale list result");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(items) => {
                        self.items = items;
                        self.loaded = true;
                        self.error = None;
                        self.clamp_selection();
                    }
                    Err(e) => {
                        if !e.is_session_expired() {
                            self.error = Some(format!("Could not load {}: {}", R::PLURAL, e));
                        }
                        if let Some(message) = ctx.report(&e) {
                            ctx.toasts.push(Toast::error(message));
                        }
                    }
                }
            }
            CrudMsg::Lookup { epoch, result } => {
                if epoch != self.epoch {
                    return;
                }
                match result {
                    Ok(categories) => {
                        self.lookup = categories.into_iter().map(|c| (c.id, c.nombre)).collect();
                    }
                    // The form still works without options; the id is kept as is
                    Err(e) => warn!(error = %e, "Could not load category options"),
                }
            }
            CrudMsg::Saved {
                epoch,
                mutation,
                name,
                result,
            } => {
                if epoch != self.epoch {
                    debug!(resource = R::SEGMENT, "Dropping stale mutation result");
                    return;
                }
                self.busy = false;
                match result {
                    Ok(()) => {
                        ctx.toasts.push(Toast::success(format!(
                            "{} '{}' {}",
                            capitalize(R::SINGULAR),
                            name,
                            mutation.past_tense()
                        )));
                        self.form = None;
                        self.load(ctx);
                    }
                    Err(e) => match (ctx.report(&e), self.form.as_mut()) {
                        (Some(message), Some(form)) => form.error = Some(message),
                        (Some(message), None) => ctx.toasts.push(Toast::error(message)),
                        (None, _) => {}
                    },
                }
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, spinner: &Spinner, can_mutate: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let visible_count = self.visible().len();
        let mut suffix = format!("{} of {}", visible_count, self.items.len());
        if R::FILTERS_BY_ROLE {
            let role = self.filter.role.map_or("all", |r| r.label());
            suffix.push_str(&format!("   role: {} [f]", role));
        }
        self.search.render(frame, chunks[0], Some(&suffix));

        self.render_table(frame, chunks[1], spinner);

        let mut hints = vec![
            Span::styled("[/] ", theme::key_hint()),
            Span::raw("filter  "),
            Span::styled("[r] ", theme::key_hint()),
            Span::raw("reload  "),
        ];
        if can_mutate {
            hints.extend([
                Span::styled("[a] ", theme::key_hint()),
                Span::raw("add  "),
                Span::styled("[e] ", theme::key_hint()),
                Span::raw("edit  "),
                Span::styled("[d] ", theme::key_hint()),
                Span::raw("delete  "),
            ]);
        }
        frame.render_widget(Paragraph::new(Line::from(hints)), chunks[2]);

        if let Some(form) = &self.form {
            form.render(frame, area);
        }
        if let Some(pending) = &self.confirm {
            pending.dialog.render(frame, area);
        }
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect, spinner: &Spinner) {
        let mut title = vec![Span::styled(
            format!(" {} ", capitalize(R::PLURAL)),
            theme::title(),
        )];
        if self.loading || self.busy {
            title.push(Span::raw(format!("{} ", spinner.current_frame())));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border(!self.captures_input()))
            .title(Line::from(title));

        let query = self.filter.query.clone();
        let rows: Vec<Row> = self
            .visible()
            .into_iter()
            .map(|item| {
                Row::new(
                    item.cells()
                        .into_iter()
                        .map(|cell| Cell::from(Line::from(highlight_matches(&cell, &query)))),
                )
            })
            .collect();

        if rows.is_empty() {
            let message = if self.loading && !self.loaded {
                spinner.line(&format!("Loading {}...", R::PLURAL))
            } else if let Some(error) = &self.error {
                Line::from(Span::styled(
                    error.clone(),
                    Style::default().fg(Palette::ERROR),
                ))
            } else if self.items.is_empty() {
                Line::from(Span::styled(
                    format!("No {} registered.", R::PLURAL),
                    theme::muted(),
                ))
            } else {
                Line::from(Span::styled(
                    format!("No {} match the filter.", R::PLURAL),
                    theme::muted(),
                ))
            };
            frame.render_widget(Paragraph::new(message).block(block), area);
            return;
        }

        let header = Row::new(R::columns().iter().map(|c| Cell::from(c.header))).style(
            Style::default()
                .fg(Palette::ACCENT)
                .add_modifier(Modifier::BOLD),
        );
        let widths: Vec<Constraint> = R::columns()
            .iter()
            .map(|c| Constraint::Percentage(c.width))
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::selected())
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(table, area, &mut self.table);
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

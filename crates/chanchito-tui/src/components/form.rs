//! Modal form driven by a resource field schema

use crate::theme::{self, Palette};
use chanchito_core::resources::{FieldKind, FieldSpec, FormMode, FormValues};
use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct FormModal {
    title: String,
    pub mode: FormMode,
    fields: Vec<FieldSpec>,
    pub values: FormValues,
    /// Options for lookup fields: (id, label)
    lookup: Vec<(i64, String)>,
    focus: usize,
    /// Inline validation or server message
    pub error: Option<String>,
}

impl FormModal {
    pub fn new(
        title: impl Into<String>,
        mode: FormMode,
        fields: Vec<FieldSpec>,
        values: FormValues,
    ) -> Self {
        Self {
            title: title.into(),
            mode,
            fields,
            values,
            lookup: Vec::new(),
            focus: 0,
            error: None,
        }
    }

    pub fn with_lookup(mut self, options: Vec<(i64, String)>) -> Self {
        self.lookup = options;
        self
    }

    pub fn focused(&self) -> Option<&FieldSpec> {
        self.fields.get(self.focus)
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<FormAction> {
        match key {
            KeyCode::Esc => return Some(FormAction::Cancel),
            KeyCode::Enter => return Some(FormAction::Submit),
            KeyCode::Tab | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
            KeyCode::Left => self.cycle(-1),
            KeyCode::Right => self.cycle(1),
            KeyCode::Backspace => {
                if let Some(field) = self.editable_field() {
                    let mut value = self.values.get(field.key).to_string();
                    value.pop();
                    self.values.set(field.key, value);
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.editable_field() {
                    if accepts(&field.kind, c) {
                        let value = format!("{}{}", self.values.get(field.key), c);
                        self.values.set(field.key, value);
                    }
                } else if c == ' ' {
                    self.cycle(1);
                }
            }
            _ => {}
        }
        None
    }

    fn editable_field(&self) -> Option<FieldSpec> {
        self.focused()
            .filter(|f| !matches!(f.kind, FieldKind::Choice(_) | FieldKind::Lookup(_)))
            .cloned()
    }

    fn move_focus(&mut self, delta: isize) {
        if self.fields.is_empty() {
            return;
        }
        let len = self.fields.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    /// Step a choice or lookup field through its options
    fn cycle(&mut self, delta: isize) {
        let Some(field) = self.focused().cloned() else {
            return;
        };
        let options: Vec<String> = match field.kind {
            FieldKind::Choice(options) => options.iter().map(|o| o.to_string()).collect(),
            // Empty string is "no category"
            FieldKind::Lookup(_) => std::iter::once(String::new())
                .chain(self.lookup.iter().map(|(id, _)| id.to_string()))
                .collect(),
            _ => return,
        };
        if options.is_empty() {
            return;
        }

        let current = self.values.get(field.key);
        let pos = options.iter().position(|o| o == current).unwrap_or(0) as isize;
        let next = (pos + delta).rem_euclid(options.len() as isize) as usize;
        self.values.set(field.key, options[next].clone());
    }

    fn display_value(&self, field: &FieldSpec) -> String {
        let raw = self.values.get(field.key);
        match field.kind {
            FieldKind::Secret => "•".repeat(raw.chars().count()),
            FieldKind::Lookup(_) => {
                if raw.is_empty() {
                    return "(none)".to_string();
                }
                self.lookup
                    .iter()
                    .find(|(id, _)| id.to_string() == raw)
                    .map(|(_, label)| label.clone())
                    .unwrap_or_else(|| format!("#{}", raw))
            }
            _ => raw.to_string(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = 60.min(area.width);
        let height = (self.fields.len() as u16 * 2 + 6).min(area.height);
        let dialog = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::ACCENT))
            .title(Span::styled(format!(" {} ", self.title), theme::title()));

        let mut lines = Vec::new();
        for (idx, field) in self.fields.iter().enumerate() {
            let focused = idx == self.focus;
            let marker = if field.required { "*" } else { " " };
            let label_style = if focused {
                Style::default()
                    .fg(Palette::FOCUS)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Palette::FG)
            };

            let mut value = self.display_value(field);
            if matches!(field.kind, FieldKind::Choice(_) | FieldKind::Lookup(_)) {
                value = format!("◀ {} ▶", value);
            } else if focused {
                value.push('_');
            }

            lines.push(Line::from(vec![
                Span::styled(format!("{}{:<12}", marker, field.label), label_style),
                Span::styled(
                    value,
                    if focused {
                        Style::default().fg(Palette::FG)
                    } else {
                        theme::muted()
                    },
                ),
            ]));
            lines.push(Line::from(""));
        }

        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                error.as_str(),
                Style::default().fg(Palette::ERROR),
            )));
        }
        lines.push(Line::from(vec![
            Span::styled("[Enter] ", theme::key_hint()),
            Span::raw("save  "),
            Span::styled("[Tab] ", theme::key_hint()),
            Span::raw("next  "),
            Span::styled("[←→] ", theme::key_hint()),
            Span::raw("choose  "),
            Span::styled("[Esc] ", theme::key_hint()),
            Span::raw("cancel"),
        ]));

        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false }),
            dialog,
        );
    }
}

/// Number fields only take characters that can appear in a number
fn accepts(kind: &FieldKind, c: char) -> bool {
    match kind {
        FieldKind::Integer => c.is_ascii_digit() || c == '-',
        FieldKind::Decimal => c.is_ascii_digit() || matches!(c, '.' | ',' | '-'),
        _ => !c.is_control(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanchito_core::resources::{Producto, Resource, Usuario};

    fn type_str(form: &mut FormModal, text: &str) {
        for c in text.chars() {
            form.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_into_fields() {
        let fields = Producto::fields(FormMode::Create);
        let values = FormValues::defaults_for(&fields);
        let mut form = FormModal::new("New product", FormMode::Create, fields, values);

        type_str(&mut form, "Alcancía");
        form.handle_key(KeyCode::Tab);
        form.handle_key(KeyCode::Tab);
        // Letters are dropped from the price field
        type_str(&mut form, "1x2,5");

        assert_eq!(form.values.get("nombre"), "Alcancía");
        assert_eq!(form.values.get("precio"), "12,5");
    }

    #[test]
    fn test_choice_cycles_with_arrows() {
        let fields = Usuario::fields(FormMode::Create);
        let values = FormValues::defaults_for(&fields);
        let mut form = FormModal::new("New user", FormMode::Create, fields, values);

        while form.focused().map(|f| f.key) != Some("role") {
            form.handle_key(KeyCode::Tab);
        }
        assert_eq!(form.values.get("role"), "admin");
        form.handle_key(KeyCode::Right);
        assert_eq!(form.values.get("role"), "empleado");
        form.handle_key(KeyCode::Right);
        assert_eq!(form.values.get("role"), "admin");
        // Typing does not edit a choice
        form.handle_key(KeyCode::Char('x'));
        assert_eq!(form.values.get("role"), "admin");
    }

    #[test]
    fn test_lookup_includes_none() {
        let fields = Producto::fields(FormMode::Create);
        let values = FormValues::defaults_for(&fields);
        let mut form = FormModal::new("New product", FormMode::Create, fields, values)
            .with_lookup(vec![(3, "Regalos".to_string()), (7, "Papelería".to_string())]);

        while form.focused().map(|f| f.key) != Some("categoriaId") {
            form.handle_key(KeyCode::Tab);
        }
        form.handle_key(KeyCode::Right);
        assert_eq!(form.values.get("categoriaId"), "3");
        form.handle_key(KeyCode::Left);
        assert_eq!(form.values.get("categoriaId"), "");
        form.handle_key(KeyCode::Left);
        assert_eq!(form.values.get("categoriaId"), "7");
    }

    #[test]
    fn test_enter_and_escape() {
        let mut form = FormModal::new("x", FormMode::Create, Vec::new(), FormValues::new());
        assert_eq!(form.handle_key(KeyCode::Enter), Some(FormAction::Submit));
        assert_eq!(form.handle_key(KeyCode::Esc), Some(FormAction::Cancel));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use expandable::descriptor::{CellKind, RowDescriptor};

use crate::app::{App, SLIDER_MAX};

/// Points per terminal line when mapping row heights.
const POINTS_PER_LINE: f32 = 60.0;
const SLIDER_CELLS: usize = 10;
const LABEL_WIDTH: usize = 16;

pub struct FormView<'a> {
    pub app: &'a App,
}

impl<'a> FormView<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }

    /// All lines of the form, plus the index of the selected row's first line.
    fn lines(&self) -> (Vec<Line<'static>>, usize) {
        let app = self.app;
        let form = &app.form;
        let colors = &app.theme.colors;
        let selected = app.selected();

        let mut lines = Vec::new();
        let mut selected_line = 0;
        for s in 0..form.section_count() {
            if s > 0 {
                lines.push(Line::default());
            }
            let title = form.section_title(s).unwrap_or_default().to_uppercase();
            lines.push(Line::from(Span::styled(
                format!(" {title}"),
                Style::default()
                    .fg(colors.header_fg())
                    .add_modifier(Modifier::BOLD),
            )));

            let count = form.visible_row_count(s).unwrap_or(0);
            for p in 0..count {
                let Ok(row) = form.row_content(s, p) else {
                    continue;
                };
                let is_selected = selected == Some((s, p));
                if is_selected {
                    selected_line = lines.len();
                }
                let base = if is_selected {
                    Style::default().fg(colors.fg()).bg(colors.selected_bg())
                } else {
                    Style::default().fg(colors.fg())
                };

                lines.push(Line::from(self.row_spans(s, p, row, base)).style(base));
                let height = line_count(form.row_height(row.cell_kind));
                for _ in 1..height {
                    lines.push(Line::default().style(base));
                }
            }
        }
        (lines, selected_line)
    }

    fn row_spans(&self, section: usize, position: usize, row: &RowDescriptor, base: Style) -> Vec<Span<'static>> {
        let app = self.app;
        let colors = &app.theme.colors;
        let dim = base.fg(colors.dim());

        match row.cell_kind {
            CellKind::Normal => {
                let marker = match (row.is_expandable, row.is_expanded) {
                    (false, _) => "   ",
                    (true, false) => " ▸ ",
                    (true, true) => " ▾ ",
                };
                let mut spans = vec![Span::styled(marker, base.fg(colors.accent()))];
                if let Some(label) = &row.secondary_title {
                    spans.push(Span::styled(format!("{label:<LABEL_WIDTH$} "), dim));
                }
                spans.push(Span::styled(row.primary_title.clone(), base));
                spans
            }
            CellKind::TextField => {
                let editing = app.editing.as_ref().filter(|edit| {
                    form_position(app, edit.at.section, edit.at.row) == Some((section, position))
                });
                match editing {
                    Some(edit) => vec![
                        Span::raw("     "),
                        Span::styled(
                            format!("{}_", edit.text),
                            base.bg(colors.editing_bg()),
                        ),
                    ],
                    None => vec![
                        Span::raw("     "),
                        Span::styled(format!("[{}]", row.primary_title), dim),
                    ],
                }
            }
            CellKind::DatePicker => vec![
                Span::raw("     "),
                Span::styled("◀ ", base.fg(colors.accent())),
                Span::styled(app.date_text(), base.add_modifier(Modifier::BOLD)),
                Span::styled(" ▶", base.fg(colors.accent())),
            ],
            CellKind::Switch => {
                let mark = if row.switch_is_on() { "[x] " } else { "[ ] " };
                vec![
                    Span::raw("     "),
                    Span::styled(mark, base.fg(colors.accent())),
                    Span::styled(row.primary_title.clone(), base),
                ]
            }
            CellKind::ValuePicker => vec![
                Span::raw("     "),
                Span::styled(row.primary_title.clone(), base),
            ],
            CellKind::Slider => {
                let ratio = (row.slider_value() / SLIDER_MAX).clamp(0.0, 1.0);
                let filled = (ratio * SLIDER_CELLS as f32).round() as usize;
                vec![
                    Span::raw("     "),
                    Span::styled("█".repeat(filled), base.fg(colors.bar_filled())),
                    Span::styled("░".repeat(SLIDER_CELLS - filled), base.fg(colors.bar_empty())),
                    Span::styled(format!(" {}", row.value), dim),
                ]
            }
        }
    }
}

fn form_position(app: &App, section: usize, row: usize) -> Option<(usize, usize)> {
    app.form
        .visibility()
        .position_of(section, row)
        .map(|p| (section, p))
}

/// Terminal lines for a row height given in points. Never less than one.
pub fn line_count(height: f32) -> usize {
    ((height / POINTS_PER_LINE).ceil() as usize).max(1)
}

impl Widget for FormView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = &self.app.theme;
        let colors = &theme.colors;

        let block = Block::bordered()
            .title(format!(" Expandable · {} ", theme.name))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let (lines, selected_line) = self.lines();
        let offset = selected_line.saturating_sub(inner.height as usize - 1);
        Paragraph::new(lines)
            .scroll((offset as u16, 0))
            .render(inner, buf);
    }
}

use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use tracing::debug;

use expandable::descriptor::{CellKind, RowAddress, RowDescriptor};
use expandable::form::{FormController, Refresh};

use crate::ui::theme::Theme;

pub const SLIDER_MIN: f32 = 0.0;
pub const SLIDER_MAX: f32 = 10.0;
pub const DATE_FORMAT: &str = "%b %-d, %Y";

/// Text being typed into a text-field row.
pub struct TextEdit {
    pub at: RowAddress,
    pub text: String,
}

pub struct App {
    pub form: FormController,
    pub theme: Theme,
    /// Index into `positions()`.
    pub cursor: usize,
    pub editing: Option<TextEdit>,
    pub date: NaiveDate,
    pub should_quit: bool,
}

impl App {
    pub fn new(form: FormController, theme: Theme) -> Self {
        Self {
            form,
            theme,
            cursor: 0,
            editing: None,
            date: Local::now().date_naive(),
            should_quit: false,
        }
    }

    /// Every visible row as (section, visible position), top to bottom.
    pub fn positions(&self) -> Vec<(usize, usize)> {
        (0..self.form.section_count())
            .flat_map(|s| {
                let count = self.form.visible_row_count(s).unwrap_or(0);
                (0..count).map(move |p| (s, p))
            })
            .collect()
    }

    pub fn selected(&self) -> Option<(usize, usize)> {
        self.positions().get(self.cursor).copied()
    }

    fn selected_row(&self) -> Result<Option<(RowAddress, &RowDescriptor)>> {
        let Some((section, position)) = self.selected() else {
            return Ok(None);
        };
        let row = self.form.resolve(section, position)?;
        Ok(Some((
            RowAddress::new(section, row),
            self.form.row_content(section, position)?,
        )))
    }

    pub fn move_down(&mut self) {
        if self.editing.is_none() && self.cursor + 1 < self.positions().len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.editing.is_none() && self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Enter/space on the selected row.
    pub fn activate(&mut self) -> Result<()> {
        let Some((at, row)) = self.selected_row()? else {
            return Ok(());
        };
        let kind = row.cell_kind;
        match kind {
            CellKind::TextField => {
                self.editing = Some(TextEdit {
                    at,
                    text: String::new(),
                });
            }
            CellKind::Switch => {
                let is_on = !row.switch_is_on();
                let refresh = self.form.on_switch_toggled(is_on)?;
                self.after(at, refresh);
            }
            CellKind::DatePicker => {
                let text = self.date_text();
                let refresh = self.form.on_date_chosen(&text)?;
                self.after(at, refresh);
            }
            CellKind::Slider => {}
            CellKind::Normal | CellKind::ValuePicker => {
                let position = self.form.visibility().position_of(at.section, at.row);
                if let Some(position) = position {
                    let refresh = self.form.on_row_tapped(at.section, position)?;
                    self.after(at, refresh);
                }
            }
        }
        Ok(())
    }

    /// Left/right on the selected row: steps a slider or the picked date.
    pub fn adjust(&mut self, delta: i32) -> Result<()> {
        let Some((at, row)) = self.selected_row()? else {
            return Ok(());
        };
        let kind = row.cell_kind;
        match kind {
            CellKind::Slider => {
                let value = (row.slider_value() + delta as f32).clamp(SLIDER_MIN, SLIDER_MAX);
                let refresh = self.form.on_slider_changed(value)?;
                self.after(at, refresh);
            }
            CellKind::DatePicker => {
                let days = Days::new(u64::from(delta.unsigned_abs()));
                let next = if delta < 0 {
                    self.date.checked_sub_days(days)
                } else {
                    self.date.checked_add_days(days)
                };
                if let Some(next) = next {
                    self.date = next;
                    let text = self.date_text();
                    let refresh = self.form.on_date_chosen(&text)?;
                    self.after(at, refresh);
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn type_char(&mut self, ch: char) -> Result<()> {
        if let Some(edit) = self.editing.as_mut() {
            edit.text.push(ch);
        }
        self.push_edit()
    }

    pub fn backspace(&mut self) -> Result<()> {
        if let Some(edit) = self.editing.as_mut() {
            edit.text.pop();
        }
        self.push_edit()
    }

    pub fn finish_editing(&mut self) {
        self.editing = None;
    }

    fn push_edit(&mut self) -> Result<()> {
        let Some(edit) = self.editing.as_ref() else {
            return Ok(());
        };
        let at = edit.at;
        let refresh = self.form.on_text_changed(&edit.text, at)?;
        self.after(at, refresh);
        Ok(())
    }

    /// Keeps the cursor on the row it was on, or on the nearest visible row
    /// above it when that row was just hidden.
    fn after(&mut self, at: RowAddress, refresh: Refresh) {
        debug!(?refresh, %at, "form refreshed");
        let rows = self.form.visibility().rows(at.section).unwrap_or(&[]);
        let position = rows.iter().rposition(|&r| r <= at.row).unwrap_or(0);
        let target = (at.section, position);
        if let Some(index) = self.positions().iter().position(|&p| p == target) {
            self.cursor = index;
        } else {
            self.cursor = self.cursor.min(self.positions().len().saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use expandable::config::Config;

    use super::*;

    fn app() -> App {
        let form = FormController::from_config(&Config::default()).unwrap();
        App::new(form, Theme::default())
    }

    #[test]
    fn test_positions_cover_visible_rows() {
        let app = app();
        assert_eq!(app.positions(), vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_activate_expands_and_cursor_stays() {
        let mut app = app();
        app.activate().unwrap();
        assert_eq!(app.form.visible_row_count(0).unwrap(), 5);
        assert_eq!(app.selected(), Some((0, 0)));
    }

    #[test]
    fn test_picking_value_moves_cursor_to_owner() {
        let mut app = app();
        app.cursor = 3; // Favorite Sport
        app.activate().unwrap();
        app.move_down();
        app.move_down(); // Basketball
        app.activate().unwrap();
        assert_eq!(app.form.row_content(1, 0).unwrap().primary_title, "Basketball");
        assert_eq!(app.selected(), Some((1, 0)));
    }

    #[test]
    fn test_typing_updates_full_name() {
        let mut app = app();
        app.activate().unwrap();
        app.move_down(); // Firstname
        app.activate().unwrap();
        for ch in "Ada".chars() {
            app.type_char(ch).unwrap();
        }
        app.finish_editing();
        app.move_down(); // Lastname
        app.activate().unwrap();
        for ch in "Byrox".chars() {
            app.type_char(ch).unwrap();
        }
        app.backspace().unwrap();
        app.type_char('n').unwrap();
        assert_eq!(app.form.row_content(0, 0).unwrap().primary_title, "Ada Byron");
    }

    #[test]
    fn test_slider_adjust_is_clamped() {
        let mut app = app();
        app.cursor = 5; // Level
        app.activate().unwrap();
        app.move_down();
        app.adjust(-1).unwrap();
        assert_eq!(app.form.row_content(2, 0).unwrap().primary_title, "0");
        app.adjust(3).unwrap();
        assert_eq!(app.form.row_content(2, 0).unwrap().primary_title, "3");
        assert_eq!(app.form.document().get(2, 1).unwrap().value, "3");
    }

    #[test]
    fn test_switch_toggles_label() {
        let mut app = app();
        app.cursor = 2; // Marital Status
        app.activate().unwrap();
        app.move_down();
        app.activate().unwrap();
        assert_eq!(app.form.document().get(0, 6).unwrap().primary_title, "Married");
        app.activate().unwrap();
        assert_eq!(app.form.document().get(0, 6).unwrap().primary_title, "Single");
    }

    #[test]
    fn test_date_step_writes_date_row() {
        let mut app = app();
        app.date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        app.cursor = 1; // Date of Birth
        app.activate().unwrap();
        app.move_down();
        app.adjust(1).unwrap();
        assert_eq!(app.form.document().get(0, 3).unwrap().primary_title, "Oct 20, 2026");
    }
}

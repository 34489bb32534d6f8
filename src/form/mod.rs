pub mod compose;

use tracing::{debug, info};

use crate::config::{Config, RowHeights, Wiring};
use crate::descriptor::{CellKind, Document, RowAddress, RowDescriptor};
use crate::error::{FormError, Result};
use crate::projector::{self, VisibilityIndex};

use compose::{NamePart, compose_full_name};

/// Sections the view has to reload after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Refresh {
    None,
    Sections(Vec<usize>),
    All,
}

/// Controller for the form screen. Owns the document and keeps its
/// visibility index current after every command.
#[derive(Debug)]
pub struct FormController {
    document: Document,
    visibility: VisibilityIndex,
    wiring: Wiring,
    row_heights: RowHeights,
}

impl FormController {
    pub fn new(document: Document, wiring: Wiring, row_heights: RowHeights) -> Result<Self> {
        check_wiring(&document, &wiring)?;
        let visibility = projector::recompute_visibility(&document);
        Ok(Self {
            document,
            visibility,
            wiring,
            row_heights,
        })
    }

    /// Loads the configured descriptor file, or the bundled sample.
    pub fn from_config(config: &Config) -> Result<Self> {
        let document = match &config.descriptor_path {
            Some(path) => {
                info!(path = %path.display(), "loading descriptor file");
                Document::load_path(path, &config.section_titles)?
            }
            None => Document::load_bundled(&config.section_titles)?,
        };
        Self::new(document, config.wiring.clone(), config.row_heights)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn visibility(&self) -> &VisibilityIndex {
        &self.visibility
    }

    pub fn wiring(&self) -> &Wiring {
        &self.wiring
    }

    // Queries

    pub fn section_count(&self) -> usize {
        self.document.section_count()
    }

    pub fn visible_row_count(&self, section: usize) -> Result<usize> {
        self.visibility.visible_count(section)
    }

    pub fn row_content(&self, section: usize, visible_position: usize) -> Result<&RowDescriptor> {
        let row = self.resolve(section, visible_position)?;
        self.document.get(section, row)
    }

    pub fn section_title(&self, section: usize) -> Result<&str> {
        self.document.section_title(section)
    }

    pub fn row_height(&self, kind: CellKind) -> f32 {
        self.row_heights.for_kind(kind)
    }

    /// Underlying row index of a visible position.
    pub fn resolve(&self, section: usize, visible_position: usize) -> Result<usize> {
        projector::resolve_visible_position(&self.visibility, section, visible_position)
    }

    // Commands

    pub fn on_row_tapped(&mut self, section: usize, visible_position: usize) -> Result<Refresh> {
        let row = self.resolve(section, visible_position)?;
        let descriptor = self.document.get(section, row)?;

        if descriptor.is_expandable {
            projector::toggle_expansion(&mut self.document, section, row)?;
        } else if descriptor.cell_kind == CellKind::ValuePicker {
            let text = descriptor.primary_title.clone();
            projector::select_value(&mut self.document, section, row, &text)?;
        } else {
            debug!(section, row, kind = %descriptor.cell_kind, "tap ignored");
            return Ok(Refresh::None);
        }
        self.recompute();
        Ok(Refresh::Sections(vec![section]))
    }

    pub fn on_date_chosen(&mut self, text: &str) -> Result<Refresh> {
        projector::set_date_value(&mut self.document, self.wiring.date_row, text)?;
        self.recompute();
        Ok(Refresh::All)
    }

    pub fn on_switch_toggled(&mut self, is_on: bool) -> Result<Refresh> {
        projector::set_switch_value(
            &mut self.document,
            self.wiring.switch_row,
            is_on,
            &self.wiring.switch_labels,
        )?;
        self.recompute();
        Ok(Refresh::All)
    }

    /// Folds an edit of the first- or last-name field into the full-name row.
    pub fn on_text_changed(&mut self, text: &str, originating_row: RowAddress) -> Result<Refresh> {
        let part = if originating_row == self.wiring.first_name_row {
            NamePart::First
        } else if originating_row == self.wiring.last_name_row {
            NamePart::Last
        } else {
            return Err(FormError::TypeMismatch {
                field: "primaryTitle",
                expected: "a name text field",
                found: originating_row.to_string(),
            });
        };
        projector::set_text_value(&mut self.document, self.wiring.name_row, |current| {
            compose_full_name(current, part, text)
        })?;
        self.recompute();
        Ok(Refresh::All)
    }

    pub fn on_slider_changed(&mut self, value: f32) -> Result<Refresh> {
        let display = self.wiring.slider_display_row;
        let holder = self.wiring.slider_value_row;
        if display.section != holder.section {
            return Err(FormError::malformed(format!(
                "slider rows {display} and {holder} are in different sections"
            )));
        }
        projector::set_slider_value(
            &mut self.document,
            display.section,
            display.row,
            holder.row,
            value,
        )?;
        self.recompute();
        Ok(Refresh::Sections(vec![display.section]))
    }

    fn recompute(&mut self) {
        self.visibility = projector::recompute_visibility(&self.document);
    }
}

/// Every wired row must exist and have the kind its callback writes to.
fn check_wiring(document: &Document, wiring: &Wiring) -> Result<()> {
    let checks = [
        ("date_row", wiring.date_row, None),
        ("switch_row", wiring.switch_row, Some(CellKind::Switch)),
        ("name_row", wiring.name_row, None),
        ("first_name_row", wiring.first_name_row, Some(CellKind::TextField)),
        ("last_name_row", wiring.last_name_row, Some(CellKind::TextField)),
        ("slider_display_row", wiring.slider_display_row, None),
        ("slider_value_row", wiring.slider_value_row, Some(CellKind::Slider)),
    ];
    for (name, at, kind) in checks {
        let row = document
            .get(at.section, at.row)
            .map_err(|e| FormError::malformed(format!("wiring {name} {at}: {e}")))?;
        if let Some(kind) = kind
            && row.cell_kind != kind
        {
            return Err(FormError::malformed(format!(
                "wiring {name} {at} is {}, expected {kind}",
                row.cell_kind
            )));
        }
    }
    if wiring.slider_display_row.section != wiring.slider_value_row.section {
        return Err(FormError::malformed(
            "wiring slider_display_row and slider_value_row must share a section",
        ));
    }
    Ok(())
}

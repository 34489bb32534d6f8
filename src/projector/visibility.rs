use crate::descriptor::Document;
use crate::error::{FormError, Result};

/// Per-section list of visible row indices, in row order.
///
/// Derived from a [`Document`] by [`recompute_visibility`]; stale as soon as
/// the document changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityIndex {
    sections: Vec<Vec<usize>>,
}

impl VisibilityIndex {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn rows(&self, section: usize) -> Result<&[usize]> {
        self.sections
            .get(section)
            .map(Vec::as_slice)
            .ok_or_else(|| FormError::out_of_range("section", section, self.sections.len()))
    }

    pub fn visible_count(&self, section: usize) -> Result<usize> {
        Ok(self.rows(section)?.len())
    }

    /// Visible position of an underlying row, if that row is shown.
    pub fn position_of(&self, section: usize, row: usize) -> Option<usize> {
        self.sections.get(section)?.binary_search(&row).ok()
    }
}

pub fn recompute_visibility(document: &Document) -> VisibilityIndex {
    let sections = document
        .sections()
        .iter()
        .map(|section| {
            section
                .rows()
                .iter()
                .enumerate()
                .filter(|(_, row)| row.is_visible)
                .map(|(i, _)| i)
                .collect()
        })
        .collect();
    VisibilityIndex { sections }
}

/// Maps a visible-row ordinal back to the underlying row index.
pub fn resolve_visible_position(
    index: &VisibilityIndex,
    section: usize,
    visible_position: usize,
) -> Result<usize> {
    let rows = index.rows(section)?;
    rows.get(visible_position)
        .copied()
        .ok_or_else(|| FormError::out_of_range("visible position", visible_position, rows.len()))
}

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::{CellKind, Document, RowAddress, RowDescriptor, Section};
use crate::error::{FormError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionState {
    Collapsed,
    Expanded,
}

impl ExpansionState {
    fn from_flag(expanded: bool) -> Self {
        if expanded {
            ExpansionState::Expanded
        } else {
            ExpansionState::Collapsed
        }
    }
}

/// Titles shown on a switch row for its two states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchLabels {
    pub on: String,
    pub off: String,
}

/// Rows belonging to the expansion group of the row at `row`.
pub fn group_range(row: usize, descriptor: &RowDescriptor) -> Range<usize> {
    let start = row.saturating_add(1);
    if descriptor.is_expandable {
        start..start.saturating_add(descriptor.additional_rows)
    } else {
        start..start
    }
}

/// Nearest expandable row above `row`.
pub fn find_owner(section: &Section, row: usize) -> Option<usize> {
    let rows = section.rows();
    (0..row.min(rows.len())).rev().find(|&i| rows[i].is_expandable)
}

fn require_expandable(row: &RowDescriptor) -> Result<()> {
    if row.is_expandable {
        Ok(())
    } else {
        Err(FormError::TypeMismatch {
            field: "isExpandable",
            expected: "an expandable row",
            found: row.cell_kind.to_string(),
        })
    }
}

fn require_kind(row: &RowDescriptor, kind: CellKind) -> Result<()> {
    if row.cell_kind == kind {
        Ok(())
    } else {
        Err(FormError::TypeMismatch {
            field: "cellIdentifier",
            expected: kind.identifier(),
            found: row.cell_kind.to_string(),
        })
    }
}

/// Shows or hides the whole group of the expandable row at `row`.
fn set_expanded(document: &mut Document, section: usize, row: usize, expanded: bool) -> Result<()> {
    let rows = document.rows_mut(section)?;
    let len = rows.len();
    let owner = rows
        .get_mut(row)
        .ok_or_else(|| FormError::out_of_range("row", row, len))?;
    owner.is_expanded = expanded;
    let group = group_range(row, owner);
    for member in &mut rows[group.start.min(len)..group.end.min(len)] {
        member.is_visible = expanded;
    }
    Ok(())
}

pub fn expansion_state(document: &Document, section: usize, row: usize) -> Result<ExpansionState> {
    let descriptor = document.get(section, row)?;
    require_expandable(descriptor)?;
    Ok(ExpansionState::from_flag(descriptor.is_expanded))
}

/// Flips an expandable row between collapsed and expanded, showing or hiding
/// its group to match. Returns the new state.
pub fn toggle_expansion(document: &mut Document, section: usize, row: usize) -> Result<ExpansionState> {
    let descriptor = document.get(section, row)?;
    require_expandable(descriptor)?;
    let expand = !descriptor.is_expanded;
    set_expanded(document, section, row, expand)?;
    debug!(section, row, expand, "toggled expansion");
    Ok(ExpansionState::from_flag(expand))
}

/// Picks the row at `row` as its owner's value: the owner shows
/// `displayed_text` as its title and collapses. Returns the owner's row index.
pub fn select_value(
    document: &mut Document,
    section: usize,
    row: usize,
    displayed_text: &str,
) -> Result<usize> {
    document.get(section, row)?;
    let owner = find_owner(document.section(section)?, row)
        .ok_or(FormError::NoExpandableAncestor { section, row })?;

    document.row_mut(section, owner)?.primary_title = displayed_text.to_string();
    set_expanded(document, section, owner, false)?;
    debug!(section, row, owner, value = displayed_text, "value selected");
    Ok(owner)
}

pub fn set_switch_value(
    document: &mut Document,
    at: RowAddress,
    is_on: bool,
    labels: &SwitchLabels,
) -> Result<()> {
    let row = document.row_mut(at.section, at.row)?;
    require_kind(row, CellKind::Switch)?;
    let (value, label) = if is_on {
        ("true", &labels.on)
    } else {
        ("false", &labels.off)
    };
    row.value = value.to_string();
    row.primary_title.clone_from(label);
    debug!(%at, is_on, "switch changed");
    Ok(())
}

/// Replaces the target row's title with `compose(current_title)`. The
/// composition rule belongs to the caller. Returns the new title.
pub fn set_text_value<F>(document: &mut Document, target: RowAddress, compose: F) -> Result<String>
where
    F: FnOnce(&str) -> String,
{
    let row = document.row_mut(target.section, target.row)?;
    let title = compose(&row.primary_title);
    row.primary_title.clone_from(&title);
    debug!(%target, title = %title, "text composed");
    Ok(title)
}

/// Mirrors one slider value into a display row's title and a value-holder
/// row's stored value.
pub fn set_slider_value(
    document: &mut Document,
    section: usize,
    primary_row: usize,
    value_row: usize,
    new_value: f32,
) -> Result<()> {
    if !new_value.is_finite() {
        return Err(FormError::TypeMismatch {
            field: "value",
            expected: "a finite number",
            found: new_value.to_string(),
        });
    }
    require_kind(document.get(section, value_row)?, CellKind::Slider)?;
    document.get(section, primary_row)?;

    let text = new_value.to_string();
    document.row_mut(section, primary_row)?.primary_title.clone_from(&text);
    document.row_mut(section, value_row)?.value = text;
    debug!(section, primary_row, value_row, new_value, "slider changed");
    Ok(())
}

pub fn set_date_value(document: &mut Document, target: RowAddress, text: &str) -> Result<()> {
    document.row_mut(target.section, target.row)?.primary_title = text.to_string();
    debug!(%target, date = text, "date chosen");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::recompute_visibility;

    fn name_doc() -> Document {
        Document::from_sections(vec![Section::new(
            "Personal",
            vec![
                RowDescriptor::new(CellKind::Normal, "Name").expandable(1),
                RowDescriptor::new(CellKind::TextField, "NameEdit").hidden(),
            ],
        )])
        .unwrap()
    }

    fn picker_doc() -> Document {
        Document::from_sections(vec![Section::new(
            "Preferences",
            vec![
                RowDescriptor::new(CellKind::Normal, "").with_secondary("Sport").expandable(3),
                RowDescriptor::new(CellKind::ValuePicker, "Football").hidden(),
                RowDescriptor::new(CellKind::ValuePicker, "Basketball").hidden(),
                RowDescriptor::new(CellKind::ValuePicker, "Baseball").hidden(),
                RowDescriptor::new(CellKind::ValuePicker, "Loose"),
            ],
        )])
        .unwrap()
    }

    fn labels() -> SwitchLabels {
        SwitchLabels {
            on: "Married".to_string(),
            off: "Single".to_string(),
        }
    }

    #[test]
    fn test_toggle_expands_and_shows_group() {
        let mut doc = name_doc();
        assert_eq!(recompute_visibility(&doc).visible_count(0).unwrap(), 1);

        let state = toggle_expansion(&mut doc, 0, 0).unwrap();
        assert_eq!(state, ExpansionState::Expanded);
        assert!(doc.get(0, 0).unwrap().is_expanded);
        assert!(doc.get(0, 1).unwrap().is_visible);
        assert_eq!(recompute_visibility(&doc).visible_count(0).unwrap(), 2);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut doc = picker_doc();
        let before = doc.clone();
        toggle_expansion(&mut doc, 0, 0).unwrap();
        assert_ne!(doc, before);
        toggle_expansion(&mut doc, 0, 0).unwrap();
        assert_eq!(doc, before);
        assert_eq!(recompute_visibility(&doc).visible_count(0).unwrap(), 2);
    }

    #[test]
    fn test_toggle_non_expandable_is_type_mismatch() {
        let mut doc = name_doc();
        let err = toggle_expansion(&mut doc, 0, 1).unwrap_err();
        assert!(matches!(err, FormError::TypeMismatch { field: "isExpandable", .. }));
        assert!(toggle_expansion(&mut doc, 0, 9).is_err());
    }

    #[test]
    fn test_expansion_state_follows_toggle() {
        let mut doc = name_doc();
        assert_eq!(expansion_state(&doc, 0, 0).unwrap(), ExpansionState::Collapsed);
        toggle_expansion(&mut doc, 0, 0).unwrap();
        assert_eq!(expansion_state(&doc, 0, 0).unwrap(), ExpansionState::Expanded);
    }

    #[test]
    fn test_select_value_sets_owner_title_and_collapses() {
        let mut doc = picker_doc();
        toggle_expansion(&mut doc, 0, 0).unwrap();
        assert_eq!(recompute_visibility(&doc).visible_count(0).unwrap(), 5);

        let owner = select_value(&mut doc, 0, 2, "Basketball").unwrap();
        assert_eq!(owner, 0);
        let owner_row = doc.get(0, 0).unwrap();
        assert_eq!(owner_row.primary_title, "Basketball");
        assert!(!owner_row.is_expanded);
        assert!((1..4).all(|r| !doc.get(0, r).unwrap().is_visible));
        assert_eq!(recompute_visibility(&doc).visible_count(0).unwrap(), 2);
    }

    #[test]
    fn test_select_value_collapses_regardless_of_prior_state() {
        let mut doc = picker_doc();
        select_value(&mut doc, 0, 3, "Baseball").unwrap();
        assert!(!doc.get(0, 0).unwrap().is_expanded);
        assert!((1..4).all(|r| !doc.get(0, r).unwrap().is_visible));
    }

    #[test]
    fn test_select_value_without_owner() {
        let mut doc = picker_doc();
        assert_eq!(
            select_value(&mut doc, 0, 0, "x").unwrap_err(),
            FormError::NoExpandableAncestor { section: 0, row: 0 }
        );
    }

    #[test]
    fn test_select_value_after_group_uses_nearest_expandable_above() {
        let mut doc = picker_doc();
        let owner = select_value(&mut doc, 0, 4, "Loose").unwrap();
        assert_eq!(owner, 0);
        assert_eq!(doc.get(0, 0).unwrap().primary_title, "Loose");
        assert!(!doc.get(0, 0).unwrap().is_expanded);
        assert!(doc.get(0, 4).unwrap().is_visible);
    }

    #[test]
    fn test_switch_sets_value_and_label() {
        let mut doc = Document::from_sections(vec![Section::new(
            "s",
            vec![RowDescriptor::new(CellKind::Switch, "Single").with_value("false")],
        )])
        .unwrap();
        let at = RowAddress::new(0, 0);
        set_switch_value(&mut doc, at, true, &labels()).unwrap();
        assert_eq!(doc.get(0, 0).unwrap().value, "true");
        assert_eq!(doc.get(0, 0).unwrap().primary_title, "Married");
        set_switch_value(&mut doc, at, false, &labels()).unwrap();
        assert_eq!(doc.get(0, 0).unwrap().value, "false");
        assert_eq!(doc.get(0, 0).unwrap().primary_title, "Single");
    }

    #[test]
    fn test_switch_on_wrong_kind() {
        let mut doc = name_doc();
        assert!(set_switch_value(&mut doc, RowAddress::new(0, 0), true, &labels()).is_err());
    }

    #[test]
    fn test_set_text_value_uses_composer() {
        let mut doc = name_doc();
        let title = set_text_value(&mut doc, RowAddress::new(0, 0), |current| {
            format!("{current} Lovelace")
        })
        .unwrap();
        assert_eq!(title, "Name Lovelace");
        assert_eq!(doc.get(0, 0).unwrap().primary_title, "Name Lovelace");
    }

    #[test]
    fn test_slider_mirrors_value_into_two_rows() {
        let mut doc = Document::from_sections(vec![Section::new(
            "Work",
            vec![
                RowDescriptor::new(CellKind::Normal, "0").expandable(1),
                RowDescriptor::new(CellKind::Slider, "").with_value("0").hidden(),
            ],
        )])
        .unwrap();
        set_slider_value(&mut doc, 0, 0, 1, 7.0).unwrap();
        assert_eq!(doc.get(0, 0).unwrap().primary_title, "7");
        assert_eq!(doc.get(0, 1).unwrap().value, "7");

        assert!(set_slider_value(&mut doc, 0, 0, 1, f32::NAN).is_err());
        assert!(set_slider_value(&mut doc, 0, 1, 0, 3.0).is_err());
        assert_eq!(doc.get(0, 1).unwrap().value, "7");
    }

    #[test]
    fn test_date_sets_title() {
        let mut doc = name_doc();
        set_date_value(&mut doc, RowAddress::new(0, 0), "Oct 19, 2026").unwrap();
        assert_eq!(doc.get(0, 0).unwrap().primary_title, "Oct 19, 2026");
    }

    #[test]
    fn test_group_range_of_plain_row_is_empty() {
        let row = RowDescriptor::new(CellKind::Normal, "x");
        assert!(group_range(3, &row).is_empty());
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FormError, Result};

/// Input kind of a row. Serialized as the cell identifier used in descriptor files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    #[serde(rename = "idCellNormal")]
    Normal,
    #[serde(rename = "idCellTextfield")]
    TextField,
    #[serde(rename = "idCellDatePicker")]
    DatePicker,
    #[serde(rename = "idCellSwitch")]
    Switch,
    #[serde(rename = "idCellValuePicker")]
    ValuePicker,
    #[serde(rename = "idCellSlider")]
    Slider,
}

impl CellKind {
    pub const ALL: [CellKind; 6] = [
        CellKind::Normal,
        CellKind::TextField,
        CellKind::DatePicker,
        CellKind::Switch,
        CellKind::ValuePicker,
        CellKind::Slider,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            CellKind::Normal => "idCellNormal",
            CellKind::TextField => "idCellTextfield",
            CellKind::DatePicker => "idCellDatePicker",
            CellKind::Switch => "idCellSwitch",
            CellKind::ValuePicker => "idCellValuePicker",
            CellKind::Slider => "idCellSlider",
        }
    }

    pub fn from_identifier(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.identifier() == id)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// One row of the form: content, input kind and visibility/expansion state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDescriptor {
    #[serde(rename = "cellIdentifier")]
    pub cell_kind: CellKind,
    pub primary_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_title: Option<String>,
    #[serde(default)]
    pub value: String,
    pub is_visible: bool,
    pub is_expandable: bool,
    pub is_expanded: bool,
    pub additional_rows: usize,
}

impl RowDescriptor {
    /// A visible, non-expandable row with the given title.
    pub fn new(cell_kind: CellKind, primary_title: &str) -> Self {
        Self {
            cell_kind,
            primary_title: primary_title.to_string(),
            secondary_title: None,
            value: String::new(),
            is_visible: true,
            is_expandable: false,
            is_expanded: false,
            additional_rows: 0,
        }
    }

    /// Marks the row as the collapsed owner of the next `additional_rows` rows.
    pub fn expandable(mut self, additional_rows: usize) -> Self {
        self.is_expandable = true;
        self.is_expanded = false;
        self.additional_rows = additional_rows;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    pub fn with_secondary(mut self, secondary_title: &str) -> Self {
        self.secondary_title = Some(secondary_title.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Switch state decoded from the text value. Empty means off.
    pub fn switch_is_on(&self) -> bool {
        self.value == "true"
    }

    /// Slider position decoded from the text value. Empty means zero.
    pub fn slider_value(&self) -> f32 {
        self.value.parse().unwrap_or(0.0)
    }

    /// Checks that `value` can be coerced to what this row's kind stores.
    pub(crate) fn check_value(kind: CellKind, value: &str) -> Result<()> {
        let ok = match kind {
            CellKind::Switch => matches!(value, "" | "true" | "false"),
            CellKind::Slider => value.is_empty() || value.parse::<f32>().is_ok_and(f32::is_finite),
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(FormError::TypeMismatch {
                field: Field::Value.name(),
                expected: match kind {
                    CellKind::Switch => "\"true\" or \"false\"",
                    _ => "a number",
                },
                found: format!("{value:?}"),
            })
        }
    }
}

/// Addresses one descriptor by its fixed position in the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowAddress {
    pub section: usize,
    pub row: usize,
}

impl RowAddress {
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Display for RowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.row)
    }
}

/// Writable fields of a [`RowDescriptor`]. The cell kind is fixed at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    PrimaryTitle,
    SecondaryTitle,
    Value,
    IsVisible,
    IsExpandable,
    IsExpanded,
    AdditionalRows,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::PrimaryTitle => "primaryTitle",
            Field::SecondaryTitle => "secondaryTitle",
            Field::Value => "value",
            Field::IsVisible => "isVisible",
            Field::IsExpandable => "isExpandable",
            Field::IsExpanded => "isExpanded",
            Field::AdditionalRows => "additionalRows",
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Field::PrimaryTitle | Field::Value => "text",
            Field::SecondaryTitle => "text or none",
            Field::IsVisible | Field::IsExpandable | Field::IsExpanded => "flag",
            Field::AdditionalRows => "count",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    OptionalText(Option<String>),
    Flag(bool),
    Count(usize),
}

impl FieldValue {
    fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::OptionalText(_) => "optional text",
            FieldValue::Flag(_) => "flag",
            FieldValue::Count(_) => "count",
        }
    }
}

impl RowDescriptor {
    /// Writes one field. Rejects payloads of the wrong type without touching the row.
    pub(crate) fn apply(&mut self, field: Field, value: FieldValue) -> Result<()> {
        match (field, value) {
            (Field::PrimaryTitle, FieldValue::Text(text)) => self.primary_title = text,
            (Field::SecondaryTitle, FieldValue::OptionalText(text)) => self.secondary_title = text,
            (Field::SecondaryTitle, FieldValue::Text(text)) => self.secondary_title = Some(text),
            (Field::Value, FieldValue::Text(text)) => {
                Self::check_value(self.cell_kind, &text)?;
                self.value = text;
            }
            (Field::IsVisible, FieldValue::Flag(flag)) => self.is_visible = flag,
            (Field::IsExpandable, FieldValue::Flag(flag)) => self.is_expandable = flag,
            (Field::IsExpanded, FieldValue::Flag(flag)) => self.is_expanded = flag,
            (Field::AdditionalRows, FieldValue::Count(n)) => self.additional_rows = n,
            (field, other) => {
                return Err(FormError::TypeMismatch {
                    field: field.name(),
                    expected: field.expected(),
                    found: other.kind_name().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_kind_identifier_lookup() {
        for kind in CellKind::ALL {
            assert_eq!(CellKind::from_identifier(kind.identifier()), Some(kind));
        }
        assert_eq!(CellKind::from_identifier("idCellBogus"), None);
    }

    #[test]
    fn test_row_parses_camel_case_and_defaults_optional_fields() {
        let json = r#"{
            "cellIdentifier": "idCellSwitch",
            "primaryTitle": "Single",
            "isVisible": false,
            "isExpandable": false,
            "isExpanded": false,
            "additionalRows": 0
        }"#;
        let row: RowDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(row.cell_kind, CellKind::Switch);
        assert_eq!(row.secondary_title, None);
        assert_eq!(row.value, "");
        assert!(!row.switch_is_on());
    }

    #[test]
    fn test_row_missing_cell_identifier_is_rejected() {
        let json = r#"{"primaryTitle": "x", "isVisible": true, "isExpandable": false,
                       "isExpanded": false, "additionalRows": 0}"#;
        let err = serde_json::from_str::<RowDescriptor>(json).unwrap_err();
        assert!(err.to_string().contains("cellIdentifier"));
    }

    #[test]
    fn test_apply_rejects_wrong_payload_type() {
        let mut row = RowDescriptor::new(CellKind::Normal, "Name");
        let err = row.apply(Field::IsVisible, FieldValue::Text("yes".into())).unwrap_err();
        assert!(matches!(err, FormError::TypeMismatch { field: "isVisible", .. }));
        assert!(row.is_visible);
    }

    #[test]
    fn test_apply_checks_switch_and_slider_values() {
        let mut switch = RowDescriptor::new(CellKind::Switch, "Single");
        assert!(switch.apply(Field::Value, FieldValue::Text("maybe".into())).is_err());
        switch.apply(Field::Value, FieldValue::Text("true".into())).unwrap();
        assert!(switch.switch_is_on());

        let mut slider = RowDescriptor::new(CellKind::Slider, "");
        assert!(slider.apply(Field::Value, FieldValue::Text("lots".into())).is_err());
        assert!(slider.apply(Field::Value, FieldValue::Text("NaN".into())).is_err());
        slider.apply(Field::Value, FieldValue::Text("7.5".into())).unwrap();
        assert!((slider.slider_value() - 7.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_secondary_title_accepts_plain_text() {
        let mut row = RowDescriptor::new(CellKind::Normal, "");
        row.apply(Field::SecondaryTitle, FieldValue::Text("Level".into())).unwrap();
        assert_eq!(row.secondary_title.as_deref(), Some("Level"));
        row.apply(Field::SecondaryTitle, FieldValue::OptionalText(None)).unwrap();
        assert_eq!(row.secondary_title, None);
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::descriptor::schema::{Field, FieldValue, RowDescriptor};
use crate::error::{FormError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    rows: Vec<RowDescriptor>,
}

impl Section {
    pub fn new(title: &str, rows: Vec<RowDescriptor>) -> Self {
        Self {
            title: title.to_string(),
            rows,
        }
    }

    pub fn rows(&self) -> &[RowDescriptor] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The whole descriptor tree. Sole owner of every [`RowDescriptor`]; rows are
/// addressed by `(section, row)` and only change through named operations.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Parses a descriptor source. Bare-array sections are titled "Section N".
    pub fn load(source: &str) -> Result<Self> {
        Self::load_with_titles(source, &[])
    }

    /// Parses a descriptor source. Bare-array section `i` takes `titles[i]`
    /// when present; `{ "title", "rows" }` sections keep their own title.
    pub fn load_with_titles(source: &str, titles: &[String]) -> Result<Self> {
        let raw: Vec<Value> = serde_json::from_str(source)
            .map_err(|e| FormError::malformed(format!("expected a list of sections: {e}")))?;

        let mut sections = Vec::with_capacity(raw.len());
        for (s, entry) in raw.into_iter().enumerate() {
            let (title, rows) = match entry {
                Value::Array(rows) => {
                    let title = titles
                        .get(s)
                        .cloned()
                        .unwrap_or_else(|| format!("Section {}", s + 1));
                    (title, rows)
                }
                Value::Object(mut obj) => {
                    let title = match obj.remove("title") {
                        Some(Value::String(t)) => t,
                        _ => {
                            return Err(FormError::malformed(format!(
                                "section {s}: missing string field `title`"
                            )));
                        }
                    };
                    let rows = match obj.remove("rows") {
                        Some(Value::Array(rows)) => rows,
                        _ => {
                            return Err(FormError::malformed(format!(
                                "section {s}: missing list field `rows`"
                            )));
                        }
                    };
                    (title, rows)
                }
                other => {
                    return Err(FormError::malformed(format!(
                        "section {s}: expected a list of rows, found {}",
                        json_kind(&other)
                    )));
                }
            };

            let rows = rows
                .into_iter()
                .enumerate()
                .map(|(r, row)| {
                    serde_json::from_value::<RowDescriptor>(row)
                        .map_err(|e| FormError::malformed(format!("section {s}, row {r}: {e}")))
                })
                .collect::<Result<Vec<_>>>()?;
            sections.push(Section { title, rows });
        }

        let doc = Self::from_sections(sections)?;
        debug!(
            sections = doc.section_count(),
            rows = doc.sections.iter().map(Section::len).sum::<usize>(),
            "descriptor document loaded"
        );
        Ok(doc)
    }

    /// Builds a document from already-typed sections, enforcing group structure.
    pub fn from_sections(mut sections: Vec<Section>) -> Result<Self> {
        for (s, section) in sections.iter_mut().enumerate() {
            validate_section(s, &mut section.rows)?;
        }
        Ok(Self { sections })
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, section: usize) -> Result<&Section> {
        self.sections
            .get(section)
            .ok_or_else(|| FormError::out_of_range("section", section, self.sections.len()))
    }

    pub fn section_title(&self, section: usize) -> Result<&str> {
        Ok(&self.section(section)?.title)
    }

    pub fn row_count(&self, section: usize) -> Result<usize> {
        Ok(self.section(section)?.len())
    }

    pub fn get(&self, section: usize, row: usize) -> Result<&RowDescriptor> {
        let sec = self.section(section)?;
        sec.rows
            .get(row)
            .ok_or_else(|| FormError::out_of_range("row", row, sec.rows.len()))
    }

    pub(crate) fn row_mut(&mut self, section: usize, row: usize) -> Result<&mut RowDescriptor> {
        let section_len = self.sections.len();
        let sec = self
            .sections
            .get_mut(section)
            .ok_or_else(|| FormError::out_of_range("section", section, section_len))?;
        let len = sec.rows.len();
        sec.rows
            .get_mut(row)
            .ok_or_else(|| FormError::out_of_range("row", row, len))
    }

    pub(crate) fn rows_mut(&mut self, section: usize) -> Result<&mut [RowDescriptor]> {
        let len = self.sections.len();
        self.sections
            .get_mut(section)
            .map(|s| s.rows.as_mut_slice())
            .ok_or_else(|| FormError::out_of_range("section", section, len))
    }

    /// Writes exactly one field of one row. Cross-row effects (group
    /// visibility) are the projector's job, not this call's.
    pub fn set_field(
        &mut self,
        section: usize,
        row: usize,
        field: Field,
        value: FieldValue,
    ) -> Result<()> {
        let row_count = self.row_count(section)?;
        if let (Field::AdditionalRows, FieldValue::Count(n)) = (field, &value) {
            // The group has to stay inside the section.
            if *n > 0 && *n >= row_count.saturating_sub(row) {
                return Err(FormError::out_of_range("row", row.saturating_add(*n), row_count));
            }
        }
        self.row_mut(section, row)?.apply(field, value)?;
        debug!(section, row, field = field.name(), "field written");
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.sections)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a record",
    }
}

/// Checks group structure (one nesting level, groups inside the section) and
/// kind-specific values, then normalizes visibility so that group members
/// follow their owner and rows outside any group are shown.
fn validate_section(s: usize, rows: &mut [RowDescriptor]) -> Result<()> {
    let len = rows.len();
    // Exclusive end of the group currently being scanned.
    let mut group_end = 0;
    for (r, row) in rows.iter().enumerate() {
        RowDescriptor::check_value(row.cell_kind, &row.value)
            .map_err(|e| FormError::malformed(format!("section {s}, row {r}: {e}")))?;

        if row.additional_rows > 0 && !row.is_expandable {
            return Err(FormError::malformed(format!(
                "section {s}, row {r}: additionalRows = {} on a row that is not expandable",
                row.additional_rows
            )));
        }
        if !row.is_expandable {
            continue;
        }
        if r < group_end {
            return Err(FormError::malformed(format!(
                "section {s}, row {r}: expandable row nested inside the group ending at row {}",
                group_end - 1
            )));
        }
        group_end = match (r + 1).checked_add(row.additional_rows) {
            Some(end) if end <= len => end,
            _ => {
                return Err(FormError::malformed(format!(
                    "section {s}, row {r}: group of {} rows runs past the end of the section ({len} rows)",
                    row.additional_rows
                )));
            }
        };
    }

    let mut owner: Option<(usize, bool)> = None;
    for r in 0..len {
        if rows[r].is_expandable {
            owner = Some((r.saturating_add(rows[r].additional_rows), rows[r].is_expanded));
            if !rows[r].is_visible {
                warn!(section = s, row = r, "expandable row marked hidden; showing it");
                rows[r].is_visible = true;
            }
            continue;
        }
        let expected = match owner {
            Some((last, expanded)) if r <= last => expanded,
            _ => true,
        };
        if rows[r].is_visible != expected {
            warn!(
                section = s,
                row = r,
                expected,
                "row visibility disagrees with its owner; normalizing"
            );
            rows[r].is_visible = expected;
        }
    }
    Ok(())
}

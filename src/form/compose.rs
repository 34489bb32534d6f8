/// Which half of a full name a text field edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamePart {
    First,
    Last,
}

/// Combines an edited name part with the current full name.
///
/// The full name is split on spaces. A new first name keeps the old last
/// name only when the current name has exactly two parts.
pub fn compose_full_name(current: &str, part: NamePart, new_text: &str) -> String {
    let parts: Vec<&str> = current.split(' ').collect();
    match part {
        NamePart::First if parts.len() == 2 => format!("{new_text} {}", parts[1]),
        NamePart::First => new_text.to_string(),
        NamePart::Last => format!("{} {new_text}", parts[0]),
    }
}

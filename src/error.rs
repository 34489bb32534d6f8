use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormError>;

/// Errors raised by the descriptor store, the projector and the form controller.
///
/// Only `MalformedConfig` is expected in a correctly wired host. The rest point
/// at a caller bug and must not be swallowed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormError {
    /// Descriptor source (or row wiring) does not match the expected shape.
    #[error("malformed descriptor configuration: {0}")]
    MalformedConfig(String),

    /// A section, row or visible position that does not exist.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A field or operation applied with a value or row of the wrong kind.
    #[error("type mismatch on {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("row {row} in section {section} has no expandable owner")]
    NoExpandableAncestor { section: usize, row: usize },
}

impl FormError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        FormError::MalformedConfig(msg.into())
    }

    pub(crate) fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        FormError::IndexOutOfRange { what, index, len }
    }

    pub fn is_malformed_config(&self) -> bool {
        matches!(self, FormError::MalformedConfig(_))
    }
}

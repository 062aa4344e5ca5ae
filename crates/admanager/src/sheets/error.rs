//! Spreadsheet error kinds

/// Failures reported by a [`super::Spreadsheet`]
///
/// Creation failures are typed so callers can tell a name collision (which
/// they may resolve by renaming) from everything else.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("A sheet with the name \"{0}\" already exists.")]
    NameConflict(String),
    #[error("Template sheet \"{0}\" not found.")]
    TemplateNotFound(String),
    #[error("Range {0} not found.")]
    NamedRangeNotFound(String),
    #[error("Invalid values: {0}")]
    InvalidValues(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl SheetError {
    /// Whether retrying under a different name could succeed
    pub fn is_name_conflict(&self) -> bool {
        matches!(self, Self::NameConflict(_))
    }
}

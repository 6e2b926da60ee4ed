use crate::Status;

/// One table cell, tagged by provenance.
///
/// Raw presence signals arrive as `Bool`, the clinical source and the two
/// passthrough processing fields contribute `Text`, and the reconciliation
/// engine replaces both with `Status` tokens. `Unset` marks a cell no source
/// reported at all, which is a different fact from an explicit `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Unset,
    Bool(bool),
    Status(Status),
    Text(String),
}

impl Cell {
    /// Blank means "no usable signal": unset, or an explicit raw `false`.
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Unset | Cell::Bool(false))
    }

    /// A cell the engine (or a source) already turned into a label.
    pub fn is_classified(&self) -> bool {
        matches!(self, Cell::Status(_) | Cell::Text(_))
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Cell::Bool(true))
    }

    /// The token written to CSV. `Unset` serializes to an empty field.
    pub fn render(&self) -> String {
        match self {
            Cell::Unset => String::new(),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::Status(status) => status.as_str().to_string(),
            Cell::Text(text) => text.clone(),
        }
    }

    /// Parse a CSV field back into a cell.
    ///
    /// Recognizes the boolean spellings the source exports use, then the
    /// engine's own status tokens; anything else is passthrough text.
    pub fn from_raw(field: &str) -> Cell {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Cell::Unset;
        }
        match trimmed {
            "True" | "true" | "TRUE" => return Cell::Bool(true),
            "False" | "false" | "FALSE" => return Cell::Bool(false),
            _ => {}
        }
        match Status::parse(trimmed) {
            Some(status) => Cell::Status(status),
            None => Cell::Text(trimmed.to_string()),
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<Status> for Cell {
    fn from(value: Status) -> Self {
        Cell::Status(value)
    }
}

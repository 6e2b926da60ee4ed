use std::fmt;

use serde::{Deserialize, Serialize};

/// A study visit.
///
/// The `key` names directories and file stems (`newborn`), the `label` is the
/// human-facing header in the report (`Newborn`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Visit {
    key: String,
    label: String,
}

impl Visit {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Visit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Top level of the report header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Acquired,
    Processed,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Acquired => "Acquired",
            Stage::Processed => "Processed",
        }
    }

    pub fn parse(token: &str) -> Option<Stage> {
        match token {
            "Acquired" => Some(Stage::Acquired),
            "Processed" => Some(Stage::Processed),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

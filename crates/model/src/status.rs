use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical tokens the reconciliation engine writes into the table.
///
/// Acquisition cells end up as `Acquired`/`NotAcquired`/`Unknown`, processing
/// cells as `Processed`/`NotProcessed`/`NotApplicable`. `Completed` and
/// `Missing` are reserved for the clinical status and biological sex columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Acquired,
    NotAcquired,
    Unknown,
    Processed,
    NotProcessed,
    NotApplicable,
    Completed,
    Missing,
}

impl Status {
    /// The exact token written to the report CSV.
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Acquired => "Acquired",
            Status::NotAcquired => "Not Acquired",
            Status::Unknown => "Unknown",
            Status::Processed => "Processed",
            Status::NotProcessed => "Not Processed",
            Status::NotApplicable => "N/A",
            Status::Completed => "Completed",
            Status::Missing => "Missing",
        }
    }

    /// Inverse of [`Status::as_str`], used when reading a report back.
    pub fn parse(token: &str) -> Option<Status> {
        match token {
            "Acquired" => Some(Status::Acquired),
            "Not Acquired" => Some(Status::NotAcquired),
            "Unknown" => Some(Status::Unknown),
            "Processed" => Some(Status::Processed),
            "Not Processed" => Some(Status::NotProcessed),
            "N/A" => Some(Status::NotApplicable),
            "Completed" => Some(Status::Completed),
            "Missing" => Some(Status::Missing),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn tokens_round_trip() {
        let all = [
            Status::Acquired,
            Status::NotAcquired,
            Status::Unknown,
            Status::Processed,
            Status::NotProcessed,
            Status::NotApplicable,
            Status::Completed,
            Status::Missing,
        ];
        for status in all {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn unknown_token_is_none() {
        assert_eq!(Status::parse("Half Processed"), None);
        assert_eq!(Status::parse(""), None);
    }
}

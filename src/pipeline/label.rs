//! Class code to status label mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::adapters::ClassCode;

/// Predicted dropout-risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusLabel {
    Dropout,
    Enrolled,
    Graduate,
    /// The classifier emitted a code outside the known mapping.
    Unknown,
}

impl StatusLabel {
    pub const ALL: [StatusLabel; 4] = [
        StatusLabel::Dropout,
        StatusLabel::Enrolled,
        StatusLabel::Graduate,
        StatusLabel::Unknown,
    ];

    /// Literal used in exports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dropout => "Dropout",
            Self::Enrolled => "Enrolled",
            Self::Graduate => "Graduate",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total mapping; codes other than 0, 1 and 2 become [`StatusLabel::Unknown`].
pub const fn map_class_code(code: ClassCode) -> StatusLabel {
    match code {
        0 => StatusLabel::Dropout,
        1 => StatusLabel::Enrolled,
        2 => StatusLabel::Graduate,
        _ => StatusLabel::Unknown,
    }
}

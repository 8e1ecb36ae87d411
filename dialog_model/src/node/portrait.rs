//! Portrait references shown next to a speaker's lines.

use serde::{Deserialize, Serialize};

/// A portrait image reference. `path == None` means "no image".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portrait {
    pub path: Option<String>,
    #[serde(default)]
    pub alt: String,
}

impl Portrait {
    pub fn new(path: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            alt: alt.into(),
        }
    }

    /// A portrait with alt text but no image.
    pub fn text_only(alt: impl Into<String>) -> Self {
        Self {
            path: None,
            alt: alt.into(),
        }
    }
}

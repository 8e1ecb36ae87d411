//! Persistence failures. None of them leave the store partially updated.

use thiserror::Error;

use crate::validation::Issue;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no dialog tree named \"{0}\"")]
    NotFound(String),

    #[error("\"{0}\" is not a valid tree name")]
    InvalidName(String),

    #[error("I/O error on \"{name}\": {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse dialog tree: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("blocked by {} validation error(s)", .issues.len())]
    Blocked { issues: Vec<Issue> },

    #[error("load superseded by a newer load")]
    Superseded,

    #[error("tree has no name to save under")]
    NoTarget,
}

//! Duplicate-key policy used when merging a batch into a dataset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an add resolves a batch record whose ticks already exist in the dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTimeTicks {
    /// Reject the whole batch; nothing is written.
    #[default]
    Fail,
    /// Keep the stored record and drop the colliding batch record.
    Skip,
    /// Overwrite the stored record in place.
    Update,
}

impl fmt::Display for DuplicateTimeTicks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

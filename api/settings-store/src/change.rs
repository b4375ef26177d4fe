//! The change module describes how one key of a settings document changed between the stored
//! values and the working values of an overlay.

use std::fmt;

use crate::store::Value;

/// ItemChange represents the change of one item in a settings document.  Modified changes never
/// have equal old and new values; an item whose value didn't change has no ItemChange at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemChange {
    Added {
        key: String,
        new_value: Value,
    },
    Modified {
        key: String,
        old_value: Value,
        new_value: Value,
    },
    Deleted {
        key: String,
        old_value: Value,
    },
}

impl ItemChange {
    pub fn key(&self) -> &str {
        match self {
            ItemChange::Added { key, .. }
            | ItemChange::Modified { key, .. }
            | ItemChange::Deleted { key, .. } => key,
        }
    }

    /// The value before the change; None for added items.
    pub fn old_value(&self) -> Option<&Value> {
        match self {
            ItemChange::Added { .. } => None,
            ItemChange::Modified { old_value, .. } | ItemChange::Deleted { old_value, .. } => {
                Some(old_value)
            }
        }
    }

    /// The value after the change; None for deleted items.
    pub fn new_value(&self) -> Option<&Value> {
        match self {
            ItemChange::Added { new_value, .. } | ItemChange::Modified { new_value, .. } => {
                Some(new_value)
            }
            ItemChange::Deleted { .. } => None,
        }
    }
}

impl fmt::Display for ItemChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemChange::Added { key, new_value } => {
                write!(f, "setting added: {} = {}", key, new_value)
            }
            ItemChange::Modified {
                key,
                old_value,
                new_value,
            } => write!(
                f,
                "setting modified: {} = {} (was {})",
                key, new_value, old_value
            ),
            ItemChange::Deleted { key, old_value } => {
                write!(f, "setting deleted: {} (was {})", key, old_value)
            }
        }
    }
}

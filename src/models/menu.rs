//! Menu tree node.

use serde::{Deserialize, Serialize};

/// A node in the static-pages menu tree.
///
/// Built bottom-up from flat parent-pointer rows; `label` follows the
/// short-title-else-title rule, and `pages` holds the ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    /// Page id.
    pub id: i64,

    /// Resolved display label.
    pub label: String,

    /// Ordered children, empty for leaves.
    pub pages: Vec<MenuNode>,
}

impl MenuNode {
    /// Create a childless node.
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            pages: Vec::new(),
        }
    }
}

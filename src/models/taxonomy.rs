//! Category tree and tag models.

use serde::{Deserialize, Serialize};

/// A leaf category entry under a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// Taxonomy term id.
    pub id: i64,

    /// Term label with any trailing locale suffix (" @xx") stripped.
    pub label: String,

    /// Term description, "" when absent.
    pub description: String,

    /// External statistical-warehouse reference, "" when unlinked.
    #[serde(rename = "datasetRef")]
    pub dataset_ref: String,

    /// Always empty; category trees are two levels deep.
    pub pages: Vec<CategoryNode>,
}

/// A category family grouping, with its entries as leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFamilyNode {
    /// Family key (e.g. "types", "themes", "regions").
    pub family: String,

    /// Localized family label.
    pub label: String,

    /// Ordered entries, following the underlying fetch order.
    pub pages: Vec<CategoryNode>,
}

/// A tag with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagCount {
    /// Tag label.
    pub name: String,

    /// Number of published posts carrying the tag.
    pub count: i64,
}

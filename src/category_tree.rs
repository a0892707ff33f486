//! Two-level category tree builder.
//!
//! Families ("types", "themes", "regions", …) form the first level; the
//! taxonomy terms parented under each family form the leaves. The two row
//! sets are independent, so they are fetched concurrently and assembled
//! in memory. Entry term names in the store may carry a trailing locale
//! marker (`" @en"`); entry labels are exposed with that marker stripped.
//! Family labels pass through verbatim.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::models::{CategoryFamilyNode, CategoryNode};
use crate::repository::{CategoryEntryRow, ContentRepository, FamilyRow};

#[allow(clippy::expect_used)]
static LOCALE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*@\w{2}\s*$").expect("valid locale-suffix pattern"));

/// Builds the per-language category tree.
pub struct CategoryTreeBuilder<'a> {
    repo: &'a dyn ContentRepository,
}

impl<'a> CategoryTreeBuilder<'a> {
    pub fn new(repo: &'a dyn ContentRepository) -> Self {
        Self { repo }
    }

    pub async fn build(&self, lang: &str) -> Result<Vec<CategoryFamilyNode>> {
        let (families, entries) = tokio::try_join!(
            self.repo.fetch_category_families(lang),
            self.repo.fetch_category_entries(lang),
        )?;

        Ok(assemble(families, entries))
    }
}

/// Attach every entry to its family node, keeping both fetch orders.
///
/// An entry whose family has no label row still gets a node, created
/// lazily with an empty label, so no entry is ever dropped.
fn assemble(families: Vec<FamilyRow>, entries: Vec<CategoryEntryRow>) -> Vec<CategoryFamilyNode> {
    let mut nodes: Vec<CategoryFamilyNode> = Vec::with_capacity(families.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(families.len());

    for family in families {
        index.insert(family.family.clone(), nodes.len());
        nodes.push(CategoryFamilyNode {
            family: family.family,
            label: family.label,
            pages: Vec::new(),
        });
    }

    for entry in entries {
        let position = match index.get(&entry.family) {
            Some(&position) => position,
            None => {
                let position = nodes.len();
                index.insert(entry.family.clone(), position);
                nodes.push(CategoryFamilyNode {
                    family: entry.family.clone(),
                    label: String::new(),
                    pages: Vec::new(),
                });
                position
            }
        };

        nodes[position].pages.push(CategoryNode {
            id: entry.id,
            label: strip_locale_suffix(&entry.label),
            description: entry.description,
            dataset_ref: entry.dataset_ref.unwrap_or_default(),
            pages: Vec::new(),
        });
    }

    nodes
}

fn strip_locale_suffix(label: &str) -> String {
    LOCALE_SUFFIX.replace(label, "").into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn family(key: &str, label: &str) -> FamilyRow {
        FamilyRow {
            family: key.to_string(),
            label: label.to_string(),
        }
    }

    fn entry(id: i64, label: &str, family: &str, dataset_ref: Option<&str>) -> CategoryEntryRow {
        CategoryEntryRow {
            id,
            label: label.to_string(),
            family: family.to_string(),
            description: String::new(),
            dataset_ref: dataset_ref.map(str::to_string),
        }
    }

    #[test]
    fn entries_attach_under_their_family_in_order() {
        let nodes = assemble(
            vec![family("types", "Tipologie"), family("themes", "Temi")],
            vec![
                entry(1, "Report", "types", None),
                entry(2, "Prices", "themes", Some("DCSP_X")),
                entry(3, "Census", "types", None),
            ],
        );

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].family, "types");
        let ids: Vec<i64> = nodes[0].pages.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(nodes[1].pages[0].dataset_ref, "DCSP_X");
        assert_eq!(nodes[0].pages[0].dataset_ref, "");
    }

    #[test]
    fn unlabelled_family_is_created_lazily() {
        let nodes = assemble(
            vec![family("types", "Tipologie")],
            vec![entry(9, "Orphan", "extras", None)],
        );

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].family, "extras");
        assert_eq!(nodes[1].label, "");
        assert_eq!(nodes[1].pages[0].id, 9);
    }

    #[test]
    fn locale_suffix_strips_entry_labels_only() {
        let nodes = assemble(
            vec![family("themes", "Themes @en")],
            vec![entry(7, "Prices @en", "themes", None)],
        );

        assert_eq!(nodes[0].label, "Themes @en");
        assert_eq!(nodes[0].pages[0].label, "Prices");
    }

    #[test]
    fn locale_suffix_is_stripped_from_labels() {
        assert_eq!(strip_locale_suffix("Prices @en"), "Prices");
        assert_eq!(strip_locale_suffix("Prezzi  @it "), "Prezzi");
        assert_eq!(strip_locale_suffix("Prices"), "Prices");
        // A marker not at the end stays.
        assert_eq!(strip_locale_suffix("Email @ work rules"), "Email @ work rules");
        // Three-letter markers are not locale markers.
        assert_eq!(strip_locale_suffix("Notes @abc"), "Notes @abc");
    }

    #[test]
    fn empty_inputs_yield_empty_tree() {
        assert!(assemble(Vec::new(), Vec::new()).is_empty());
    }
}

//! Recursive static-pages menu builder.
//!
//! The store keeps pages as flat rows with parent pointers; this module
//! turns them into a nested tree. Children are fetched one level at a
//! time: all ids of the current level go into a single batched query, and
//! recursion stops at the first level that comes back empty. A tree of
//! depth N therefore costs N+1 child fetches, independent of its width.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::models::MenuNode;
use crate::repository::{ChildRow, ContentRepository};

type LevelFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<MenuNode>>> + Send + 'a>>;

/// Builds the per-language menu tree from configured roots.
pub struct MenuTreeBuilder<'a> {
    repo: &'a dyn ContentRepository,
}

impl<'a> MenuTreeBuilder<'a> {
    pub fn new(repo: &'a dyn ContentRepository) -> Self {
        Self { repo }
    }

    /// Build the full tree for a language. Roots keep their configured
    /// order; children keep menu order within each parent.
    pub async fn build(&self, lang: &str) -> Result<Vec<MenuNode>> {
        let roots = self.repo.fetch_menu_roots(lang).await?;
        let level = roots
            .into_iter()
            .map(|root| MenuNode::new(root.id, root.label))
            .collect();

        self.expand_level(level).await
    }

    /// Attach descendants to every node of one level.
    ///
    /// The level is flattened for the recursive call so each depth costs
    /// exactly one fetch; the expanded children are redistributed back to
    /// their parents by count, which is order-preserving.
    fn expand_level(&self, mut level: Vec<MenuNode>) -> LevelFuture<'_> {
        Box::pin(async move {
            if level.is_empty() {
                return Ok(level);
            }

            let ids: Vec<i64> = level.iter().map(|node| node.id).collect();
            let rows = self.repo.fetch_children(&ids).await?;
            if rows.is_empty() {
                return Ok(level);
            }

            let mut grouped = group_children(rows);

            let mut counts = Vec::with_capacity(level.len());
            let mut flat = Vec::new();
            for node in &level {
                let children = grouped.remove(&node.id).unwrap_or_default();
                counts.push(children.len());
                flat.extend(children);
            }

            let mut expanded = self.expand_level(flat).await?.into_iter();
            for (node, count) in level.iter_mut().zip(counts) {
                node.pages = expanded.by_ref().take(count).collect();
            }

            Ok(level)
        })
    }
}

/// Group child rows by parent, collapsing the per-metadata-key duplicates
/// the fetch produces.
///
/// Label resolution: the first non-empty short title a child shows wins;
/// until one shows up the base title stands in; nothing later overwrites a
/// resolved short title.
fn group_children(rows: Vec<ChildRow>) -> HashMap<i64, Vec<MenuNode>> {
    let mut grouped: HashMap<i64, Vec<MenuNode>> = HashMap::new();
    // child id -> (parent id, index among siblings, short title resolved)
    let mut seen: HashMap<i64, (i64, usize, bool)> = HashMap::new();

    for row in rows {
        let short = row.short_title.filter(|s| !s.is_empty());
        match seen.get_mut(&row.id) {
            None => {
                let resolved = short.is_some();
                let label = short.unwrap_or(row.title);
                let siblings = grouped.entry(row.parent_id).or_default();
                seen.insert(row.id, (row.parent_id, siblings.len(), resolved));
                siblings.push(MenuNode::new(row.id, label));
            }
            Some((parent, index, resolved)) => {
                if !*resolved {
                    if let Some(label) = short {
                        if let Some(node) =
                            grouped.get_mut(parent).and_then(|nodes| nodes.get_mut(*index))
                        {
                            node.label = label;
                            *resolved = true;
                        }
                    }
                }
            }
        }
    }

    grouped
}

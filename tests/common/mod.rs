#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`MockRepository`] is an in-memory [`ContentRepository`] seeded with plain
//! row structs, so the builders, the aggregator, and the service run their
//! real code paths without a database. Every call is recorded in a log so
//! tests can assert on fetch counts and batching.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use raccolta::assets::AssetStore;
use raccolta::error::Result;
use raccolta::filter::ListCriteria;
use raccolta::models::TagCount;
use raccolta::repository::{
    AttachmentRow, BodyRow, CategoryEntryRow, CategoryLinkRow, ChildRow, ContentRepository,
    DocumentRow, FamilyRow, FilteredIds, MenuRootRow, MetaRow, TranslationRow,
};

/// In-memory repository seeded per test.
#[derive(Default)]
pub struct MockRepository {
    pub languages: Vec<String>,
    pub menu_roots: Vec<MenuRootRow>,
    pub children: Vec<ChildRow>,
    pub families: Vec<FamilyRow>,
    pub entries: Vec<CategoryEntryRow>,
    pub tag_counts: Vec<TagCount>,
    pub documents: Vec<DocumentRow>,
    pub links: Vec<CategoryLinkRow>,
    pub metadata: Vec<MetaRow>,
    pub translations: Vec<TranslationRow>,
    pub attachments: HashMap<i64, Vec<AttachmentRow>>,
    pub bodies: Vec<BodyRow>,
    pub filtered: FilteredIds,

    /// One entry per repository call, e.g. `"fetch_children[1, 2]"`.
    pub calls: Mutex<Vec<String>>,
}

impl MockRepository {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    /// Number of recorded calls whose name starts with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl ContentRepository for MockRepository {
    async fn list_language_codes(&self) -> Result<Vec<String>> {
        self.record("list_language_codes".to_string());
        Ok(self.languages.clone())
    }

    async fn fetch_menu_roots(&self, lang: &str) -> Result<Vec<MenuRootRow>> {
        self.record(format!("fetch_menu_roots[{lang}]"));
        Ok(self.menu_roots.clone())
    }

    async fn fetch_children(&self, parent_ids: &[i64]) -> Result<Vec<ChildRow>> {
        self.record(format!("fetch_children{parent_ids:?}"));
        Ok(self
            .children
            .iter()
            .filter(|row| parent_ids.contains(&row.parent_id))
            .cloned()
            .collect())
    }

    async fn fetch_category_families(&self, lang: &str) -> Result<Vec<FamilyRow>> {
        self.record(format!("fetch_category_families[{lang}]"));
        Ok(self.families.clone())
    }

    async fn fetch_category_entries(&self, lang: &str) -> Result<Vec<CategoryEntryRow>> {
        self.record(format!("fetch_category_entries[{lang}]"));
        Ok(self.entries.clone())
    }

    async fn fetch_tag_counts(
        &self,
        lang: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<TagCount>> {
        self.record(format!("fetch_tag_counts[{lang}, {offset}, {limit}]"));
        let mut tags = self.tag_counts.clone();
        if limit > 0 {
            let start = usize::try_from(offset.max(0)).unwrap().min(tags.len());
            let end = start.saturating_add(usize::try_from(limit).unwrap()).min(tags.len());
            tags = tags[start..end].to_vec();
        }
        Ok(tags)
    }

    async fn fetch_documents_by_ids(
        &self,
        ids: &[i64],
        include_body: bool,
    ) -> Result<Vec<DocumentRow>> {
        self.record(format!("fetch_documents_by_ids{ids:?}"));
        Ok(self
            .documents
            .iter()
            .filter(|row| ids.contains(&row.id))
            .cloned()
            .map(|mut row| {
                if !include_body {
                    row.body = None;
                }
                row
            })
            .collect())
    }

    async fn fetch_category_links(&self, ids: &[i64]) -> Result<Vec<CategoryLinkRow>> {
        self.record(format!("fetch_category_links{ids:?}"));
        Ok(self
            .links
            .iter()
            .filter(|row| ids.contains(&row.id))
            .cloned()
            .collect())
    }

    async fn fetch_metadata(&self, ids: &[i64]) -> Result<Vec<MetaRow>> {
        self.record(format!("fetch_metadata{ids:?}"));
        Ok(self
            .metadata
            .iter()
            .filter(|row| ids.contains(&row.id))
            .cloned()
            .collect())
    }

    async fn fetch_translations(
        &self,
        id: i64,
        exclude_lang: &str,
    ) -> Result<Vec<TranslationRow>> {
        self.record(format!("fetch_translations[{id}, {exclude_lang}]"));
        Ok(self
            .translations
            .iter()
            .filter(|row| row.lang != exclude_lang)
            .cloned()
            .collect())
    }

    async fn fetch_attachments(&self, parent_id: i64) -> Result<Vec<AttachmentRow>> {
        self.record(format!("fetch_attachments[{parent_id}]"));
        Ok(self.attachments.get(&parent_id).cloned().unwrap_or_default())
    }

    async fn fetch_bodies_by_ids(&self, ids: &[i64]) -> Result<Vec<BodyRow>> {
        self.record(format!("fetch_bodies_by_ids{ids:?}"));
        Ok(self
            .bodies
            .iter()
            .filter(|row| ids.contains(&row.id))
            .cloned()
            .collect())
    }

    async fn resolve_filtered_ids(
        &self,
        criteria: &ListCriteria,
        offset: i64,
        limit: i64,
    ) -> Result<FilteredIds> {
        self.record(format!(
            "resolve_filtered_ids[{}, {offset}, {limit}]",
            criteria.lang
        ));
        Ok(self.filtered.clone())
    }
}

/// Asset store resolving sizes from a fixed map.
#[derive(Default)]
pub struct MockAssetStore {
    pub sizes: HashMap<String, u64>,
}

impl MockAssetStore {
    pub fn with(sizes: &[(&str, u64)]) -> Self {
        Self {
            sizes: sizes
                .iter()
                .map(|(path, size)| (path.to_string(), *size))
                .collect(),
        }
    }
}

impl AssetStore for MockAssetStore {
    fn size_of(&self, path: &str) -> Option<u64> {
        self.sizes.get(path).copied()
    }
}

// ---------------------------------------------------------------------------
// Row constructors
// ---------------------------------------------------------------------------

pub fn document_row(id: i64, kind: &str, title: &str, body: Option<&str>) -> DocumentRow {
    DocumentRow {
        id,
        kind: kind.to_string(),
        created: 1_331_800_200,
        modified: 1_331_900_000,
        lang: "it".to_string(),
        title: title.to_string(),
        body: body.map(str::to_string),
    }
}

pub fn link_row(
    id: i64,
    family: Option<&str>,
    taxonomy: &str,
    target_id: i64,
    label: &str,
) -> CategoryLinkRow {
    CategoryLinkRow {
        id,
        family: family.map(str::to_string),
        taxonomy: taxonomy.to_string(),
        target_id,
        label: label.to_string(),
    }
}

pub fn meta_row(id: i64, key: &str, value: &str) -> MetaRow {
    MetaRow {
        id,
        key: key.to_string(),
        value: value.to_string(),
    }
}

pub fn child_row(id: i64, parent_id: i64, title: &str, short_title: Option<&str>) -> ChildRow {
    ChildRow {
        id,
        parent_id,
        title: title.to_string(),
        short_title: short_title.map(str::to_string),
    }
}

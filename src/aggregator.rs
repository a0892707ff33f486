//! Document aggregator: merges independently fetched row sets into
//! fully-populated [`Document`] records.
//!
//! Phase one issues the base/category/metadata batch fetches concurrently —
//! they have no mutual data dependency. Full fidelity adds a strict second
//! phase of per-document lookups (translations, attachments, side-post
//! boxes), which needs the resolved ids, kinds, and metadata first.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::TimeZone;

use crate::assets::AssetStore;
use crate::boxes;
use crate::error::Result;
use crate::models::{Attachment, Document, DocumentKind, Fidelity, SidePost, Translation};
use crate::repository::{CategoryLinkRow, ContentRepository, DocumentRow, MetaRow, TranslationRow};

const META_SHORT_TITLE: &str = "titolobreve";
const META_SUB_TITLE: &str = "sottotitolo";
const META_PERIOD: &str = "descrizioneperiodo";
const META_DESCRIPTION: &str = "news";
const META_ABSTRACT: &str = "news_rss";
const META_PUB_DATE: &str = "data_pubblicazione";
const META_IMAGE: &str = "image";
const META_SIDEPOSTS: &str = "docs_linkedSideposts";

/// Marks a tag link in the taxonomy-link rows.
const TAG_TAXONOMY: &str = "post_tag";

/// Per-document category buckets, pre-initialized for every requested id so
/// that absence of rows never produces a missing bucket.
#[derive(Debug, Clone, Default, PartialEq)]
struct CategoryBuckets {
    types: Vec<i64>,
    themes: Vec<i64>,
    regions: Vec<i64>,
    tags: Vec<String>,
}

/// Aggregates document ids into document records at the requested fidelity.
pub struct DocumentAggregator<'a> {
    repo: &'a dyn ContentRepository,
    assets: &'a dyn AssetStore,
    files_base_url: &'a str,
}

impl<'a> DocumentAggregator<'a> {
    pub fn new(
        repo: &'a dyn ContentRepository,
        assets: &'a dyn AssetStore,
        files_base_url: &'a str,
    ) -> Self {
        Self {
            repo,
            assets,
            files_base_url,
        }
    }

    /// Aggregate the given ids, preserving the base fetch order
    /// (menu order asc, created desc). Empty input returns empty output
    /// without touching the store; any fetch failure aborts the whole call.
    pub async fn aggregate(&self, ids: &[i64], fidelity: Fidelity) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let include_body = fidelity == Fidelity::Full;
        let (rows, links, meta_rows) = tokio::try_join!(
            self.repo.fetch_documents_by_ids(ids, include_body),
            self.repo.fetch_category_links(ids),
            self.repo.fetch_metadata(ids),
        )?;

        let mut buckets = bucket_category_links(ids, links);
        let mut meta = bucket_metadata(meta_rows);

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let doc_buckets = buckets.remove(&row.id).unwrap_or_default();
            let doc_meta = meta.remove(&row.id).unwrap_or_default();
            let mut document = mount_document(row, doc_buckets, &doc_meta, fidelity);

            if fidelity == Fidelity::Full {
                self.populate_full(&mut document, &doc_meta).await?;
            }
            documents.push(document);
        }

        Ok(documents)
    }

    /// Second phase: translations for every document, attachments and boxes
    /// for posts.
    async fn populate_full(
        &self,
        document: &mut Document,
        meta: &HashMap<String, String>,
    ) -> Result<()> {
        let rows = self
            .repo
            .fetch_translations(document.id, &document.lang)
            .await?;
        document.translations = group_translations(rows);

        document.attachments = Some(Vec::new());
        document.boxes = Some(Vec::new());

        if document.kind == DocumentKind::Post {
            document.attachments = Some(self.load_attachments(document.id).await?);

            if let Some(raw) = meta.get(META_SIDEPOSTS) {
                document.boxes = Some(self.load_boxes(raw).await?);
            }
        }

        Ok(())
    }

    async fn load_attachments(&self, parent_id: i64) -> Result<Vec<Attachment>> {
        let rows = self.repo.fetch_attachments(parent_id).await?;

        let mut attachments = Vec::with_capacity(rows.len());
        for row in rows {
            let url = row
                .url
                .strip_prefix(self.files_base_url)
                .unwrap_or(&row.url)
                .to_string();
            // Unresolvable size is "size unknown", never an error.
            let size = self
                .assets
                .size_of(&url)
                .map(|n| n.to_string())
                .unwrap_or_default();

            attachments.push(Attachment {
                label: row.label,
                mime_type: row.mime_type,
                url,
                size,
            });
        }

        Ok(attachments)
    }

    /// Decode the side-post blob, remap the two known legacy labels, and
    /// pair each reference with its published body, in decode order.
    async fn load_boxes(&self, raw: &str) -> Result<Vec<SidePost>> {
        let Some(refs) = boxes::decode_linked_sideposts(raw) else {
            tracing::warn!("undecodable side-post metadata blob, skipping boxes");
            return Ok(Vec::new());
        };
        if refs.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = refs.iter().map(|r| r.id).collect();
        let bodies: HashMap<i64, String> = self
            .repo
            .fetch_bodies_by_ids(&ids)
            .await?
            .into_iter()
            .map(|row| (row.id, row.body))
            .collect();

        Ok(refs
            .into_iter()
            .map(|r| SidePost {
                title: remap_box_title(r.title),
                // An unpublished reference keeps its title with an empty body.
                body: bodies.get(&r.id).cloned().unwrap_or_default(),
            })
            .collect())
    }
}

/// Bucket taxonomy-link rows by document id. Every requested id gets a
/// bucket before any row is processed.
fn bucket_category_links(
    ids: &[i64],
    links: Vec<CategoryLinkRow>,
) -> HashMap<i64, CategoryBuckets> {
    let mut buckets: HashMap<i64, CategoryBuckets> = ids
        .iter()
        .map(|id| (*id, CategoryBuckets::default()))
        .collect();

    for link in links {
        let Some(bucket) = buckets.get_mut(&link.id) else {
            continue;
        };
        if link.taxonomy == TAG_TAXONOMY {
            bucket.tags.push(link.label);
        } else {
            match link.family.as_deref() {
                Some("types") => bucket.types.push(link.target_id),
                Some("themes") => bucket.themes.push(link.target_id),
                Some("regions") => bucket.regions.push(link.target_id),
                other => {
                    tracing::debug!(id = link.id, family = ?other, "unbucketed taxonomy link");
                }
            }
        }
    }

    buckets
}

/// Bucket metadata rows into id → key → value.
fn bucket_metadata(rows: Vec<MetaRow>) -> HashMap<i64, HashMap<String, String>> {
    let mut meta: HashMap<i64, HashMap<String, String>> = HashMap::new();
    for row in rows {
        meta.entry(row.id).or_default().insert(row.key, row.value);
    }
    meta
}

/// Assemble one document from its base row, buckets, and metadata.
fn mount_document(
    row: DocumentRow,
    buckets: CategoryBuckets,
    meta: &HashMap<String, String>,
    fidelity: Fidelity,
) -> Document {
    let meta_str = |key: &str| meta.get(key).cloned().unwrap_or_default();

    // The base fetch restricts kind to post|page.
    let kind = match row.kind.as_str() {
        "post" => DocumentKind::Post,
        _ => DocumentKind::Page,
    };

    let created = meta
        .get(META_PUB_DATE)
        .and_then(|value| publication_timestamp(value))
        .unwrap_or(row.created);

    let body = match fidelity {
        Fidelity::Full => Some(row.body.unwrap_or_default()),
        Fidelity::Light => None,
    };

    Document {
        id: row.id,
        kind,
        created,
        modified: row.modified,
        lang: row.lang,
        title: row.title,
        short_title: meta_str(META_SHORT_TITLE),
        sub_title: meta_str(META_SUB_TITLE),
        period: meta_str(META_PERIOD),
        description: meta_str(META_DESCRIPTION),
        summary: meta_str(META_ABSTRACT),
        image: meta_str(META_IMAGE),
        types: buckets.types,
        themes: buckets.themes,
        regions: buckets.regions,
        tags: buckets.tags,
        translations: BTreeMap::new(),
        body,
        attachments: None,
        boxes: None,
    }
}

/// Parse a compact `YYYYMMDD` publication date into that day at 09:30:00
/// local time. Anything not exactly eight digits, or not a calendar date,
/// yields `None` and leaves the original timestamp in place.
fn publication_timestamp(value: &str) -> Option<i64> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = value[..4].parse().ok()?;
    let month: u32 = value[4..6].parse().ok()?;
    let day: u32 = value[6..8].parse().ok()?;

    let date = chrono::NaiveDate::from_ymd_opt(year, month, day)?;
    let time = chrono::NaiveTime::from_hms_opt(9, 30, 0)?;
    chrono::Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.timestamp())
}

/// Group translation rows by language, resolving each label by the
/// short-title-else-title rule: a non-empty short title wins, the first
/// short title seen for a language is kept, and a title never overwrites an
/// already-established label.
fn group_translations(rows: Vec<TranslationRow>) -> BTreeMap<String, Translation> {
    let mut translations: BTreeMap<String, Translation> = BTreeMap::new();
    let mut short_resolved: HashSet<String> = HashSet::new();

    for row in rows {
        let short = row.short_title.filter(|s| !s.is_empty());
        match translations.get_mut(&row.lang) {
            None => {
                if short.is_some() {
                    short_resolved.insert(row.lang.clone());
                }
                let label = short.unwrap_or(row.title);
                translations.insert(
                    row.lang,
                    Translation {
                        id: row.target_id,
                        label,
                    },
                );
            }
            Some(existing) => {
                if !short_resolved.contains(&row.lang) {
                    if let Some(label) = short {
                        existing.label = label;
                        short_resolved.insert(row.lang);
                    }
                }
            }
        }
    }

    translations
}

/// Remap the two known legacy box labels; everything else passes through.
fn remap_box_title(title: String) -> String {
    match title.as_str() {
        "contatti" => "Contatti".to_string(),
        "contatti (en)" => "Contacts".to_string(),
        _ => title,
    }
}

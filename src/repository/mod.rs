//! Repository contract: the single seam to the content store.
//!
//! Every method is a parameterized read query returning plain row sets; any
//! execution failure surfaces as [`crate::Error::BackingStore`] with the
//! engine diagnostic carried verbatim. No method mutates anything.

mod postgres;

pub use postgres::PgContentRepository;

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::ListCriteria;
use crate::models::TagCount;

/// Base document row, ordered by (menu order asc, created desc).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: i64,
    /// Raw kind discriminator; the base fetch restricts it to post|page.
    pub kind: String,
    pub created: i64,
    pub modified: i64,
    pub lang: String,
    pub title: String,
    /// Populated only when the fetch included bodies.
    pub body: Option<String>,
}

/// One taxonomy link of a document.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryLinkRow {
    /// Document id the link belongs to.
    pub id: i64,
    /// Category family label ("types"/"themes"/"regions"), None for tags.
    pub family: Option<String>,
    /// Taxonomy kind; "post_tag" marks a tag link.
    pub taxonomy: String,
    /// Linked taxonomy-term id.
    pub target_id: i64,
    /// Term label (the tag text for tag links).
    pub label: String,
}

/// One metadata key/value of a document.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MetaRow {
    pub id: i64,
    pub key: String,
    pub value: String,
}

/// One row of a document's translation group. A document appears once per
/// metadata key, so the same language may repeat across rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TranslationRow {
    pub lang: String,
    pub target_id: i64,
    pub title: String,
    /// Short-title metadata when this row carries it.
    pub short_title: Option<String>,
}

/// One attachment of a post, ordered by menu order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttachmentRow {
    pub label: String,
    pub mime_type: String,
    pub url: String,
}

/// One child-page row. A child may appear once per metadata key; the
/// tree builder deduplicates.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChildRow {
    pub id: i64,
    pub parent_id: i64,
    pub title: String,
    /// Short-title metadata when this row carries it.
    pub short_title: Option<String>,
}

/// One menu root for a language.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MenuRootRow {
    pub id: i64,
    pub label: String,
}

/// One category family for a language.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FamilyRow {
    pub family: String,
    pub label: String,
}

/// One category entry joined to its family.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryEntryRow {
    pub id: i64,
    pub label: String,
    pub family: String,
    pub description: String,
    pub dataset_ref: Option<String>,
}

/// One published body, for side-post boxes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BodyRow {
    pub id: i64,
    pub body: String,
}

/// Result of a filtered-ids resolution: the page of ids plus the total
/// match count ignoring pagination.
#[derive(Debug, Clone, Default)]
pub struct FilteredIds {
    pub ids: Vec<i64>,
    pub count: i64,
}

/// Read-only access to the content store.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// All configured language codes.
    async fn list_language_codes(&self) -> Result<Vec<String>>;

    /// Menu roots for a language, in menu order.
    async fn fetch_menu_roots(&self, lang: &str) -> Result<Vec<MenuRootRow>>;

    /// Published child pages of the given parents, ordered by parent then
    /// menu order, one row per joined metadata key.
    async fn fetch_children(&self, parent_ids: &[i64]) -> Result<Vec<ChildRow>>;

    /// Category families for a language, in stable family order.
    async fn fetch_category_families(&self, lang: &str) -> Result<Vec<FamilyRow>>;

    /// Category entries for a language, grouped by family.
    async fn fetch_category_entries(&self, lang: &str) -> Result<Vec<CategoryEntryRow>>;

    /// Tags with usage counts, heaviest first, denylisted ids excluded.
    /// `limit <= 0` disables pagination.
    async fn fetch_tag_counts(&self, lang: &str, offset: i64, limit: i64)
    -> Result<Vec<TagCount>>;

    /// Published post/page base rows for the given ids, ordered by
    /// (menu order asc, created desc). Bodies are fetched only on request.
    async fn fetch_documents_by_ids(
        &self,
        ids: &[i64],
        include_body: bool,
    ) -> Result<Vec<DocumentRow>>;

    /// Taxonomy links for the given ids in one batch, denylisted tag ids
    /// excluded.
    async fn fetch_category_links(&self, ids: &[i64]) -> Result<Vec<CategoryLinkRow>>;

    /// Metadata rows for the given ids in one batch.
    async fn fetch_metadata(&self, ids: &[i64]) -> Result<Vec<MetaRow>>;

    /// Translation-group rows of a document, excluding its own language.
    async fn fetch_translations(&self, id: i64, exclude_lang: &str)
    -> Result<Vec<TranslationRow>>;

    /// Attachments of a post, in menu order.
    async fn fetch_attachments(&self, parent_id: i64) -> Result<Vec<AttachmentRow>>;

    /// Published bodies for the given ids, for side-post boxes.
    async fn fetch_bodies_by_ids(&self, ids: &[i64]) -> Result<Vec<BodyRow>>;

    /// Execute the compiled filter criteria: one bounded ids query plus the
    /// total count of matches ignoring pagination.
    async fn resolve_filtered_ids(
        &self,
        criteria: &ListCriteria,
        offset: i64,
        limit: i64,
    ) -> Result<FilteredIds>;
}

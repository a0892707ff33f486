//! PostgreSQL implementation of the repository contract.
//!
//! One parameterized query per method; batch lookups bind id slices with
//! `= ANY($n)`. Errors propagate as [`crate::Error::BackingStore`] carrying
//! the sqlx diagnostic untouched.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    AttachmentRow, BodyRow, CategoryLinkRow, ChildRow, ContentRepository, DocumentRow, FamilyRow,
    FilteredIds, MenuRootRow, MetaRow, TranslationRow,
};
use crate::error::Result;
use crate::filter::{FilterQueryBuilder, ListCriteria};
use crate::models::TagCount;
use crate::repository::CategoryEntryRow;

/// Repository backed by a PostgreSQL pool.
///
/// The pool is the only long-lived resource; it is acquired once and reused
/// across requests.
#[derive(Debug, Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn list_language_codes(&self) -> Result<Vec<String>> {
        let codes = sqlx::query_scalar("SELECT code FROM locale ORDER BY code")
            .fetch_all(&self.pool)
            .await?;

        Ok(codes)
    }

    async fn fetch_menu_roots(&self, lang: &str) -> Result<Vec<MenuRootRow>> {
        let roots = sqlx::query_as::<_, MenuRootRow>(
            "SELECT post_id AS id, label FROM menu_root WHERE lang = $1",
        )
        .bind(lang)
        .fetch_all(&self.pool)
        .await?;

        Ok(roots)
    }

    async fn fetch_children(&self, parent_ids: &[i64]) -> Result<Vec<ChildRow>> {
        // LEFT JOIN over all metadata keys: a child yields one row per key,
        // with short_title set only on its short-title row. The tree builder
        // deduplicates.
        let children = sqlx::query_as::<_, ChildRow>(
            r#"
            SELECT p.id, p.parent_id, p.title,
                   CASE WHEN m.key = 'titolobreve' THEN m.value END AS short_title
            FROM posts p
                LEFT JOIN postmeta m ON m.post_id = p.id
            WHERE p.status = 'publish'
                AND p.kind = 'page'
                AND p.parent_id = ANY($1)
            ORDER BY p.parent_id, p.menu_order
            "#,
        )
        .bind(parent_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(children)
    }

    async fn fetch_category_families(&self, lang: &str) -> Result<Vec<FamilyRow>> {
        let families = sqlx::query_as::<_, FamilyRow>(
            r#"
            SELECT f.family, COALESCE(t.name, '') AS label
            FROM category_family f
                LEFT JOIN terms t ON t.id = f.term_id
            WHERE f.lang = $1
            ORDER BY f.family
            "#,
        )
        .bind(lang)
        .fetch_all(&self.pool)
        .await?;

        Ok(families)
    }

    async fn fetch_category_entries(&self, lang: &str) -> Result<Vec<CategoryEntryRow>> {
        let entries = sqlx::query_as::<_, CategoryEntryRow>(
            r#"
            SELECT t.id, t.name AS label, f.family,
                   COALESCE(x.description, '') AS description,
                   d.dataset_ref
            FROM terms t
                LEFT JOIN term_taxonomy x ON x.term_id = t.id
                LEFT JOIN dataset_link d ON d.term_id = t.id
                LEFT JOIN category_family f ON x.parent = f.term_id
            WHERE f.lang = $1
            ORDER BY f.family
            "#,
        )
        .bind(lang)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn fetch_tag_counts(
        &self,
        lang: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<TagCount>> {
        let mut sql = String::from(
            r#"
            SELECT DISTINCT t.name, x.count
            FROM terms t
                LEFT JOIN term_taxonomy x ON x.term_id = t.id
                LEFT JOIN lang_link l ON l.element_id = t.id
            WHERE x.taxonomy = 'post_tag'
                AND x.count > 0
                AND t.id NOT IN (SELECT term_id FROM tag_denylist)
                AND l.lang = $1
            ORDER BY x.count DESC
            "#,
        );
        // limit <= 0 means "no limit": suppress the clause entirely.
        if limit > 0 {
            sql.push_str(" LIMIT $2 OFFSET $3");
        }

        let mut query = sqlx::query_as::<_, TagCount>(&sql).bind(lang);
        if limit > 0 {
            query = query.bind(limit).bind(offset.max(0));
        }
        let tags = query.fetch_all(&self.pool).await?;

        Ok(tags)
    }

    async fn fetch_documents_by_ids(
        &self,
        ids: &[i64],
        include_body: bool,
    ) -> Result<Vec<DocumentRow>> {
        let body_field = if include_body {
            "COALESCE(p.body, '')"
        } else {
            "NULL::text"
        };
        let sql = format!(
            r#"
            SELECT p.id, p.kind, p.created, p.modified,
                   COALESCE(l.lang, '') AS lang, p.title,
                   {body_field} AS body
            FROM posts p
                LEFT JOIN lang_link l ON l.element_id = p.id
            WHERE (p.kind = 'post' OR p.kind = 'page')
                AND p.status = 'publish'
                AND p.id = ANY($1)
            ORDER BY p.menu_order ASC, p.created DESC
            "#
        );

        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn fetch_category_links(&self, ids: &[i64]) -> Result<Vec<CategoryLinkRow>> {
        let links = sqlx::query_as::<_, CategoryLinkRow>(
            r#"
            SELECT r.object_id AS id, f.family,
                   COALESCE(x.taxonomy, '') AS taxonomy,
                   r.term_taxonomy_id AS target_id,
                   COALESCE(t.name, '') AS label
            FROM term_relationships r
                LEFT JOIN terms t ON t.id = r.term_taxonomy_id
                LEFT JOIN term_taxonomy x ON x.term_taxonomy_id = r.term_taxonomy_id
                LEFT JOIN category_family f ON f.term_id = x.parent
            WHERE (x.taxonomy = 'post_tag' OR f.family IS NOT NULL)
                AND t.id NOT IN (SELECT term_id FROM tag_denylist)
                AND r.object_id = ANY($1)
            ORDER BY r.term_order
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn fetch_metadata(&self, ids: &[i64]) -> Result<Vec<MetaRow>> {
        let rows = sqlx::query_as::<_, MetaRow>(
            "SELECT post_id AS id, key, value FROM postmeta WHERE post_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn fetch_translations(
        &self,
        id: i64,
        exclude_lang: &str,
    ) -> Result<Vec<TranslationRow>> {
        let rows = sqlx::query_as::<_, TranslationRow>(
            r#"
            SELECT l.lang, l.element_id AS target_id, p.title,
                   CASE WHEN m.key = 'titolobreve' THEN m.value END AS short_title
            FROM posts p
                INNER JOIN lang_link l ON l.element_id = p.id
                LEFT JOIN postmeta m ON m.post_id = p.id
            WHERE l.group_id = (SELECT group_id FROM lang_link WHERE element_id = $1)
                AND l.lang <> $2
            "#,
        )
        .bind(id)
        .bind(exclude_lang)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn fetch_attachments(&self, parent_id: i64) -> Result<Vec<AttachmentRow>> {
        let rows = sqlx::query_as::<_, AttachmentRow>(
            r#"
            SELECT title AS label,
                   COALESCE(mime_type, '') AS mime_type,
                   COALESCE(url, '') AS url
            FROM posts
            WHERE kind = 'attachment' AND parent_id = $1
            ORDER BY menu_order
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn fetch_bodies_by_ids(&self, ids: &[i64]) -> Result<Vec<BodyRow>> {
        let rows = sqlx::query_as::<_, BodyRow>(
            r#"
            SELECT id, COALESCE(body, '') AS body
            FROM posts
            WHERE status = 'publish' AND id = ANY($1)
            ORDER BY menu_order
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn resolve_filtered_ids(
        &self,
        criteria: &ListCriteria,
        offset: i64,
        limit: i64,
    ) -> Result<FilteredIds> {
        let builder = FilterQueryBuilder::new(criteria);

        let ids: Vec<i64> = sqlx::query_scalar(&builder.build(offset, limit))
            .fetch_all(&self.pool)
            .await?;
        let count: i64 = sqlx::query_scalar(&builder.build_count())
            .fetch_one(&self.pool)
            .await?;

        Ok(FilteredIds { ids, count })
    }
}

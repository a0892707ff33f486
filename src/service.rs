//! Public façade over the aggregation layer.
//!
//! Each method maps to one read operation: languages, menu trees, category
//! trees, tag counts, single documents, and filtered lists. The service
//! owns the repository and asset-store handles and wires them into the
//! builders per call; it carries no per-request state of its own.

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;

use crate::aggregator::DocumentAggregator;
use crate::assets::{AssetStore, FsAssetStore};
use crate::category_tree::CategoryTreeBuilder;
use crate::config::Config;
use crate::error::Result;
use crate::filter::ListCriteria;
use crate::menu_tree::MenuTreeBuilder;
use crate::models::{CategoryFamilyNode, Document, Fidelity, MenuNode, TagCount};
use crate::repository::{ContentRepository, PgContentRepository};

/// One page of a filtered list: the light documents plus the total number
/// of matches ignoring pagination.
#[derive(Debug, Clone, Serialize)]
pub struct FilteredList {
    pub list: Vec<Document>,
    pub count: i64,
}

/// Read-only content service.
#[derive(Clone)]
pub struct ContentService {
    repo: Arc<dyn ContentRepository>,
    assets: Arc<dyn AssetStore>,
    files_base_url: String,
}

impl ContentService {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        assets: Arc<dyn AssetStore>,
        files_base_url: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            assets,
            files_base_url: files_base_url.into(),
        }
    }

    /// Service backed by PostgreSQL and the configured uploads directory.
    pub fn with_postgres(pool: PgPool, config: &Config) -> Self {
        Self::new(
            Arc::new(PgContentRepository::new(pool)),
            Arc::new(FsAssetStore::new(config.uploads_dir.clone())),
            config.files_base_url.clone(),
        )
    }

    /// All configured language codes.
    pub async fn languages(&self) -> Result<Vec<String>> {
        tracing::debug!("listing languages");
        self.repo.list_language_codes().await
    }

    /// The static-pages menu tree for a language.
    pub async fn pages(&self, lang: &str) -> Result<Vec<MenuNode>> {
        tracing::debug!(lang, "building menu tree");
        MenuTreeBuilder::new(self.repo.as_ref()).build(lang).await
    }

    /// The two-level category tree for a language.
    pub async fn categories(&self, lang: &str) -> Result<Vec<CategoryFamilyNode>> {
        tracing::debug!(lang, "building category tree");
        CategoryTreeBuilder::new(self.repo.as_ref()).build(lang).await
    }

    /// Tags with usage counts, heaviest first. `limit <= 0` disables
    /// pagination.
    pub async fn tags(&self, lang: &str, offset: i64, limit: i64) -> Result<Vec<TagCount>> {
        tracing::debug!(lang, offset, limit, "listing tags");
        self.repo.fetch_tag_counts(lang, offset, limit).await
    }

    /// One document at full fidelity, or `None` when the id does not
    /// resolve to a published post or page.
    pub async fn document(&self, id: i64) -> Result<Option<Document>> {
        tracing::debug!(id, "fetching document");
        let documents = self.aggregator().aggregate(&[id], Fidelity::Full).await?;
        Ok(documents.into_iter().next())
    }

    /// A filtered, paginated list of light documents plus the total match
    /// count.
    pub async fn list(
        &self,
        criteria: &ListCriteria,
        offset: i64,
        limit: i64,
    ) -> Result<FilteredList> {
        tracing::debug!(lang = %criteria.lang, offset, limit, "resolving filtered list");
        let filtered = self.repo.resolve_filtered_ids(criteria, offset, limit).await?;
        let list = self
            .aggregator()
            .aggregate(&filtered.ids, Fidelity::Light)
            .await?;

        Ok(FilteredList {
            list,
            count: filtered.count,
        })
    }

    fn aggregator(&self) -> DocumentAggregator<'_> {
        DocumentAggregator::new(self.repo.as_ref(), self.assets.as_ref(), &self.files_base_url)
    }
}

//! Document model: the fully assembled content record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The two content kinds the aggregator serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Post,
    Page,
}

/// Aggregation fidelity.
///
/// Light carries summary fields only; full adds body, attachments, boxes,
/// and translations, at the cost of per-document follow-up queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fidelity {
    Light,
    Full,
}

/// A reference to the same document in another language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Id of the translated document.
    pub id: i64,

    /// Resolved label: short title when present, base title otherwise.
    pub label: String,
}

/// A file attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display label (the attachment post title).
    pub label: String,

    /// MIME type as stored.
    #[serde(rename = "mimeType")]
    pub mime_type: String,

    /// Store-relative URL (base URL already stripped).
    pub url: String,

    /// Byte size as a decimal string, or "" when the asset store could not
    /// resolve it. Never an error.
    pub size: String,
}

/// A linked side-post snippet ("box"), ordered as decoded from the legacy
/// serialized metadata blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePost {
    pub title: String,
    pub body: String,
}

/// Fully assembled document record.
///
/// Category buckets and `translations` are always present (possibly empty)
/// regardless of fidelity; `body`/`attachments`/`boxes` are populated only
/// at full fidelity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id.
    pub id: i64,

    /// Content kind (`post` or `page`).
    #[serde(rename = "type")]
    pub kind: DocumentKind,

    /// Unix timestamp of creation; may be overridden by the publication-date
    /// metadata (see the aggregator).
    pub created: i64,

    /// Unix timestamp of last modification.
    pub modified: i64,

    /// Language code.
    pub lang: String,

    /// Base title.
    pub title: String,

    /// Short title metadata, "" when absent.
    #[serde(rename = "shortTitle")]
    pub short_title: String,

    /// Subtitle metadata, "" when absent.
    #[serde(rename = "subTitle")]
    pub sub_title: String,

    /// Reference-period description metadata, "" when absent.
    pub period: String,

    /// News description metadata, "" when absent.
    pub description: String,

    /// Feed abstract metadata, "" when absent.
    #[serde(rename = "abstract")]
    pub summary: String,

    /// Image reference metadata, "" when absent.
    pub image: String,

    /// Taxonomy ids bucketed under the "types" family.
    pub types: Vec<i64>,

    /// Taxonomy ids bucketed under the "themes" family.
    pub themes: Vec<i64>,

    /// Taxonomy ids bucketed under the "regions" family.
    pub regions: Vec<i64>,

    /// Tag labels (denylisted tags never appear here).
    pub tags: Vec<String>,

    /// Language → translated-document reference.
    pub translations: BTreeMap<String, Translation>,

    /// Raw body; full fidelity only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Attachments ordered by menu order; full fidelity only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,

    /// Linked side-post boxes in decode order; full fidelity only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boxes: Option<Vec<SidePost>>,
}

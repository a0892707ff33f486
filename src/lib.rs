//! Raccolta — read-only content aggregation over a WordPress-style document store.
//!
//! Given a relational store holding loosely-joined content rows (documents,
//! per-document key/value metadata, taxonomy links, hierarchical menus), this
//! crate reconstructs nested, typed domain objects:
//!
//! - [`service::ContentService`] is the public façade (languages, menu trees,
//!   category trees, tag counts, single documents, filtered lists)
//! - [`filter::FilterQueryBuilder`] compiles an arbitrary combination of
//!   selection facets into one bounded query plus a total count
//! - [`aggregator::DocumentAggregator`] merges base rows, category buckets,
//!   metadata, translations, attachments, and legacy side-post boxes into
//!   [`models::Document`] records, at light or full fidelity
//! - [`menu_tree::MenuTreeBuilder`] / [`category_tree::CategoryTreeBuilder`]
//!   expand flat parent/child and family/entry rows into trees
//!
//! Everything is read-only: entities are value objects built fresh per
//! request, and the store is reached only through the
//! [`repository::ContentRepository`] seam.

pub mod aggregator;
pub mod assets;
pub mod boxes;
pub mod category_tree;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod menu_tree;
pub mod models;
pub mod repository;
pub mod service;

pub use config::Config;
pub use error::{Error, Result};
pub use service::{ContentService, FilteredList};

//! Filter-criteria compiler for filtered document lists.
//!
//! Turns an arbitrary combination of selection facets into one bounded
//! eligible-ids query plus a separate total-count query, rendered as
//! PostgreSQL via SeaQuery. Values are rendered inline by the query builder,
//! so multi-facet composition is collision-free by construction.
//!
//! Facet algebra: values within one facet combine with OR (an `IN` list);
//! distinct facets combine with AND by nesting each facet's id subquery
//! inside the next (`id IN (… AND id IN (…))`). An empty facet set leaves
//! the base query untouched.

use chrono::Datelike;
use sea_query::{
    Alias, Expr, JoinType, Order, PostgresQueryBuilder, Query, SelectStatement,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Optional lower/upper bounds of a date facet, as Unix timestamps.
///
/// Each bound is independent; a missing bound imposes no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl DateRange {
    /// True when neither bound is set.
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// One selection facet with its typed values.
///
/// This is a closed enumeration: callers passing facet names at runtime go
/// through [`Facet::parse`], which rejects unknown names instead of silently
/// ignoring them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    /// Taxonomy-term ids under the "types" family.
    Types(Vec<i64>),
    /// Taxonomy-term ids under the "themes" family.
    Themes(Vec<i64>),
    /// Taxonomy-term ids under the "regions" family.
    Regions(Vec<i64>),
    /// Tag labels, matched within the `post_tag` taxonomy.
    Tags(Vec<String>),
    /// Publication-date bounds.
    PubDateRange(DateRange),
    /// Reference-period bounds.
    PeriodRange(DateRange),
}

impl Facet {
    /// Parse a raw (name, values) pair into a typed facet.
    ///
    /// Term facets expect decimal ids; `tags` takes the values verbatim.
    /// Range facets are not parseable from string lists and must be built
    /// directly. Unknown names and malformed ids are rejected.
    pub fn parse(name: &str, values: &[String]) -> Result<Self> {
        fn ids(name: &str, values: &[String]) -> Result<Vec<i64>> {
            values
                .iter()
                .map(|v| {
                    v.parse().map_err(|_| {
                        Error::InvalidArgument(format!("facet {name}: not a term id: {v:?}"))
                    })
                })
                .collect()
        }

        match name {
            "types" => Ok(Self::Types(ids(name, values)?)),
            "themes" => Ok(Self::Themes(ids(name, values)?)),
            "regions" => Ok(Self::Regions(ids(name, values)?)),
            "tags" => Ok(Self::Tags(values.to_vec())),
            "pubDateRange" | "periodRange" => Err(Error::InvalidArgument(format!(
                "facet {name}: range facets take typed bounds and are constructed directly"
            ))),
            other => Err(Error::InvalidArgument(format!("unknown facet: {other}"))),
        }
    }
}

/// The full set of selection facets for one list request.
///
/// An empty facet imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSet {
    pub types: Vec<i64>,
    pub themes: Vec<i64>,
    pub regions: Vec<i64>,
    pub tags: Vec<String>,
    pub pub_date: DateRange,
    pub period: DateRange,
}

impl FacetSet {
    /// Merge one facet's values into the set.
    pub fn insert(&mut self, facet: Facet) {
        match facet {
            Facet::Types(ids) => self.types.extend(ids),
            Facet::Themes(ids) => self.themes.extend(ids),
            Facet::Regions(ids) => self.regions.extend(ids),
            Facet::Tags(labels) => self.tags.extend(labels),
            Facet::PubDateRange(range) => self.pub_date = range,
            Facet::PeriodRange(range) => self.period = range,
        }
    }
}

/// Compiled criteria for one filtered list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListCriteria {
    /// Language the eligible documents must carry.
    pub lang: String,

    /// Active facets.
    pub facets: FacetSet,
}

/// Render a Unix timestamp in the store's compact date form: the `YYYYMMDD`
/// digits of that day, hour information discarded.
pub(crate) fn compact_date(ts: i64) -> String {
    let date = chrono::DateTime::from_timestamp(ts, 0)
        .unwrap_or_default()
        .date_naive();
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// Query builder for filtered document lists.
///
/// `build` renders the paginated eligible-ids query; `build_count` renders
/// the matching total-count query with no pagination.
pub struct FilterQueryBuilder<'a> {
    criteria: &'a ListCriteria,
}

impl<'a> FilterQueryBuilder<'a> {
    pub fn new(criteria: &'a ListCriteria) -> Self {
        Self { criteria }
    }

    /// Build the eligible-ids SELECT.
    ///
    /// The language join can duplicate an id, so the select is DISTINCT to
    /// stay in step with `build_count`. Under DISTINCT the ORDER BY columns
    /// must appear in the select list; callers read ids from the first
    /// column. `limit <= 0` means "no limit" and suppresses the
    /// LIMIT/OFFSET clause entirely; a negative offset is coerced to zero.
    pub fn build(&self, offset: i64, limit: i64) -> String {
        let mut query = Query::select();
        query.distinct();
        query.column((Alias::new("p"), Alias::new("id")));
        query.column((Alias::new("p"), Alias::new("menu_order")));
        query.column((Alias::new("p"), Alias::new("created")));
        self.apply_from_where(&mut query);
        query.order_by((Alias::new("p"), Alias::new("menu_order")), Order::Asc);
        query.order_by((Alias::new("p"), Alias::new("created")), Order::Desc);

        if limit > 0 {
            query.limit(limit as u64);
            query.offset(offset.max(0) as u64);
        }

        query.to_string(PostgresQueryBuilder)
    }

    /// Build the total-count SELECT over the same constraint set.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();
        query.expr(Expr::cust(r#"COUNT(DISTINCT "p"."id")"#));
        self.apply_from_where(&mut query);
        query.to_string(PostgresQueryBuilder)
    }

    /// Shared FROM/WHERE: published posts in the requested language, with
    /// the composed facet subquery spliced in when any facet is active.
    fn apply_from_where(&self, query: &mut SelectStatement) {
        query.from_as(Alias::new("posts"), Alias::new("p"));
        query.join_as(
            JoinType::InnerJoin,
            Alias::new("lang_link"),
            Alias::new("l"),
            Expr::col((Alias::new("l"), Alias::new("element_id")))
                .equals((Alias::new("p"), Alias::new("id"))),
        );
        query.and_where(Expr::col((Alias::new("p"), Alias::new("status"))).eq("publish"));
        query.and_where(Expr::col((Alias::new("p"), Alias::new("kind"))).eq("post"));
        query.and_where(
            Expr::col((Alias::new("l"), Alias::new("lang"))).eq(self.criteria.lang.as_str()),
        );

        if let Some(sub) = self.facet_subquery() {
            query.and_where(Expr::col((Alias::new("p"), Alias::new("id"))).in_subquery(sub));
        }
    }

    /// Compose the active facets innermost-out: each facet's id query wraps
    /// the running subquery in an `AND <id column> IN (…)` clause, so the
    /// result set satisfies every active facet.
    fn facet_subquery(&self) -> Option<SelectStatement> {
        let facets = &self.criteria.facets;
        let mut sub: Option<SelectStatement> = None;

        if let Some(min) = facets.period.min {
            sub = Some(mount(meta_bound("fineperiodo", min, true), "post_id", sub));
        }
        if let Some(max) = facets.period.max {
            sub = Some(mount(meta_bound("inizioperiodo", max, false), "post_id", sub));
        }
        if let Some(min) = facets.pub_date.min {
            sub = Some(mount(
                meta_bound("data_pubblicazione", min, true),
                "post_id",
                sub,
            ));
        }
        if let Some(max) = facets.pub_date.max {
            sub = Some(mount(
                meta_bound("data_pubblicazione", max, false),
                "post_id",
                sub,
            ));
        }
        if !facets.types.is_empty() {
            sub = Some(mount(term_members(&facets.types), "object_id", sub));
        }
        if !facets.themes.is_empty() {
            sub = Some(mount(term_members(&facets.themes), "object_id", sub));
        }
        if !facets.regions.is_empty() {
            sub = Some(mount(term_members(&facets.regions), "object_id", sub));
        }
        if !facets.tags.is_empty() {
            sub = Some(mount(tag_members(&facets.tags), "object_id", sub));
        }

        sub
    }
}

/// Wrap `inner` into `query` as an `AND <id_column> IN (inner)` clause.
fn mount(mut query: SelectStatement, id_column: &str, inner: Option<SelectStatement>) -> SelectStatement {
    if let Some(inner) = inner {
        query.and_where(Expr::col(Alias::new(id_column)).in_subquery(inner));
    }
    query
}

/// Ids of documents whose compact-dated metadata `key` satisfies one bound.
fn meta_bound(key: &str, ts: i64, lower: bool) -> SelectStatement {
    let code = compact_date(ts);
    let mut query = Query::select();
    query
        .column(Alias::new("post_id"))
        .from(Alias::new("postmeta"))
        .and_where(Expr::col(Alias::new("key")).eq(key));
    if lower {
        query.and_where(Expr::col(Alias::new("value")).gte(code));
    } else {
        query.and_where(Expr::col(Alias::new("value")).lte(code));
    }
    query
}

/// Ids of documents linked to any of the given taxonomy-term ids.
fn term_members(term_ids: &[i64]) -> SelectStatement {
    let mut query = Query::select();
    query
        .column(Alias::new("object_id"))
        .from(Alias::new("term_relationships"))
        .and_where(Expr::col(Alias::new("term_taxonomy_id")).is_in(term_ids.iter().copied()));
    query
}

/// Ids of documents carrying any of the given tag labels, scoped to the
/// `post_tag` taxonomy. Denylisted term ids are excluded unconditionally.
fn tag_members(labels: &[String]) -> SelectStatement {
    let mut deny = Query::select();
    deny.column(Alias::new("term_id")).from(Alias::new("tag_denylist"));

    let mut query = Query::select();
    query
        .column((Alias::new("r"), Alias::new("object_id")))
        .from_as(Alias::new("term_relationships"), Alias::new("r"))
        .join_as(
            JoinType::LeftJoin,
            Alias::new("terms"),
            Alias::new("t"),
            Expr::col((Alias::new("t"), Alias::new("id")))
                .equals((Alias::new("r"), Alias::new("term_taxonomy_id"))),
        )
        .join_as(
            JoinType::LeftJoin,
            Alias::new("term_taxonomy"),
            Alias::new("x"),
            Expr::col((Alias::new("x"), Alias::new("term_taxonomy_id")))
                .equals((Alias::new("r"), Alias::new("term_taxonomy_id"))),
        )
        .and_where(Expr::col((Alias::new("x"), Alias::new("taxonomy"))).eq("post_tag"))
        .and_where(Expr::col((Alias::new("t"), Alias::new("name"))).is_in(labels.iter().cloned()))
        .and_where(
            Expr::col((Alias::new("t"), Alias::new("id")))
                .in_subquery(deny)
                .not(),
        );
    query
}

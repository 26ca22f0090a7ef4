use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use sqlx::PgPool;

use crate::api::pagination::{total_pages, PageRequest};
use crate::database::query_builder::like_pattern;
use crate::database::DatabaseError;

/// A searchable content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Publication,
    Event,
    Policy,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    All,
    Only(Source),
}

impl SearchType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => Some(SearchType::All),
            "publication" => Some(SearchType::Only(Source::Publication)),
            "event" => Some(SearchType::Only(Source::Event)),
            "policy" => Some(SearchType::Only(Source::Policy)),
            "member" => Some(SearchType::Only(Source::Member)),
            _ => None,
        }
    }
}

impl Source {
    pub const ALL: [Source; 4] = [Source::Publication, Source::Event, Source::Policy, Source::Member];

    /// Publicly visible rows of this type whose text columns match `$1`
    fn filter(self) -> &'static str {
        match self {
            Source::Publication => {
                "FROM publications WHERE status = 'published' \
                 AND (title ILIKE $1 OR abstract ILIKE $1 OR content ILIKE $1)"
            }
            Source::Event => {
                "FROM events WHERE status IN ('upcoming', 'ongoing') \
                 AND (title ILIKE $1 OR description ILIKE $1 OR location ILIKE $1)"
            }
            Source::Policy => {
                "FROM policies WHERE status = 'published' \
                 AND (title ILIKE $1 OR summary ILIKE $1 OR content ILIKE $1)"
            }
            Source::Member => {
                "FROM users WHERE is_public \
                 AND (name ILIKE $1 OR bio ILIKE $1 OR organization ILIKE $1)"
            }
        }
    }

    fn projection(self) -> &'static str {
        match self {
            Source::Publication => {
                "SELECT 'publication' AS kind, id::TEXT AS id, title, abstract AS excerpt, slug, published_at AS date"
            }
            Source::Event => {
                "SELECT 'event' AS kind, id::TEXT AS id, title, description AS excerpt, NULL::TEXT AS slug, start_date AS date"
            }
            Source::Policy => {
                "SELECT 'policy' AS kind, id::TEXT AS id, title, summary AS excerpt, NULL::TEXT AS slug, updated_at AS date"
            }
            Source::Member => {
                "SELECT 'member' AS kind, id, COALESCE(name, '') AS title, bio AS excerpt, NULL::TEXT AS slug, updated_at AS date"
            }
        }
    }

    /// Most recent first
    fn order_by(self) -> &'static str {
        match self {
            Source::Publication => "published_at DESC NULLS LAST, id ASC",
            Source::Event => "start_date DESC, id ASC",
            Source::Policy | Source::Member => "updated_at DESC, id ASC",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub title: String,
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchCounts {
    pub publication: i64,
    pub event: i64,
    pub policy: i64,
    pub member: i64,
}

impl SearchCounts {
    fn record(&mut self, source: Source, count: i64) {
        match source {
            Source::Publication => self.publication = count,
            Source::Event => self.event = count,
            Source::Policy => self.policy = count,
            Source::Member => self.member = count,
        }
    }

    pub fn total(&self) -> i64 {
        self.publication + self.event + self.policy + self.member
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub counts: SearchCounts,
}

impl SearchResponse {
    pub fn empty(page: PageRequest) -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            page: page.page,
            limit: page.limit,
            total_pages: 0,
            counts: SearchCounts::default(),
        }
    }
}

/// One per-type query window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub source: Source,
    pub limit: i64,
    pub offset: i64,
}

/// `all` gives every type a quarter of the page (at least one row);
/// a single type gets the whole page.
pub fn plan(search_type: SearchType, page: PageRequest) -> Vec<Slice> {
    match search_type {
        SearchType::All => {
            let per_type = (page.limit / 4).max(1);
            Source::ALL
                .iter()
                .map(|&source| Slice {
                    source,
                    limit: per_type,
                    offset: (page.page - 1).saturating_mul(per_type),
                })
                .collect()
        }
        SearchType::Only(source) => vec![Slice {
            source,
            limit: page.limit,
            offset: page.offset(),
        }],
    }
}

/// Merge per-type results in source order. The merged page never holds more
/// than `limit` rows, even when small limits give each type a row.
pub fn assemble(page: PageRequest, slices: &[Slice], outcomes: Vec<(i64, Vec<SearchHit>)>) -> SearchResponse {
    let mut counts = SearchCounts::default();
    let mut results = Vec::new();
    let mut pages = 0;
    for (slice, (count, hits)) in slices.iter().zip(outcomes) {
        counts.record(slice.source, count);
        pages = pages.max(total_pages(count, slice.limit));
        results.extend(hits);
    }
    results.truncate(usize::try_from(page.limit).unwrap_or(0));

    SearchResponse {
        total: counts.total(),
        results,
        page: page.page,
        limit: page.limit,
        total_pages: pages,
        counts,
    }
}

pub struct SearchService {
    pool: PgPool,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Never fails: storage errors degrade to an empty result
    pub async fn search(&self, term: &str, search_type: SearchType, page: PageRequest) -> SearchResponse {
        let term = term.trim();
        if term.is_empty() {
            return SearchResponse::empty(page);
        }

        match self.run(term, search_type, page).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, search_type = ?search_type, "Search failed; returning empty result");
                SearchResponse::empty(page)
            }
        }
    }

    async fn run(&self, term: &str, search_type: SearchType, page: PageRequest) -> Result<SearchResponse, DatabaseError> {
        let pattern = like_pattern(term);
        let slices = plan(search_type, page);

        let outcomes = try_join_all(slices.iter().map(|slice| self.run_slice(&pattern, *slice))).await?;
        Ok(assemble(page, &slices, outcomes))
    }

    async fn run_slice(&self, pattern: &str, slice: Slice) -> Result<(i64, Vec<SearchHit>), DatabaseError> {
        let filter = slice.source.filter();

        let count_sql = format!("SELECT COUNT(*) {}", filter);
        let count: i64 = sqlx::query_scalar(&count_sql).bind(pattern).fetch_one(&self.pool).await?;

        if count <= slice.offset {
            return Ok((count, Vec::new()));
        }

        let rows_sql = format!(
            "{} {} ORDER BY {} LIMIT $2 OFFSET $3",
            slice.source.projection(),
            filter,
            slice.source.order_by()
        );
        let hits = sqlx::query_as::<_, SearchHit>(&rows_sql)
            .bind(pattern)
            .bind(slice.limit)
            .bind(slice.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((count, hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_caps_each_type_at_a_quarter() {
        let slices = plan(SearchType::All, PageRequest::new(1, 20, 100));
        assert_eq!(slices.len(), 4);
        assert!(slices.iter().all(|s| s.limit == 5 && s.offset == 0));

        let slices = plan(SearchType::All, PageRequest::new(3, 20, 100));
        assert!(slices.iter().all(|s| s.offset == 10));
    }

    #[test]
    fn single_type_uses_full_page() {
        let slices = plan(SearchType::Only(Source::Event), PageRequest::new(2, 10, 100));
        assert_eq!(
            slices,
            vec![Slice {
                source: Source::Event,
                limit: 10,
                offset: 10
            }]
        );
    }

    fn hit(kind: &str, n: usize) -> SearchHit {
        SearchHit {
            kind: kind.to_string(),
            id: format!("{}-{}", kind, n),
            title: format!("Result {}", n),
            excerpt: None,
            slug: None,
            date: None,
        }
    }

    #[test]
    fn tiny_limits_still_return_rows() {
        let slices = plan(SearchType::All, PageRequest::new(1, 2, 100));
        assert!(slices.iter().all(|s| s.limit == 1));
    }

    #[test]
    fn merged_page_never_exceeds_limit() {
        let page = PageRequest::new(1, 2, 100);
        let slices = plan(SearchType::All, page);
        let outcomes = slices
            .iter()
            .map(|s| {
                let kind = match s.source {
                    Source::Publication => "publication",
                    Source::Event => "event",
                    Source::Policy => "policy",
                    Source::Member => "member",
                };
                (3, vec![hit(kind, 0)])
            })
            .collect();

        let response = assemble(page, &slices, outcomes);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].kind, "publication");
        assert_eq!(response.total, 12);
        assert_eq!(response.counts.event, 3);
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let page = PageRequest::new(i64::MAX, 20, 100);
        for slice in plan(SearchType::All, page).into_iter().chain(plan(SearchType::Only(Source::Policy), page)) {
            assert!(slice.offset >= 0);
        }
    }

    #[test]
    fn parses_known_types_only() {
        assert_eq!(SearchType::parse("member"), Some(SearchType::Only(Source::Member)));
        assert_eq!(SearchType::parse("all"), Some(SearchType::All));
        assert_eq!(SearchType::parse("users"), None);
    }

    #[test]
    fn empty_response_has_zero_counts() {
        let empty = SearchResponse::empty(PageRequest::new(2, 20, 100));
        assert_eq!(empty.total, 0);
        assert_eq!(empty.counts, SearchCounts::default());
        let value = serde_json::to_value(&empty).unwrap();
        assert_eq!(value["totalPages"], 0);
        assert_eq!(value["counts"]["publication"], 0);
    }

    #[test]
    fn sources_only_expose_public_rows() {
        assert!(Source::Publication.filter().contains("status = 'published'"));
        assert!(Source::Event.filter().contains("'upcoming', 'ongoing'"));
        assert!(Source::Member.filter().contains("is_public"));
    }
}

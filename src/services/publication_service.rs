use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::api::pagination::{Page, PageRequest};
use crate::database::models::publication::{
    CreatePublication, Publication, PublicationDetail, PublicationModifications, PublicationQuery,
    RejectionEnvelope, RejectionReason, Term, UpdatePublication, AUTHOR_STATUSES,
};
use crate::database::query_builder::Fields;
use crate::database::repository::{insert_row, update_row};
use crate::services::slug::{publication_slug, slugify};
use crate::services::ServiceError;

const TABLE: &str = "publications";

/// Tags and categories share one shape and one replacement procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Tag,
    Category,
}

impl TermKind {
    fn table(self) -> &'static str {
        match self {
            TermKind::Tag => "tags",
            TermKind::Category => "categories",
        }
    }

    fn join_table(self) -> &'static str {
        match self {
            TermKind::Tag => "publication_tags",
            TermKind::Category => "publication_categories",
        }
    }

    fn join_column(self) -> &'static str {
        match self {
            TermKind::Tag => "tag_id",
            TermKind::Category => "category_id",
        }
    }
}

#[derive(sqlx::FromRow)]
struct TermLink {
    publication_id: Uuid,
    id: Uuid,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

/// Trimmed names, first occurrence wins
pub fn normalize_terms(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.to_lowercase()))
        .collect()
}

/// Moving a rejected publication to any other status without new content
/// puts the original body back in place of the envelope.
fn restore_original(current: &Publication, next_status: Option<&str>, patch: &UpdatePublication, fields: &mut Fields) {
    let leaving = current.status == "rejected" && next_status.is_some_and(|s| s != "rejected");
    if !leaving || patch.content.is_some() {
        return;
    }
    if let Some(envelope) = RejectionEnvelope::unwrap_content(&current.content) {
        fields.set("content", envelope.original_content);
    }
}

/// Recover author-facing content: a rejected publication carries its
/// original body inside the envelope.
pub fn unpack_rejection(mut publication: Publication) -> (Publication, Option<RejectionReason>) {
    if publication.status != "rejected" {
        return (publication, None);
    }
    match RejectionEnvelope::unwrap_content(&publication.content) {
        Some(envelope) => {
            publication.content = envelope.original_content;
            (publication, Some(envelope.rejection_reason))
        }
        None => (publication, None),
    }
}

/// Whether an update moves the publication into `published`
pub fn publishes(current_status: &str, next_status: Option<&str>) -> bool {
    matches!(next_status, Some("published")) && current_status != "published"
}

pub struct PublicationService {
    pool: PgPool,
}

impl PublicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Public browsing

    pub async fn list_published(
        &self,
        query: &PublicationQuery,
        page: PageRequest,
    ) -> Result<Page<PublicationDetail>, ServiceError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM publications p");
        push_public_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT p.* FROM publications p");
        push_public_filters(&mut select, query);
        select.push(" ORDER BY p.published_at DESC NULLS LAST, p.id ASC LIMIT ");
        select.push_bind(page.limit);
        select.push(" OFFSET ");
        select.push_bind(page.offset());
        let rows: Vec<Publication> = select.build_query_as().fetch_all(&self.pool).await?;

        let items = self.attach_terms(rows).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get_published_by_slug(&self, slug: &str) -> Result<PublicationDetail, ServiceError> {
        let row = sqlx::query_as::<_, Publication>(
            "SELECT * FROM publications WHERE slug = $1 AND status = 'published'",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Publication {} not found", slug)))?;

        self.detail(row, false).await
    }

    pub async fn list_terms(&self, kind: TermKind) -> Result<Vec<Term>, ServiceError> {
        let sql = format!("SELECT * FROM {} ORDER BY name ASC", kind.table());
        let rows = sqlx::query_as::<_, Term>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    // Author workflow

    pub async fn create(&self, author_id: &str, input: CreatePublication) -> Result<PublicationDetail, ServiceError> {
        let id = Uuid::new_v4();
        let status = input.status();

        let mut fields = Fields::new();
        fields
            .set("author_id", author_id.to_string())
            .set("title", input.title.clone())
            .set("slug", publication_slug(&input.title, id))
            .set("abstract", input.summary)
            .set("content", input.content)
            .set("status", status.to_string())
            .set("thumbnail_url", input.thumbnail_url);

        let mut tx = self.pool.begin().await?;
        let row: Publication = insert_row(&mut *tx, TABLE, id, fields).await?;
        replace_terms(&mut tx, id, TermKind::Tag, &input.tags).await?;
        replace_terms(&mut tx, id, TermKind::Category, &input.categories).await?;
        tx.commit().await?;

        tracing::info!(id = %id, author = %author_id, status = %status, "Publication created");
        self.detail(row, true).await
    }

    pub async fn list_for_author(&self, author_id: &str) -> Result<Vec<PublicationDetail>, ServiceError> {
        let rows = sqlx::query_as::<_, Publication>(
            "SELECT * FROM publications WHERE author_id = $1 ORDER BY updated_at DESC, id ASC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_unpacked(rows).await
    }

    pub async fn get_for_author(&self, id: Uuid, author_id: &str) -> Result<PublicationDetail, ServiceError> {
        let row = self.owned(id, author_id).await?;
        self.detail(row, true).await
    }

    /// Authors edit their own work but cannot publish or reject it
    pub async fn update_for_author(
        &self,
        id: Uuid,
        author_id: &str,
        patch: UpdatePublication,
    ) -> Result<PublicationDetail, ServiceError> {
        if let Some(status) = patch.status.as_deref() {
            if !AUTHOR_STATUSES.contains(&status) {
                return Err(ServiceError::InvalidTransition(format!(
                    "Authors cannot set status to {}",
                    status
                )));
            }
        }

        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;
        if current.author_id != author_id {
            tx.rollback().await?;
            return Err(ServiceError::NotOwner("Not the author of this publication".to_string()));
        }

        let mut fields = patch.content_fields();
        if let Some(status) = patch.status.as_deref() {
            fields.set("status", status.to_string());
        }
        restore_original(&current, patch.status.as_deref(), &patch, &mut fields);

        let row = apply(&mut tx, id, fields, &patch).await?;
        tx.commit().await?;

        tracing::info!(id = %id, author = %author_id, "Publication updated by author");
        self.detail(row, true).await
    }

    /// draft (or rejected) → pending_review
    pub async fn submit(&self, id: Uuid, author_id: &str) -> Result<PublicationDetail, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;
        if current.author_id != author_id {
            tx.rollback().await?;
            return Err(ServiceError::NotOwner("Not the author of this publication".to_string()));
        }
        if !matches!(current.status.as_str(), "draft" | "rejected") {
            tx.rollback().await?;
            return Err(ServiceError::InvalidTransition(format!(
                "Cannot submit a publication in status {}",
                current.status
            )));
        }

        let mut fields = Fields::new();
        fields.set("status", "pending_review".to_string());
        if current.status == "rejected" {
            if let Some(envelope) = RejectionEnvelope::unwrap_content(&current.content) {
                fields.set("content", envelope.original_content);
            }
        }
        let row: Publication = update_row(&mut *tx, TABLE, id, fields)
            .await?
            .ok_or_else(|| not_found(id))?;
        tx.commit().await?;

        tracing::info!(id = %id, author = %author_id, "Publication submitted for review");
        self.detail(row, true).await
    }

    pub async fn delete_for_author(&self, id: Uuid, author_id: &str) -> Result<bool, ServiceError> {
        let current = self.owned(id, author_id).await?;
        self.delete(current.id).await
    }

    // Review and administration

    pub async fn list_all(&self, status: Option<&str>) -> Result<Vec<PublicationDetail>, ServiceError> {
        let rows = sqlx::query_as::<_, Publication>(
            "SELECT * FROM publications WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY updated_at DESC, id ASC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        self.attach_unpacked(rows).await
    }

    pub async fn get(&self, id: Uuid) -> Result<PublicationDetail, ServiceError> {
        let row = self.find(id).await?;
        self.detail(row, true).await
    }

    /// Full edit including status; a transition into `published` stamps
    /// `published_at`, nothing else touches it.
    pub async fn update(&self, id: Uuid, patch: UpdatePublication) -> Result<PublicationDetail, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;

        let mut fields = patch.content_fields();
        if let Some(status) = patch.status.as_deref() {
            fields.set("status", status.to_string());
            if publishes(&current.status, Some(status)) {
                fields.set("published_at", Utc::now());
            }
        }
        restore_original(&current, patch.status.as_deref(), &patch, &mut fields);

        let row = apply(&mut tx, id, fields, &patch).await?;
        tx.commit().await?;

        tracing::info!(id = %id, status = %row.status, "Publication updated by admin");
        self.detail(row, true).await
    }

    pub async fn approve(
        &self,
        id: Uuid,
        modifications: Option<PublicationModifications>,
        reviewer: &str,
    ) -> Result<PublicationDetail, ServiceError> {
        let patch: UpdatePublication = modifications.map(Into::into).unwrap_or_default();

        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;

        let mut fields = patch.content_fields();
        restore_original(&current, Some("published"), &patch, &mut fields);
        fields
            .set("status", "published".to_string())
            .set("published_at", Utc::now());

        let row = apply(&mut tx, id, fields, &patch).await?;
        tx.commit().await?;

        tracing::info!(id = %id, reviewer = %reviewer, "Publication approved");
        self.detail(row, true).await
    }

    pub async fn reject(
        &self,
        id: Uuid,
        reason: String,
        details: Option<String>,
        reviewer: &str,
    ) -> Result<PublicationDetail, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let current = lock(&mut tx, id).await?;

        // Re-rejecting wraps the original body, not the previous envelope
        let original = match RejectionEnvelope::unwrap_content(&current.content) {
            Some(envelope) if current.status == "rejected" => envelope.original_content,
            _ => current.content,
        };
        let envelope = RejectionEnvelope::wrap(
            original,
            RejectionReason {
                reason,
                details,
                rejected_at: Utc::now(),
                rejected_by: reviewer.to_string(),
            },
        )?;

        let mut fields = Fields::new();
        fields.set("status", "rejected".to_string()).set("content", envelope);
        let row: Publication = update_row(&mut *tx, TABLE, id, fields)
            .await?
            .ok_or_else(|| not_found(id))?;
        tx.commit().await?;

        tracing::info!(id = %id, reviewer = %reviewer, "Publication rejected");
        self.detail(row, true).await
    }

    /// Join rows go with the publication; terms stay
    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut tx = self.pool.begin().await?;
        for kind in [TermKind::Tag, TermKind::Category] {
            let sql = format!("DELETE FROM {} WHERE publication_id = $1", kind.join_table());
            sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        }
        let result = sqlx::query("DELETE FROM publications WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(id = %id, "Publication deleted");
        }
        Ok(deleted)
    }

    async fn find(&self, id: Uuid) -> Result<Publication, ServiceError> {
        sqlx::query_as::<_, Publication>("SELECT * FROM publications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn owned(&self, id: Uuid, author_id: &str) -> Result<Publication, ServiceError> {
        let row = self.find(id).await?;
        if row.author_id != author_id {
            return Err(ServiceError::NotOwner("Not the author of this publication".to_string()));
        }
        Ok(row)
    }

    async fn detail(&self, row: Publication, unpack: bool) -> Result<PublicationDetail, ServiceError> {
        let (publication, rejection) = if unpack { unpack_rejection(row) } else { (row, None) };
        let mut details = self.attach_terms(vec![publication]).await?;
        let mut detail = details.pop().ok_or_else(|| ServiceError::NotFound("Publication not found".to_string()))?;
        detail.rejection = rejection;
        Ok(detail)
    }

    async fn attach_terms(&self, rows: Vec<Publication>) -> Result<Vec<PublicationDetail>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let mut tags = self.terms_for(&ids, TermKind::Tag).await?;
        let mut categories = self.terms_for(&ids, TermKind::Category).await?;

        Ok(rows
            .into_iter()
            .map(|publication| PublicationDetail {
                tags: tags.remove(&publication.id).unwrap_or_default(),
                categories: categories.remove(&publication.id).unwrap_or_default(),
                rejection: None,
                publication,
            })
            .collect())
    }

    /// Owner and admin listings: envelope unpacked, reason kept per row
    async fn attach_unpacked(&self, rows: Vec<Publication>) -> Result<Vec<PublicationDetail>, ServiceError> {
        let (rows, rejections): (Vec<_>, Vec<_>) = rows.into_iter().map(unpack_rejection).unzip();
        let mut details = self.attach_terms(rows).await?;
        for (detail, rejection) in details.iter_mut().zip(rejections) {
            detail.rejection = rejection;
        }
        Ok(details)
    }

    async fn terms_for(&self, ids: &[Uuid], kind: TermKind) -> Result<HashMap<Uuid, Vec<Term>>, ServiceError> {
        let mut grouped: HashMap<Uuid, Vec<Term>> = HashMap::new();
        if ids.is_empty() {
            return Ok(grouped);
        }

        let sql = format!(
            "SELECT j.publication_id, t.id, t.name, t.slug, t.created_at \
             FROM {join} j JOIN {table} t ON t.id = j.{column} \
             WHERE j.publication_id = ANY($1) ORDER BY t.name ASC",
            join = kind.join_table(),
            table = kind.table(),
            column = kind.join_column(),
        );
        let links = sqlx::query_as::<_, TermLink>(&sql).bind(ids).fetch_all(&self.pool).await?;

        for link in links {
            grouped.entry(link.publication_id).or_default().push(Term {
                id: link.id,
                name: link.name,
                slug: link.slug,
                created_at: link.created_at,
            });
        }
        Ok(grouped)
    }
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Publication {} not found", id))
}

fn push_public_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &PublicationQuery) {
    qb.push(" WHERE p.status = 'published'");
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        qb.push(
            " AND EXISTS (SELECT 1 FROM publication_categories pc JOIN categories c ON c.id = pc.category_id \
             WHERE pc.publication_id = p.id AND c.slug = ",
        );
        qb.push_bind(category.to_string());
        qb.push(")");
    }
    if let Some(tag) = query.tag.as_deref().filter(|t| !t.is_empty()) {
        qb.push(
            " AND EXISTS (SELECT 1 FROM publication_tags pt JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.publication_id = p.id AND t.slug = ",
        );
        qb.push_bind(tag.to_string());
        qb.push(")");
    }
}

async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Publication, ServiceError> {
    sqlx::query_as::<_, Publication>("SELECT * FROM publications WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Scalar update plus any requested term replacement, on the caller's transaction
async fn apply(
    conn: &mut PgConnection,
    id: Uuid,
    fields: Fields,
    patch: &UpdatePublication,
) -> Result<Publication, ServiceError> {
    let row: Publication = update_row(&mut *conn, TABLE, id, fields)
        .await?
        .ok_or_else(|| not_found(id))?;
    if let Some(tags) = &patch.tags {
        replace_terms(conn, id, TermKind::Tag, tags).await?;
    }
    if let Some(categories) = &patch.categories {
        replace_terms(conn, id, TermKind::Category, categories).await?;
    }
    Ok(row)
}

/// Resolve each name to a term row (inserting missing ones), then swap the
/// publication's join rows for the resolved set.
async fn replace_terms(
    conn: &mut PgConnection,
    publication_id: Uuid,
    kind: TermKind,
    names: &[String],
) -> Result<(), ServiceError> {
    let mut term_ids = Vec::new();
    for name in normalize_terms(names) {
        term_ids.push(resolve_term(conn, kind, &name).await?);
    }

    let sql = format!("DELETE FROM {} WHERE publication_id = $1", kind.join_table());
    sqlx::query(&sql).bind(publication_id).execute(&mut *conn).await?;

    let sql = format!(
        "INSERT INTO {} (publication_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.join_table(),
        kind.join_column()
    );
    for term_id in &term_ids {
        sqlx::query(&sql)
            .bind(publication_id)
            .bind(term_id)
            .execute(&mut *conn)
            .await?;
    }

    tracing::debug!(publication = %publication_id, table = kind.join_table(), count = term_ids.len(), "Replaced terms");
    Ok(())
}

async fn resolve_term(conn: &mut PgConnection, kind: TermKind, name: &str) -> Result<Uuid, ServiceError> {
    let select = format!("SELECT id FROM {} WHERE name = $1", kind.table());
    if let Some(id) = sqlx::query_scalar::<_, Uuid>(&select)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
    {
        return Ok(id);
    }

    let insert = format!(
        "INSERT INTO {} (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT (name) DO NOTHING RETURNING id",
        kind.table()
    );
    let inserted = sqlx::query_scalar::<_, Uuid>(&insert)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .fetch_optional(&mut *conn)
        .await?;

    match inserted {
        Some(id) => Ok(id),
        None => {
            // Inserted concurrently since the lookup
            let id = sqlx::query_scalar::<_, Uuid>(&select)
                .bind(name)
                .fetch_one(&mut *conn)
                .await?;
            Ok(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::query_builder::FieldValue;

    fn publication(status: &str, content: &str) -> Publication {
        Publication {
            id: Uuid::nil(),
            author_id: "author_1".into(),
            title: "Tariffs".into(),
            slug: "tariffs-00000000".into(),
            summary: None,
            content: content.into(),
            status: status.into(),
            thumbnail_url: None,
            published_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn normalize_terms_trims_and_dedupes() {
        let names = vec![" Trade ".to_string(), "trade".to_string(), "".to_string(), "Tax".to_string()];
        assert_eq!(normalize_terms(&names), vec!["Trade".to_string(), "Tax".to_string()]);
    }

    #[test]
    fn unpack_restores_original_content() {
        let envelope = RejectionEnvelope::wrap(
            "Body".into(),
            RejectionReason {
                reason: "Off topic".into(),
                details: None,
                rejected_at: Utc::now(),
                rejected_by: "admin_1".into(),
            },
        )
        .unwrap();

        let (unpacked, reason) = unpack_rejection(publication("rejected", &envelope));
        assert_eq!(unpacked.content, "Body");
        assert_eq!(reason.map(|r| r.reason), Some("Off topic".to_string()));

        // Non-rejected rows are left untouched even if the text parses
        let (untouched, reason) = unpack_rejection(publication("draft", &envelope));
        assert_eq!(untouched.content, envelope);
        assert!(reason.is_none());
    }

    fn rejected_envelope() -> String {
        RejectionEnvelope::wrap(
            "Body".into(),
            RejectionReason {
                reason: "Needs sources".into(),
                details: None,
                rejected_at: Utc::now(),
                rejected_by: "admin_1".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn leaving_rejected_restores_original_body() {
        let current = publication("rejected", &rejected_envelope());
        let patch = UpdatePublication::default();

        for next in ["published", "draft", "pending_review"] {
            let mut fields = Fields::new();
            restore_original(&current, Some(next), &patch, &mut fields);
            assert_eq!(fields.get("content"), Some(&FieldValue::Text("Body".into())), "{}", next);
        }
    }

    #[test]
    fn restore_leaves_content_alone_otherwise() {
        let current = publication("rejected", &rejected_envelope());

        let mut fields = Fields::new();
        restore_original(&current, Some("rejected"), &UpdatePublication::default(), &mut fields);
        assert!(fields.get("content").is_none());

        let mut fields = Fields::new();
        restore_original(&current, None, &UpdatePublication::default(), &mut fields);
        assert!(fields.get("content").is_none());

        let edited = UpdatePublication {
            content: Some("Rewritten".into()),
            ..Default::default()
        };
        let mut fields = Fields::new();
        restore_original(&current, Some("draft"), &edited, &mut fields);
        assert!(fields.get("content").is_none());

        let draft = publication("draft", "Plain body");
        let mut fields = Fields::new();
        restore_original(&draft, Some("published"), &UpdatePublication::default(), &mut fields);
        assert!(fields.get("content").is_none());
    }

    #[test]
    fn published_at_only_on_transition() {
        assert!(publishes("pending_review", Some("published")));
        assert!(publishes("draft", Some("published")));
        assert!(!publishes("published", Some("published")));
        assert!(!publishes("pending_review", Some("rejected")));
        assert!(!publishes("draft", None));
    }

    #[test]
    fn term_tables() {
        assert_eq!(TermKind::Tag.join_table(), "publication_tags");
        assert_eq!(TermKind::Category.join_column(), "category_id");
    }
}

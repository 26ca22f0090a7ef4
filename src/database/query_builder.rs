use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// A typed column value ready to be bound into a statement
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    OptText(Option<String>),
    Int(i32),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    OptTimestamp(Option<DateTime<Utc>>),
}

impl FieldValue {
    pub fn push_bind(self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            FieldValue::Text(v) => qb.push_bind(v),
            FieldValue::OptText(v) => qb.push_bind(v),
            FieldValue::Int(v) => qb.push_bind(v),
            FieldValue::Bool(v) => qb.push_bind(v),
            FieldValue::Uuid(v) => qb.push_bind(v),
            FieldValue::Timestamp(v) => qb.push_bind(v),
            FieldValue::OptTimestamp(v) => qb.push_bind(v),
        };
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(v: Option<String>) -> Self {
        FieldValue::OptText(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        FieldValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        FieldValue::OptTimestamp(v)
    }
}

/// Ordered list of (column, value) pairs produced from a request payload
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Fields(Vec<(&'static str, FieldValue)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always include the column
    pub fn set(&mut self, column: &'static str, value: impl Into<FieldValue>) -> &mut Self {
        self.0.push((column, value.into()));
        self
    }

    /// Include the column only when a value was supplied
    pub fn set_some<T: Into<FieldValue>>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.0.push((column, v.into()));
        }
        self
    }

    /// Include a nullable column only when supplied; the stored value is never null
    pub fn set_opt_text(&mut self, column: &'static str, value: Option<String>) -> &mut Self {
        if let Some(v) = value {
            self.0.push((column, FieldValue::OptText(Some(v))));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.0.iter().map(|(c, _)| *c).collect()
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    pub fn into_inner(self) -> Vec<(&'static str, FieldValue)> {
        self.0
    }
}

/// Quote an identifier that comes from a compile-time table/column constant
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// INSERT INTO "table" ("id", cols..., "created_at", "updated_at") VALUES (...) RETURNING *
pub fn insert_query<'a>(table: &str, id: FieldValue, fields: Fields) -> QueryBuilder<'a, Postgres> {
    insert_query_with(table, id, fields, true)
}

/// INSERT for tables that carry timestamps optionally (`timestamps = false` leaves them to column defaults)
pub fn insert_query_with<'a>(
    table: &str,
    id: FieldValue,
    fields: Fields,
    timestamps: bool,
) -> QueryBuilder<'a, Postgres> {
    let fields = fields.into_inner();

    let mut qb = QueryBuilder::new(format!("INSERT INTO {} (\"id\"", quote_identifier(table)));
    for (column, _) in &fields {
        qb.push(", ");
        qb.push(quote_identifier(column));
    }
    if timestamps {
        qb.push(", \"created_at\", \"updated_at\"");
    }

    qb.push(") VALUES (");
    id.push_bind(&mut qb);
    for (_, value) in fields {
        qb.push(", ");
        value.push_bind(&mut qb);
    }
    if timestamps {
        qb.push(", now(), now()");
    }
    qb.push(") RETURNING *");
    qb
}

/// UPDATE "table" SET col = $n, ..., "updated_at" = now() WHERE "id" = $m RETURNING *
///
/// `updated_at` is refreshed even when no content field was supplied.
pub fn update_query<'a>(table: &str, id: FieldValue, fields: Fields) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", quote_identifier(table)));
    for (column, value) in fields.into_inner() {
        qb.push(quote_identifier(column));
        qb.push(" = ");
        value.push_bind(&mut qb);
        qb.push(", ");
    }
    qb.push("\"updated_at\" = now() WHERE \"id\" = ");
    id.push_bind(&mut qb);
    qb.push(" RETURNING *");
    qb
}

/// SELECT * FROM "table" [WHERE ...] ORDER BY ...
pub fn select_query<'a>(
    table: &str,
    parent: Option<(&str, Uuid)>,
    predicate: Option<&str>,
    order_by: &str,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", quote_identifier(table)));
    let mut has_where = false;

    if let Some((column, parent_id)) = parent {
        qb.push(" WHERE ");
        qb.push(quote_identifier(column));
        qb.push(" = ");
        qb.push_bind(parent_id);
        has_where = true;
    }
    if let Some(predicate) = predicate {
        qb.push(if has_where { " AND (" } else { " WHERE (" });
        qb.push(predicate);
        qb.push(")");
    }

    qb.push(" ORDER BY ");
    qb.push(order_by);
    qb
}

/// Escape LIKE wildcards so a search term matches literally, then wrap in %...%
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Fields {
        let mut fields = Fields::new();
        fields
            .set("title", "Budget Forum".to_string())
            .set_some("description", None::<String>)
            .set("display_order", 0);
        fields
    }

    #[test]
    fn insert_sql_lists_supplied_columns() {
        let qb = insert_query("events", FieldValue::Uuid(Uuid::nil()), sample_fields());
        assert_eq!(
            qb.sql(),
            "INSERT INTO \"events\" (\"id\", \"title\", \"display_order\", \"created_at\", \"updated_at\") \
             VALUES ($1, $2, $3, now(), now()) RETURNING *"
        );
    }

    #[test]
    fn insert_without_timestamps() {
        let mut fields = Fields::new();
        fields.set("name", "Trade".to_string());
        let qb = insert_query_with("tags", FieldValue::Uuid(Uuid::nil()), fields, false);
        assert_eq!(qb.sql(), "INSERT INTO \"tags\" (\"id\", \"name\") VALUES ($1, $2) RETURNING *");
    }

    #[test]
    fn update_sql_only_touches_supplied_fields() {
        let mut fields = Fields::new();
        fields.set_some("title", Some("New".to_string())).set_some("display_order", None::<i32>);
        let qb = update_query("events", FieldValue::Uuid(Uuid::nil()), fields);
        assert_eq!(
            qb.sql(),
            "UPDATE \"events\" SET \"title\" = $1, \"updated_at\" = now() WHERE \"id\" = $2 RETURNING *"
        );
    }

    #[test]
    fn empty_update_still_refreshes_updated_at() {
        let qb = update_query("faqs", FieldValue::Uuid(Uuid::nil()), Fields::new());
        assert_eq!(
            qb.sql(),
            "UPDATE \"faqs\" SET \"updated_at\" = now() WHERE \"id\" = $1 RETURNING *"
        );
    }

    #[test]
    fn select_sql_combines_parent_and_predicate() {
        let qb = select_query(
            "about_cards",
            Some(("section_id", Uuid::nil())),
            Some("status = 'published'"),
            "\"display_order\" ASC, \"id\" ASC",
        );
        assert_eq!(
            qb.sql(),
            "SELECT * FROM \"about_cards\" WHERE \"section_id\" = $1 AND (status = 'published') \
             ORDER BY \"display_order\" ASC, \"id\" ASC"
        );

        let qb = select_query("faqs", None, None, "\"id\" ASC");
        assert_eq!(qb.sql(), "SELECT * FROM \"faqs\" ORDER BY \"id\" ASC");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tax"), "%tax%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn fields_track_columns() {
        let fields = sample_fields();
        assert_eq!(fields.columns(), vec!["title", "display_order"]);
        assert_eq!(fields.get("display_order"), Some(&FieldValue::Int(0)));
        assert!(fields.get("description").is_none());
    }
}

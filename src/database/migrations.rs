use sqlx::PgPool;

use crate::database::manager::DatabaseError;

/// Idempotent schema statements, applied in order. Each entry is executed as
/// its own query since the extended protocol allows one statement at a time.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT,
        name TEXT,
        bio TEXT,
        avatar_url TEXT,
        organization TEXT,
        is_public BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mission_statements (
        id UUID PRIMARY KEY,
        heading TEXT NOT NULL,
        body TEXT NOT NULL,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS about_sections (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS about_cards (
        id UUID PRIMARY KEY,
        section_id UUID NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        icon TEXT,
        link_url TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_about_cards_section_id ON about_cards(section_id)",
    r#"
    CREATE TABLE IF NOT EXISTS team_members (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        bio TEXT,
        photo_url TEXT,
        linkedin_url TEXT,
        email TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS partners (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        logo_url TEXT,
        website_url TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collaboration_cards (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        icon TEXT,
        cta_label TEXT,
        cta_url TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        location TEXT,
        start_date TIMESTAMPTZ NOT NULL,
        end_date TIMESTAMPTZ,
        status TEXT NOT NULL DEFAULT 'upcoming',
        thumbnail_url TEXT,
        registration_url TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event_media (
        id UUID PRIMARY KEY,
        event_id UUID NOT NULL,
        media_type TEXT NOT NULL,
        url TEXT NOT NULL,
        caption TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_event_media_event_id ON event_media(event_id)",
    r#"
    CREATE TABLE IF NOT EXISTS policies (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        summary TEXT,
        content TEXT,
        category TEXT,
        status TEXT NOT NULL DEFAULT 'draft',
        thumbnail_url TEXT,
        document_url TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS policy_case_studies (
        id UUID PRIMARY KEY,
        policy_id UUID NOT NULL,
        title TEXT NOT NULL,
        summary TEXT,
        content TEXT,
        outcome TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_policy_case_studies_policy_id ON policy_case_studies(policy_id)",
    r#"
    CREATE TABLE IF NOT EXISTS advocacy_campaigns (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'planned',
        achievements TEXT NOT NULL DEFAULT '[]',
        start_date TIMESTAMPTZ,
        end_date TIMESTAMPTZ,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS membership_types (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        price_cents INTEGER NOT NULL DEFAULT 0,
        billing_period TEXT NOT NULL DEFAULT 'yearly',
        benefits TEXT,
        is_active BOOLEAN NOT NULL DEFAULT true,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS memberships (
        id UUID PRIMARY KEY,
        user_id TEXT NOT NULL,
        membership_type_id UUID NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        started_at TIMESTAMPTZ,
        expires_at TIMESTAMPTZ,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_memberships_type_id ON memberships(membership_type_id)",
    "CREATE INDEX IF NOT EXISTS idx_memberships_user_id ON memberships(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS faqs (
        id UUID PRIMARY KEY,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        category TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contact_submissions (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        subject TEXT NOT NULL,
        message TEXT NOT NULL,
        inquiry_type TEXT NOT NULL DEFAULT 'general',
        status TEXT NOT NULL DEFAULT 'new',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_contact_submissions_created_at ON contact_submissions(created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS publications (
        id UUID PRIMARY KEY,
        author_id TEXT NOT NULL,
        title TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        abstract TEXT,
        content TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'draft',
        thumbnail_url TEXT,
        published_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_publications_status ON publications(status)",
    "CREATE INDEX IF NOT EXISTS idx_publications_author_id ON publications(author_id)",
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS publication_tags (
        publication_id UUID NOT NULL,
        tag_id UUID NOT NULL,
        PRIMARY KEY (publication_id, tag_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS publication_categories (
        publication_id UUID NOT NULL,
        category_id UUID NOT NULL,
        PRIMARY KEY (publication_id, category_id)
    )
    "#,
];

/// Create every table and index that does not exist yet
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    tracing::info!("Running database migrations...");

    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!(statements = SCHEMA.len(), "Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_are_single_and_idempotent() {
        for statement in SCHEMA {
            let trimmed = statement.trim();
            assert!(
                trimmed.starts_with("CREATE TABLE IF NOT EXISTS") || trimmed.starts_with("CREATE INDEX IF NOT EXISTS"),
                "not idempotent: {}",
                trimmed
            );
            assert!(!trimmed.trim_end_matches(';').contains(';'), "multiple statements: {}", trimmed);
        }
    }
}

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::AdminSet;
use crate::config::AppConfig;
use crate::database::models::{
    AboutCard, AboutSection, CaseStudy, CollaborationCard, Event, EventMedia, Faq, Membership, MembershipType,
    MissionStatement, Partner, Policy, TeamMember,
};
use crate::database::DatabaseManager;
use crate::handlers::{elevated, protected, public, resource};
use crate::middleware::{identify, require_access, Access};

/// Shared per-request state
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub config: Arc<AppConfig>,
    pub admins: Arc<AdminSet>,
}

impl AppState {
    pub fn new(db: DatabaseManager, config: AppConfig) -> Self {
        let admins = AdminSet::new(config.security.admin_user_ids.iter().cloned());
        Self {
            db,
            config: Arc::new(config),
            admins: Arc::new(admins),
        }
    }

    pub fn pool(&self) -> PgPool {
        self.db.pool().clone()
    }
}

/// The complete HTTP application
pub fn app(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(member_routes())
        .merge(admin_routes())
        .layer(from_fn_with_state(state.clone(), identify))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(cors);

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        // About
        .route("/api/about/overview", get(public::about::overview))
        .merge(resource::public_routes::<MissionStatement>("/api/about/mission"))
        .merge(resource::public_routes::<AboutSection>("/api/about/sections"))
        .merge(resource::public_routes::<AboutCard>("/api/about/cards"))
        .merge(resource::public_routes::<TeamMember>("/api/about/team"))
        .merge(resource::public_routes::<Partner>("/api/about/partners"))
        .merge(resource::public_routes::<CollaborationCard>("/api/about/collaborations"))
        // Events
        .merge(resource::public_routes::<Event>("/api/events"))
        .merge(resource::public_routes::<EventMedia>("/api/events/media"))
        // Policy
        .merge(resource::public_routes::<Policy>("/api/policy/policies"))
        .merge(resource::public_routes::<CaseStudy>("/api/policy/case-studies"))
        .route("/api/policy/campaigns", get(public::campaigns::list))
        .route("/api/policy/campaigns/:id", get(public::campaigns::get))
        // Memberships
        .merge(resource::public_routes::<MembershipType>("/api/memberships/types"))
        .merge(resource::public_routes::<Faq>("/api/faqs"))
        // Contact, publications, search
        .route("/api/contact", post(public::contact::submit))
        .route("/api/publications", get(public::publications::list))
        .route("/api/publications/tags", get(public::publications::tags))
        .route("/api/publications/categories", get(public::publications::categories))
        .route("/api/publications/:slug", get(public::publications::get_by_slug))
        .route("/api/search", get(public::search::search))
        .route("/api/admin/check", get(public::admin_check::check))
}

fn member_routes() -> Router<AppState> {
    use protected::{profile, publications};

    Router::new()
        .route("/api/profile", get(profile::get).patch(profile::update))
        .route("/api/profile/memberships", get(profile::memberships))
        .route("/api/profile/publications", get(publications::list).post(publications::create))
        .route(
            "/api/profile/publications/:id",
            get(publications::get).patch(publications::update).delete(publications::delete),
        )
        .route("/api/profile/publications/:id/submit", post(publications::submit))
        .route_layer(from_fn_with_state(Access::Authenticated, require_access))
}

fn admin_routes() -> Router<AppState> {
    use elevated::{campaigns, contact, publications, users};
    use public::campaigns as campaign_reads;

    Router::new()
        .merge(resource::admin_routes::<MissionStatement>("/mission"))
        .merge(resource::admin_routes::<AboutSection>("/sections"))
        .merge(resource::admin_routes::<AboutCard>("/cards"))
        .merge(resource::admin_routes::<TeamMember>("/team"))
        .merge(resource::admin_routes::<Partner>("/partners"))
        .merge(resource::admin_routes::<CollaborationCard>("/collaborations"))
        .merge(resource::admin_routes::<Event>("/events"))
        .merge(resource::admin_routes::<EventMedia>("/event-media"))
        .merge(resource::admin_routes::<Policy>("/policies"))
        .merge(resource::admin_routes::<CaseStudy>("/case-studies"))
        .merge(resource::admin_routes::<MembershipType>("/membership-types"))
        .merge(resource::admin_routes::<Membership>("/memberships"))
        .merge(resource::admin_routes::<Faq>("/faqs"))
        .route("/api/admin/campaigns", get(campaign_reads::list).post(campaigns::create))
        .route(
            "/api/admin/campaigns/:id",
            get(campaign_reads::get).patch(campaigns::update).delete(campaigns::delete),
        )
        .route("/api/admin/contact", get(contact::list))
        .route("/api/admin/contact/:id", axum::routing::delete(contact::delete))
        .route("/api/admin/contact/:id/status", patch(contact::set_status))
        .route("/api/admin/users", get(users::list))
        .route("/api/admin/publications", get(publications::list))
        .route(
            "/api/admin/publications/:id",
            get(publications::get).patch(publications::update).delete(publications::delete),
        )
        .route("/api/admin/publications/:id/approve", post(publications::approve))
        .route("/api/admin/publications/:id/reject", post(publications::reject))
        .route_layer(from_fn_with_state(Access::Admin, require_access))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(parsed))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Econsite API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Content, membership and publication API for an economics nonprofit",
            "endpoints": {
                "about": "/api/about/* (public)",
                "events": "/api/events[/:id], /api/events/media (public)",
                "policy": "/api/policy/{policies,case-studies,campaigns} (public)",
                "memberships": "/api/memberships/types, /api/faqs (public)",
                "contact": "/api/contact (public, POST)",
                "publications": "/api/publications[/:slug] (public)",
                "search": "/api/search?q=&type=&page=&limit= (public)",
                "profile": "/api/profile/* (authenticated)",
                "admin": "/api/admin/* (administrators)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(latency) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "latency_ms": latency.as_millis() as u64,
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "code": "SERVICE_UNAVAILABLE",
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{decode_jwt, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Caller resolved from a valid bearer token
#[derive(Clone, Debug)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_admin: bool,
}

impl Identity {
    fn from_claims(claims: Claims, is_admin: bool) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            is_admin,
        }
    }
}

/// Optional identity attached to every request by `identify`
#[derive(Clone, Debug, Default)]
pub struct Caller(pub Option<Identity>);

/// Access level enforced by `require_access`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Authenticated,
    Admin,
}

/// Resolve the optional caller. A missing or invalid token yields no identity;
/// rejection is left to the guard so public routes still answer.
pub async fn identify(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let identity = match extract_bearer(request.headers()) {
        Some(token) => match decode_jwt(token, &state.config.security.jwt_secret) {
            Ok(claims) => {
                let is_admin = state.admins.contains(&claims.sub);
                Some(Identity::from_claims(claims, is_admin))
            }
            Err(e) => {
                tracing::debug!("Ignoring bearer token: {}", e);
                None
            }
        },
        None => None,
    };

    request.extensions_mut().insert(Caller(identity));
    next.run(request).await
}

/// The admin gate. Runs before any extractor touches the body.
pub async fn require_access(State(access): State<Access>, mut request: Request, next: Next) -> Response {
    let identity = request
        .extensions()
        .get::<Caller>()
        .and_then(|caller| caller.0.clone());

    let identity = match identity {
        Some(identity) => identity,
        None => return ApiError::unauthenticated("Authentication required").into_response(),
    };

    if access == Access::Admin && !identity.is_admin {
        tracing::warn!(user_id = %identity.user_id, path = %request.uri().path(), "Admin access denied");
        return ApiError::unauthorized("Administrator access required").into_response();
    }

    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_none());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_none());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer(&headers).is_none());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }
}

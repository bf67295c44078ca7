use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::verify_jwt;
use crate::error::ApiError;
use crate::users::{PublicUser, UserStore};

pub const MSG_INVALID_AUTH: &str = "invalid authentication";
pub const MSG_INVALID_TOKEN: &str = "invalid token";
pub const MSG_USER_NOT_FOUND: &str = "user not found";

/// Authenticated user context, password already stripped.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser(pub PublicUser);

#[derive(Clone)]
pub struct AuthState {
    secret: Arc<str>,
    users: Arc<dyn UserStore>,
}

impl AuthState {
    pub fn new(secret: impl Into<Arc<str>>, users: Arc<dyn UserStore>) -> Self {
        Self {
            secret: secret.into(),
            users,
        }
    }
}

/// Stateless per-request bearer check. Every failure is a 401; only the message differs.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())
        .ok_or_else(|| ApiError::unauthorized(MSG_INVALID_AUTH))?
        .to_string();

    let claims = verify_jwt(&token, &auth.secret).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ApiError::unauthorized(MSG_INVALID_TOKEN)
    })?;

    let user = match auth.users.find_by_id(&claims.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("Token for unknown user '{}'", claims.user_id);
            return Err(ApiError::unauthorized(MSG_USER_NOT_FOUND));
        }
        Err(e) => {
            tracing::error!("User lookup failed for '{}': {}", claims.user_id, e);
            return Err(ApiError::unauthorized(MSG_INVALID_TOKEN));
        }
    };

    tracing::debug!("Authenticated user {} ({:?})", user.id, user.role);
    request.extensions_mut().insert(AuthUser(PublicUser::from(user)));

    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

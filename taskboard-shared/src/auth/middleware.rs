/// Authentication middleware for Axum
///
/// Resolves the caller through an [`IdentityProvider`], inserts an
/// [`AuthContext`] into request extensions and writes any session-refresh
/// cookies the provider queued onto the response.
///
/// Credentials are read from `Authorization: Bearer <token>` first, then from
/// the request cookies. Anything missing or invalid answers 401 before the
/// handler runs.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Extension, Router};
/// use taskboard_shared::auth::identity::{IdentityProvider, JwtIdentityProvider, SessionSettings};
/// use taskboard_shared::auth::middleware::{session_auth_middleware, AuthContext};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.user_id.to_string()
/// }
///
/// let provider: Arc<dyn IdentityProvider> = Arc::new(JwtIdentityProvider::new(
///     "a-secret-that-is-at-least-32-bytes-long",
///     SessionSettings::default(),
/// ));
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn_with_state(provider, session_auth_middleware));
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::identity::{Identity, IdentityProvider};
use super::jwt::JwtError;
use super::session::RequestCookies;

/// Authentication context added to request extensions
///
/// Handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: Uuid,
}

impl From<Identity> for AuthContext {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
        }
    }
}

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token and no session cookie
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header present but not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),

    /// The identity provider itself failed
    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::Provider(msg) => {
                error!(error = %msg, "Identity provider failed");
                "Authentication failed".to_string()
            }
            other => other.to_string(),
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized",
                "message": message,
            })),
        )
            .into_response()
    }
}

/// Session authentication middleware
///
/// Use with `axum::middleware::from_fn_with_state`, passing the provider as
/// state.
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Neither a bearer token nor a session cookie is present
/// - The Authorization header is not a bearer token
/// - The credential fails verification
pub async fn session_auth_middleware(
    State(provider): State<Arc<dyn IdentityProvider>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let bearer = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| AuthError::InvalidFormat("Invalid Authorization header".to_string()))?;
            let token = value
                .strip_prefix("Bearer ")
                .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;
            Some(token.trim().to_string())
        }
        None => None,
    };

    let mut cookies = RequestCookies::from_headers(req.headers());

    let identity = provider
        .verify(bearer.as_deref(), &mut cookies)
        .await
        .map_err(|e| {
            debug!(error = %e, "Rejected request credentials");
            e
        })?;

    req.extensions_mut().insert(AuthContext::from(identity));

    let mut response = next.run(req).await;

    for cookie in cookies.take_pending() {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %cookie.name(), error = %e, "Dropping unrenderable cookie"),
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::{JwtIdentityProvider, SessionSettings};
    use crate::auth::jwt::{create_token, Claims};
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Extension, Router};
    use chrono::Duration;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn app() -> Router {
        let provider: Arc<dyn IdentityProvider> =
            Arc::new(JwtIdentityProvider::new(SECRET, SessionSettings::default()));

        Router::new()
            .route(
                "/whoami",
                get(|Extension(auth): Extension<AuthContext>| async move { auth.user_id.to_string() }),
            )
            .layer(middleware::from_fn_with_state(provider, session_auth_middleware))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_credentials_is_401() {
        let response = app()
            .oneshot(HttpRequest::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_non_bearer_header_is_401() {
        let response = app()
            .oneshot(
                HttpRequest::get("/whoami")
                    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bearer_token_binds_user() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::new(user_id), SECRET).unwrap();

        let response = app()
            .oneshot(
                HttpRequest::get("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_string(response).await, user_id.to_string());
    }

    #[tokio::test]
    async fn test_expiring_cookie_gets_set_cookie() {
        let user_id = Uuid::new_v4();
        let token = create_token(&Claims::with_expiration(user_id, Duration::minutes(2)), SECRET).unwrap();

        let response = app()
            .oneshot(
                HttpRequest::get("/whoami")
                    .header(header::COOKIE, format!("taskboard_session={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("taskboard_session="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn test_jwt_error_mapping() {
        assert!(matches!(AuthError::from(JwtError::Expired), AuthError::InvalidToken(m) if m == "Token expired"));
        assert!(matches!(AuthError::from(JwtError::InvalidIssuer), AuthError::InvalidToken(_)));
    }
}

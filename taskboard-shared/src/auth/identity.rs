/// Identity boundary
///
/// Task routes only need to know *who* is calling. [`IdentityProvider`]
/// answers that from the request's bearer token or session cookie and may
/// ask for the session cookie to be refreshed.
///
/// [`JwtIdentityProvider`] is the built-in provider. Deployments backed by
/// an external auth service implement the trait over that service instead.
///
/// # Refresh
///
/// When the credential came from the session cookie and expires within the
/// refresh window, the provider re-signs the session and queues a new
/// cookie. Bearer tokens are never refreshed.

use super::jwt::{create_token, validate_token, Claims, JwtError};
use super::middleware::AuthError;
use super::session::CookieJar;
use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User id every task operation is scoped to
    pub user_id: Uuid,
}

/// Resolves request credentials into an [`Identity`]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies the bearer token or, failing that, the session cookie
    ///
    /// May queue `Set-Cookie` instructions on `cookies`.
    async fn verify(
        &self,
        bearer: Option<&str>,
        cookies: &mut dyn CookieJar,
    ) -> Result<Identity, AuthError>;
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Cookie name carrying the session token
    pub cookie_name: String,

    /// Lifetime of a (re)issued session
    pub ttl: Duration,

    /// Refresh the cookie when less than this much lifetime remains
    pub refresh_window: Duration,

    /// Mark cookies `Secure`
    pub secure: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "taskboard_session".to_string(),
            ttl: Duration::hours(24),
            refresh_window: Duration::hours(1),
            secure: false,
        }
    }
}

/// HS256 session provider
#[derive(Debug, Clone)]
pub struct JwtIdentityProvider {
    secret: String,
    session: SessionSettings,
}

impl JwtIdentityProvider {
    pub fn new(secret: impl Into<String>, session: SessionSettings) -> Self {
        Self {
            secret: secret.into(),
            session,
        }
    }

    /// Issues a session token for a user
    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        create_token(&Claims::with_expiration(user_id, self.session.ttl), &self.secret)
    }

    /// Cookie carrying a freshly issued session
    pub fn session_cookie(&self, token: impl Into<String>) -> Cookie<'static> {
        Cookie::build((self.session.cookie_name.clone(), token.into()))
            .max_age(time::Duration::seconds(self.session.ttl.num_seconds()))
            .path("/")
            .http_only(true)
            .secure(self.session.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(
        &self,
        bearer: Option<&str>,
        cookies: &mut dyn CookieJar,
    ) -> Result<Identity, AuthError> {
        let from_cookie = bearer.is_none();
        let token = match bearer {
            Some(token) => token.to_string(),
            None => cookies
                .get_all()
                .into_iter()
                .find(|c| c.name() == self.session.cookie_name)
                .map(|c| c.value().to_string())
                .ok_or(AuthError::MissingCredentials)?,
        };

        let claims = validate_token(&token, &self.secret).map_err(AuthError::from)?;

        let expiring = claims
            .time_until_expiration()
            .map_or(true, |left| left < self.session.refresh_window);

        if from_cookie && expiring {
            let refreshed = self
                .issue(claims.sub)
                .map_err(|e| AuthError::Provider(e.to_string()))?;
            debug!(user_id = %claims.sub, "Refreshing session cookie");
            cookies.set_all(vec![self.session_cookie(refreshed)]);
        }

        Ok(Identity { user_id: claims.sub })
    }
}

/// Public client configuration
///
/// Serves the settings a browser client needs to reach the auth service,
/// so they are controlled server-side rather than baked into the client.
///
/// # Endpoint
///
/// ```text
/// GET /api/config
/// ```
///
/// # Response
///
/// ```json
/// { "authUrl": "https://auth.example.com", "authPublicKey": "pk_..." }
/// ```
///
/// Responses are cacheable by shared caches for an hour. When either setting
/// is missing the endpoint answers 500.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

/// `Cache-Control` value for the public config
pub const CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";

/// Public config response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigResponse {
    pub auth_url: String,
    pub auth_public_key: String,
}

/// Public config handler
pub async fn public_config(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let public = &state.config.public;

    let (Some(auth_url), Some(auth_public_key)) = (&public.auth_url, &public.auth_public_key) else {
        return Err(ApiError::InternalError(
            "AUTH_URL and AUTH_PUBLIC_KEY are not set".to_string(),
        ));
    };

    Ok((
        [(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL))],
        Json(PublicConfigResponse {
            auth_url: auth_url.clone(),
            auth_public_key: auth_public_key.clone(),
        }),
    ))
}

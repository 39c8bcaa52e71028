/// Middleware modules for the API server
///
/// Authentication lives in `taskboard_shared::auth::middleware`; this
/// module holds the response-side layers.

pub mod security;

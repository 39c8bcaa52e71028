/// Authentication utilities
///
/// # Modules
///
/// - [`jwt`]: HS256 session token signing and validation
/// - [`session`]: cookie capability set handed to identity providers
/// - [`identity`]: the `IdentityProvider` boundary and its JWT implementation
/// - [`middleware`]: Axum middleware binding an `AuthContext` to each request
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(Uuid::new_v4()), secret)?;
/// validate_token(&token, secret)?;
/// # Ok(())
/// # }
/// ```

pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod session;

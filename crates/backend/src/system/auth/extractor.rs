use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use contracts::system::auth::{UserContext, UserRole};

use crate::shared::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extractor for the caller's identity.
///
/// The identity provider in front of the service resolves the user and
/// forwards it as headers. Usage in handlers:
/// `async fn handler(CurrentUser(ctx): CurrentUser) -> Response`
pub struct CurrentUser(pub UserContext);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts).map(CurrentUser)
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn user_from_parts(parts: &Parts) -> Result<UserContext, AppError> {
    let uid = header(parts, USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing user identity".into()))?;
    let role_code = header(parts, USER_ROLE_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing user role".into()))?;
    let role = UserRole::from_code(role_code)
        .ok_or_else(|| AppError::Unauthorized(format!("Unknown role '{}'", role_code)))?;

    let mut ctx = UserContext::new(uid, role);
    if let Some(email) = header(parts, USER_EMAIL_HEADER) {
        ctx = ctx.with_email(email);
    }
    if let Some(name) = header(parts, USER_NAME_HEADER) {
        ctx = ctx.with_display_name(name);
    }
    Ok(ctx)
}

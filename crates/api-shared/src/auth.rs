use chrono::{DateTime, Utc};
use discharge_core::{DischargeError, Session};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingBearer,
    #[error(transparent)]
    InvalidToken(#[from] DischargeError),
}

/// Restores the session carried in an `Authorization: Bearer <token>` header value.
///
/// The token is only checked for shape; it is not signed.
pub fn session_from_authorization(
    header: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Session, AuthError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingBearer)?;

    Ok(Session::from_token(token, now)?)
}

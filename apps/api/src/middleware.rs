use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use freightdesk_core::{AppError, UserId, UserIdentity};

use crate::error::ApiResult;

const USER_ID_HEADER: &str = "x-user-id";
const USER_NAME_HEADER: &str = "x-user-name";
const USER_EMAIL_HEADER: &str = "x-user-email";

/// Resolves the caller identity from the gateway-provided headers.
///
/// The upstream gateway authenticates the request and forwards the user id;
/// the API trusts these headers and never sees credentials.
pub async fn require_identity(mut request: Request, next: Next) -> ApiResult<Response> {
    let identity = identity_from_headers(request.headers())?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn identity_from_headers(headers: &HeaderMap) -> Result<UserIdentity, AppError> {
    let raw_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let user_id = uuid::Uuid::parse_str(raw_id)
        .map(UserId::from_uuid)
        .map_err(|_| AppError::Unauthorized("invalid user id header".to_owned()))?;

    let display_name = headers
        .get(USER_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let email = headers
        .get(USER_EMAIL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    Ok(UserIdentity::new(user_id, display_name, email))
}

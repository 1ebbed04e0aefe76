use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{AuthenticatedUser, JwtService};
use crate::error::ApiError;

/// Rejects requests without a valid bearer token; otherwise attaches the caller as
/// an [`AuthenticatedUser`] extension.
pub async fn auth_middleware(
    State(jwt_service): State<JwtService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(ApiError::unauthorized)?;

    let claims = jwt_service.verify_token(token).map_err(|err| {
        debug!("rejected bearer token: {}", err);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let user = AuthenticatedUser::from(claims);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Caller identity attached to request extensions by [`super::auth_middleware`].
///
/// Only the id is carried; permissions are resolved from storage on every check so
/// role changes apply before the token expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub }
    }
}

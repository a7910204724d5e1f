//! Caller identity as forwarded by the session layer in front of this
//! service. The `x-user-id` and `x-user-role` headers are trusted as given.

use std::str::FromStr;

use axum::{extract::FromRequestParts, http::HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Admin,
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CUSTOMER" => Ok(Role::Customer),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(AppError::BadRequest("Invalid user role".into())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role != Role::Admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl AuthUser {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user_id = headers
            .get(USER_ID_HEADER)
            .ok_or(AppError::Unauthorized)?
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid user id header".into()))?;
        let user_id = Uuid::parse_str(user_id.trim())
            .map_err(|_| AppError::BadRequest("Invalid user id header".into()))?;

        let role = match headers.get(USER_ROLE_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| AppError::BadRequest("Invalid user role".into()))?
                .trim()
                .parse()?,
            None => Role::Customer,
        };

        Ok(AuthUser { user_id, role })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(user: Option<&str>, role: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(user) = user {
            map.insert(USER_ID_HEADER, HeaderValue::from_str(user).unwrap());
        }
        if let Some(role) = role {
            map.insert(USER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        }
        map
    }

    #[test]
    fn missing_user_is_unauthorized() {
        let err = AuthUser::from_headers(&headers(None, Some("ADMIN"))).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn role_defaults_to_customer() {
        let id = Uuid::new_v4();
        let user = AuthUser::from_headers(&headers(Some(&id.to_string()), None)).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, Role::Customer);
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
    }

    #[test]
    fn admin_role_is_case_insensitive() {
        let id = Uuid::new_v4().to_string();
        let user = AuthUser::from_headers(&headers(Some(&id), Some("admin"))).unwrap();
        assert!(ensure_admin(&user).is_ok());
    }

    #[test]
    fn malformed_user_id_is_rejected() {
        let err = AuthUser::from_headers(&headers(Some("42"), None)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

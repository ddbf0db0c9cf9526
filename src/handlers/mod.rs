pub mod articles;
pub mod auth;
pub mod bookmarks;
pub mod events;
pub mod gallery;
pub mod home;
pub mod reefs;

use actix_web::web;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::models::user::{self, UserRole};
use crate::utils::auth::Claims;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Load the user behind a set of verified claims.
pub async fn current_user(
    db: &web::Data<DatabaseConnection>,
    claims: &Claims,
) -> Result<user::Model, actix_web::Error> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|e| actix_web::error::ErrorBadRequest(format!("Invalid user ID: {}", e)))?;

    user::Entity::find_by_id(user_id)
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| actix_web::error::ErrorUnauthorized("User no longer exists"))
}

/// Reef and article authoring is limited to researchers and admins.
pub fn ensure_contributor(user: &user::Model) -> Result<(), actix_web::Error> {
    match user.role {
        UserRole::Admin | UserRole::Researcher => Ok(()),
        UserRole::Student => Err(actix_web::error::ErrorForbidden(
            "Researcher or admin role required",
        )),
    }
}

pub fn ensure_admin(user: &user::Model) -> Result<(), actix_web::Error> {
    match user.role {
        UserRole::Admin => Ok(()),
        _ => Err(actix_web::error::ErrorForbidden("Admin role required")),
    }
}

/// Exact-match semantics for a categorical filter whose value is not one of
/// the declared choices: the filter matches nothing.
pub fn match_nothing() -> SimpleExpr {
    Expr::value(false)
}

/// 1-based page number from a query parameter, clamped to at least 1.
pub fn page_number(page: Option<u64>) -> u64 {
    page.unwrap_or(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_clamps() {
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some(0)), 1);
        assert_eq!(page_number(Some(7)), 7);
    }
}

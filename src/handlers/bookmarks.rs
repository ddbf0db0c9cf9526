use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{current_user, page_number, ErrorResponse};
use crate::models::{reef, reef_bookmark};
use crate::utils::auth::Claims;

const BOOKMARK_PAGE_SIZE: u64 = 12;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize)]
pub struct BookmarkListQuery {
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct BookmarkResponse {
    pub id: String,
    pub reef: Option<super::reefs::ReefResponse>,
    pub notes: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct BookmarkListResponse {
    pub bookmarks: Vec<BookmarkResponse>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct BookmarkToggleResponse {
    pub bookmarked: bool,
    pub message: String,
}

// ============ Handlers ============

/// GET /bookmarks (authenticated)
/// The caller's bookmarked reefs, newest first.
pub async fn list_bookmarks(
    db: web::Data<DatabaseConnection>,
    claims: web::ReqData<Claims>,
    query: web::Query<BookmarkListQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;

    let paginator = reef_bookmark::Entity::find()
        .filter(reef_bookmark::Column::UserId.eq(user.id))
        .order_by_desc(reef_bookmark::Column::CreatedAt)
        .find_also_related(reef::Entity)
        .paginate(db.as_ref(), BOOKMARK_PAGE_SIZE);

    let counts = paginator.num_items_and_pages().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let page = page_number(query.page);
    let rows = paginator.fetch_page(page - 1).await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let bookmarks = rows
        .into_iter()
        .map(|(bookmark, reef)| BookmarkResponse {
            id: bookmark.id.to_string(),
            reef: reef.map(super::reefs::ReefResponse::from),
            notes: bookmark.notes,
            created_at: bookmark.created_at.to_rfc3339(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(BookmarkListResponse {
        bookmarks,
        total: counts.number_of_items,
        page,
        total_pages: counts.number_of_pages,
    }))
}

/// POST /reefs/{id}/bookmark (authenticated)
/// Toggle: deletes the bookmark when one exists, creates it otherwise.
/// Unauthenticated callers are rejected by the JWT middleware with a JSON 401.
pub async fn toggle_bookmark(
    db: web::Data<DatabaseConnection>,
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;
    let reef_id = path.into_inner();

    let reef = reef::Entity::find_by_id(reef_id)
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Reef not found"))?;

    let existing = reef_bookmark::Entity::find()
        .filter(reef_bookmark::Column::UserId.eq(user.id))
        .filter(reef_bookmark::Column::ReefId.eq(reef_id))
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    // Two racing first-toggles can both reach the insert; the unique index on
    // (user_id, reef_id) rejects the loser.
    if let Some(bookmark) = existing {
        bookmark.delete(db.as_ref()).await.map_err(|e| {
            log::error!("Failed to remove bookmark: {}", e);
            actix_web::error::ErrorInternalServerError("Failed to remove bookmark")
        })?;

        Ok(HttpResponse::Ok().json(BookmarkToggleResponse {
            bookmarked: false,
            message: format!("Removed {} from bookmarks", reef.name),
        }))
    } else {
        let new_bookmark = reef_bookmark::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            reef_id: Set(reef_id),
            notes: Set(String::new()),
            created_at: Set(Utc::now()),
        };

        if let Err(e) = new_bookmark.insert(db.as_ref()).await {
            log::error!("Failed to create bookmark: {}", e);
            return Ok(HttpResponse::Conflict()
                .json(ErrorResponse::new("Bookmark already exists")));
        }

        Ok(HttpResponse::Ok().json(BookmarkToggleResponse {
            bookmarked: true,
            message: format!("Added {} to bookmarks", reef.name),
        }))
    }
}

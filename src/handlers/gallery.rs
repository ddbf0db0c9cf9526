use actix_web::{web, HttpResponse, Responder};
use base64::Engine;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{current_user, page_number, ErrorResponse};
use crate::models::gallery_item::{self, MediaType};
use crate::models::{event, reef};
use crate::services::media_storage::store_upload;
use crate::utils::auth::Claims;
use crate::utils::config::Config;
use crate::utils::validators::validate_upload;

const GALLERY_PAGE_SIZE: u64 = 20;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize)]
pub struct GalleryListQuery {
    pub reef_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct GalleryItemResponse {
    pub id: String,
    pub reef_id: Option<String>,
    pub event_id: Option<String>,
    pub media_type: String,
    pub title: String,
    pub description: String,
    pub file_path: String,
    pub uploaded_by: Option<String>,
    pub uploaded_at: String,
}

impl From<gallery_item::Model> for GalleryItemResponse {
    fn from(model: gallery_item::Model) -> Self {
        Self {
            id: model.id.to_string(),
            reef_id: model.reef_id.map(|id| id.to_string()),
            event_id: model.event_id.map(|id| id.to_string()),
            media_type: model.media_type.as_str().to_string(),
            title: model.title,
            description: model.description,
            file_path: model.file_path,
            uploaded_by: model.uploaded_by.map(|id| id.to_string()),
            uploaded_at: model.uploaded_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GalleryListResponse {
    pub items: Vec<GalleryItemResponse>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub reef_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub media_type: String,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    /// Base64-encoded file content.
    pub data: String,
}

// ============ Handlers ============

/// GET /gallery
/// Gallery items, newest first, optionally scoped to a reef and/or event.
pub async fn list_gallery(
    db: web::Data<DatabaseConnection>,
    query: web::Query<GalleryListQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let mut condition = Condition::all();
    if let Some(reef_id) = query.reef_id {
        condition = condition.add(gallery_item::Column::ReefId.eq(reef_id));
    }
    if let Some(event_id) = query.event_id {
        condition = condition.add(gallery_item::Column::EventId.eq(event_id));
    }

    let paginator = gallery_item::Entity::find()
        .filter(condition)
        .order_by_desc(gallery_item::Column::UploadedAt)
        .paginate(db.as_ref(), GALLERY_PAGE_SIZE);

    let counts = paginator.num_items_and_pages().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let page = page_number(query.page);
    let items = paginator.fetch_page(page - 1).await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(GalleryListResponse {
        items: items.into_iter().map(GalleryItemResponse::from).collect(),
        total: counts.number_of_items,
        page,
        total_pages: counts.number_of_pages,
    }))
}

/// POST /gallery (authenticated)
/// Upload a photo or video, optionally linked to a reef and/or event. The
/// file lands under MEDIA_ROOT/uploads/<year>/<month>/ and only the relative
/// path is persisted.
pub async fn upload_media(
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    claims: web::ReqData<Claims>,
    payload: web::Json<UploadRequest>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;

    let media_type = match MediaType::parse(&payload.media_type) {
        Some(media_type) => media_type,
        None => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(format!(
                "Invalid media type '{}'. Choices: photo, video",
                payload.media_type
            ))));
        }
    };

    if payload.title.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Title is required")));
    }

    let bytes = match base64::engine::general_purpose::STANDARD.decode(&payload.data) {
        Ok(bytes) => bytes,
        Err(_) => {
            return Ok(HttpResponse::BadRequest()
                .json(ErrorResponse::new("File data is not valid base64")));
        }
    };

    if let Err(e) = validate_upload(&payload.file_name, bytes.len(), &media_type) {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())));
    }

    if let Some(reef_id) = payload.reef_id {
        let found = reef::Entity::find_by_id(reef_id)
            .one(db.as_ref())
            .await
            .map_err(|e| {
                log::error!("Database error: {}", e);
                actix_web::error::ErrorInternalServerError("Database error")
            })?;
        if found.is_none() {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Reef not found")));
        }
    }

    if let Some(event_id) = payload.event_id {
        let found = event::Entity::find_by_id(event_id)
            .one(db.as_ref())
            .await
            .map_err(|e| {
                log::error!("Database error: {}", e);
                actix_web::error::ErrorInternalServerError("Database error")
            })?;
        if found.is_none() {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Event not found")));
        }
    }

    let file_path = store_upload(&config.media_root, &payload.file_name, &bytes).map_err(|e| {
        log::error!("Failed to store upload: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to store upload")
    })?;

    let new_item = gallery_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        reef_id: Set(payload.reef_id),
        event_id: Set(payload.event_id),
        media_type: Set(media_type),
        title: Set(payload.title.clone()),
        description: Set(payload.description.clone().unwrap_or_default()),
        file_path: Set(file_path),
        uploaded_by: Set(Some(user.id)),
        uploaded_at: Set(Utc::now()),
    };

    let item = new_item.insert(db.as_ref()).await.map_err(|e| {
        log::error!("Failed to save gallery item: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to save gallery item")
    })?;

    log::info!(
        "📷 {} '{}' uploaded by '{}'",
        item.media_type.as_str(),
        item.title,
        user.username
    );

    Ok(HttpResponse::Created().json(GalleryItemResponse::from(item)))
}

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{current_user, ensure_admin, ensure_contributor, match_nothing, page_number, ErrorResponse};
use crate::models::reef::{self, HealthStatus, ReefRegion};
use crate::models::{event, gallery_item};
use crate::services::deletion::delete_reef_cascade;
use crate::services::session_state::{
    resolve_session_id, session_cookie, ReefFilters, SessionStore,
};
use crate::utils::auth::Claims;
use crate::utils::validators::{escape_like, validate_reef_geometry};

const REEF_PAGE_SIZE: u64 = 12;
const RECENTLY_VIEWED_SHOWN: usize = 5;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize)]
pub struct ReefListQuery {
    pub search: Option<String>,
    pub region: Option<String>,
    pub health: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ReefResponse {
    pub id: String,
    pub name: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub area_km2: f64,
    pub depth_meters: f64,
    pub health_status: String,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<reef::Model> for ReefResponse {
    fn from(model: reef::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            region: model.region.as_str().to_string(),
            country: model.country,
            latitude: model.latitude,
            longitude: model.longitude,
            description: model.description,
            area_km2: model.area_km2,
            depth_meters: model.depth_meters,
            health_status: model.health_status.as_str().to_string(),
            created_by: model.created_by.map(|id| id.to_string()),
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReefListResponse {
    pub reefs: Vec<ReefResponse>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub applied_filters: ReefFilters,
    pub recently_viewed: Vec<ReefResponse>,
}

#[derive(Debug, Serialize)]
pub struct ReefDetailResponse {
    pub reef: ReefResponse,
    pub events: Vec<super::events::EventResponse>,
    pub gallery_items: Vec<super::gallery::GalleryItemResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReefRequest {
    pub name: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub area_km2: f64,
    pub depth_meters: f64,
    pub health_status: Option<String>,
}

// ============ Filtering/sorting ============

/// Allow-listed sort keys for the reef listing; `-` prefix means descending.
/// Anything else falls back to the default (newest first).
fn parse_reef_sort(sort: Option<&str>) -> Option<(reef::Column, Order)> {
    match sort.unwrap_or_default() {
        "name" => Some((reef::Column::Name, Order::Asc)),
        "-name" => Some((reef::Column::Name, Order::Desc)),
        "area_km2" => Some((reef::Column::AreaKm2, Order::Asc)),
        "-area_km2" => Some((reef::Column::AreaKm2, Order::Desc)),
        "health_status" => Some((reef::Column::HealthStatus, Order::Asc)),
        "-health_status" => Some((reef::Column::HealthStatus, Order::Desc)),
        "created_at" => Some((reef::Column::CreatedAt, Order::Asc)),
        "-created_at" => Some((reef::Column::CreatedAt, Order::Desc)),
        _ => None,
    }
}

/// A request that carries no filter parameters at all restores the session's
/// last remembered filter set; any filter parameter, even an empty one,
/// replaces it.
fn effective_reef_filters(query: &ReefListQuery, remembered: Option<ReefFilters>) -> ReefFilters {
    if query.search.is_none() && query.region.is_none() && query.health.is_none() {
        return remembered.unwrap_or_default();
    }

    ReefFilters {
        search: query.search.clone().unwrap_or_default(),
        region: query.region.clone().unwrap_or_default(),
        health: query.health.clone().unwrap_or_default(),
    }
}

fn reef_filter_condition(filters: &ReefFilters) -> Condition {
    let mut condition = Condition::all();

    let search = filters.search.trim();
    if !search.is_empty() {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(
            Condition::any()
                .add(Expr::col(reef::Column::Name).ilike(pattern.clone()))
                .add(Expr::col(reef::Column::Country).ilike(pattern.clone()))
                .add(Expr::col(reef::Column::Description).ilike(pattern)),
        );
    }

    if !filters.region.is_empty() {
        condition = match ReefRegion::parse(&filters.region) {
            Some(region) => condition.add(reef::Column::Region.eq(region)),
            None => condition.add(match_nothing()),
        };
    }

    if !filters.health.is_empty() {
        condition = match HealthStatus::parse(&filters.health) {
            Some(health) => condition.add(reef::Column::HealthStatus.eq(health)),
            None => condition.add(match_nothing()),
        };
    }

    condition
}

// ============ Handlers ============

/// GET /reefs
/// Reef listing with search, region/health filters, sorting, and pagination.
/// The applied filter set is remembered in the caller's session; a request
/// without any filter parameters picks the remembered set back up.
pub async fn list_reefs(
    db: web::Data<DatabaseConnection>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    query: web::Query<ReefListQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let (session_id, is_new_session) = resolve_session_id(&req);

    let applied_filters =
        effective_reef_filters(&query, sessions.last_reef_filters(&session_id));
    sessions.remember_reef_filters(&session_id, applied_filters.clone());

    let mut select = reef::Entity::find().filter(reef_filter_condition(&applied_filters));
    select = match parse_reef_sort(query.sort.as_deref()) {
        Some((column, order)) => select.order_by(column, order),
        None => select.order_by_desc(reef::Column::CreatedAt),
    };

    let paginator = select.paginate(db.as_ref(), REEF_PAGE_SIZE);
    let counts = paginator.num_items_and_pages().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let page = page_number(query.page);
    let reefs = paginator.fetch_page(page - 1).await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let recently_viewed =
        load_recently_viewed(db.as_ref(), &sessions.viewed_reefs(&session_id)).await?;

    let body = ReefListResponse {
        reefs: reefs.into_iter().map(ReefResponse::from).collect(),
        total: counts.number_of_items,
        page,
        total_pages: counts.number_of_pages,
        applied_filters,
        recently_viewed,
    };

    let mut response = HttpResponse::Ok();
    if is_new_session {
        response.cookie(session_cookie(&session_id));
    }
    Ok(response.json(body))
}

async fn load_recently_viewed(
    db: &DatabaseConnection,
    viewed_ids: &[Uuid],
) -> Result<Vec<ReefResponse>, actix_web::Error> {
    let shown: Vec<Uuid> = viewed_ids.iter().take(RECENTLY_VIEWED_SHOWN).copied().collect();
    if shown.is_empty() {
        return Ok(vec![]);
    }

    let mut reefs = reef::Entity::find()
        .filter(reef::Column::Id.is_in(shown.clone()))
        .all(db)
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    // Preserve most-recent-first order; the database returns rows unordered.
    reefs.sort_by_key(|r| shown.iter().position(|id| *id == r.id));

    Ok(reefs.into_iter().map(ReefResponse::from).collect())
}

/// GET /reefs/{id}
/// Reef detail with recent events and gallery items; records the view on the
/// session's recently-viewed list.
pub async fn get_reef(
    db: web::Data<DatabaseConnection>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, actix_web::Error> {
    let reef_id = path.into_inner();

    let reef = reef::Entity::find_by_id(reef_id)
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Reef not found"))?;

    let events = event::Entity::find()
        .filter(event::Column::ReefId.eq(reef_id))
        .order_by_desc(event::Column::EventDate)
        .order_by_desc(event::Column::CreatedAt)
        .limit(10)
        .all(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    let gallery_items = gallery_item::Entity::find()
        .filter(gallery_item::Column::ReefId.eq(reef_id))
        .order_by_desc(gallery_item::Column::UploadedAt)
        .limit(8)
        .all(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    let (session_id, is_new_session) = resolve_session_id(&req);
    sessions.record_reef_view(&session_id, reef_id);

    let body = ReefDetailResponse {
        reef: ReefResponse::from(reef),
        events: events
            .into_iter()
            .map(super::events::EventResponse::from)
            .collect(),
        gallery_items: gallery_items
            .into_iter()
            .map(super::gallery::GalleryItemResponse::from)
            .collect(),
    };

    let mut response = HttpResponse::Ok();
    if is_new_session {
        response.cookie(session_cookie(&session_id));
    }
    Ok(response.json(body))
}

/// POST /reefs (researcher/admin)
pub async fn create_reef(
    db: web::Data<DatabaseConnection>,
    claims: web::ReqData<Claims>,
    payload: web::Json<CreateReefRequest>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;
    ensure_contributor(&user)?;

    let region = match ReefRegion::parse(&payload.region) {
        Some(region) => region,
        None => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(format!(
                "Invalid region '{}'",
                payload.region
            ))));
        }
    };

    let health_status = match payload.health_status.as_deref() {
        None | Some("") => HealthStatus::Fair,
        Some(value) => match HealthStatus::parse(value) {
            Some(health) => health,
            None => {
                return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(format!(
                    "Invalid health status '{}'",
                    value
                ))));
            }
        },
    };

    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Name is required")));
    }

    if let Err(e) = validate_reef_geometry(
        payload.latitude,
        payload.longitude,
        payload.area_km2,
        payload.depth_meters,
    ) {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())));
    }

    let new_reef = reef::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.clone()),
        region: Set(region),
        country: Set(payload.country.clone()),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        description: Set(payload.description.clone()),
        area_km2: Set(payload.area_km2),
        depth_meters: Set(payload.depth_meters),
        health_status: Set(health_status),
        created_by: Set(Some(user.id)),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    };

    let reef = new_reef.insert(db.as_ref()).await.map_err(|e| {
        log::error!("Failed to create reef: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to create reef")
    })?;

    log::info!("🪸 Reef '{}' created by '{}'", reef.name, user.username);

    Ok(HttpResponse::Created().json(ReefResponse::from(reef)))
}

/// DELETE /reefs/{id} (admin)
/// Explicitly cascades to the reef's events, bookmarks, and gallery items.
pub async fn delete_reef(
    db: web::Data<DatabaseConnection>,
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;
    ensure_admin(&user)?;

    let reef_id = path.into_inner();
    let reef = reef::Entity::find_by_id(reef_id)
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Reef not found"))?;

    delete_reef_cascade(db.as_ref(), reef_id).await.map_err(|e| {
        log::error!("Failed to delete reef {}: {}", reef_id, e);
        actix_web::error::ErrorInternalServerError("Failed to delete reef")
    })?;

    log::info!("🗑️  Reef '{}' deleted by '{}'", reef.name, user.username);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Deleted {}", reef.name)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reef_sort_allow_list() {
        assert!(matches!(
            parse_reef_sort(Some("name")),
            Some((reef::Column::Name, Order::Asc))
        ));
        assert!(matches!(
            parse_reef_sort(Some("-area_km2")),
            Some((reef::Column::AreaKm2, Order::Desc))
        ));
        assert!(matches!(
            parse_reef_sort(Some("-health_status")),
            Some((reef::Column::HealthStatus, Order::Desc))
        ));
        assert!(matches!(
            parse_reef_sort(Some("created_at")),
            Some((reef::Column::CreatedAt, Order::Asc))
        ));
    }

    #[test]
    fn test_unknown_sort_key_falls_back_to_default() {
        assert!(parse_reef_sort(Some("latitude")).is_none());
        assert!(parse_reef_sort(Some("name; DROP TABLE reefs")).is_none());
        assert!(parse_reef_sort(None).is_none());
    }

    fn bare_query() -> ReefListQuery {
        ReefListQuery {
            search: None,
            region: None,
            health: None,
            sort: None,
            page: None,
        }
    }

    #[test]
    fn test_bare_request_restores_remembered_filters() {
        let remembered = ReefFilters {
            search: "staghorn".to_string(),
            region: "pacific".to_string(),
            health: String::new(),
        };

        let applied = effective_reef_filters(&bare_query(), Some(remembered.clone()));
        assert_eq!(applied, remembered);

        // No remembered set means no filters.
        assert_eq!(
            effective_reef_filters(&bare_query(), None),
            ReefFilters::default()
        );
    }

    #[test]
    fn test_explicit_filters_replace_remembered_ones() {
        let remembered = ReefFilters {
            search: "staghorn".to_string(),
            region: "pacific".to_string(),
            health: "poor".to_string(),
        };

        let query = ReefListQuery {
            region: Some("caribbean".to_string()),
            ..bare_query()
        };
        let applied = effective_reef_filters(&query, Some(remembered.clone()));
        assert_eq!(applied.region, "caribbean");
        assert!(applied.search.is_empty());
        assert!(applied.health.is_empty());

        // An empty parameter still counts as an explicit choice and clears
        // the remembered set.
        let query = ReefListQuery {
            search: Some(String::new()),
            ..bare_query()
        };
        assert_eq!(
            effective_reef_filters(&query, Some(remembered)),
            ReefFilters::default()
        );
    }
}

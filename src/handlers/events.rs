use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{current_user, ensure_admin, match_nothing, page_number, ErrorResponse};
use crate::models::event::{self, EventType, Severity};
use crate::models::{gallery_item, reef};
use crate::services::deletion::delete_event_cascade;
use crate::utils::auth::Claims;

const EVENT_PAGE_SIZE: u64 = 20;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub event_type: Option<String>,
    pub severity: Option<String>,
    pub year: Option<String>,
    pub resolved: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub reef_id: String,
    pub reef_name: Option<String>,
    pub event_type: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub event_date: String,
    pub reported_by: Option<String>,
    pub resolved: bool,
    pub notes: String,
    pub created_at: String,
}

impl From<event::Model> for EventResponse {
    fn from(model: event::Model) -> Self {
        Self {
            id: model.id.to_string(),
            reef_id: model.reef_id.to_string(),
            reef_name: None,
            event_type: model.event_type.as_str().to_string(),
            title: model.title,
            description: model.description,
            severity: model.severity.as_str().to_string(),
            event_date: model.event_date.format("%Y-%m-%d").to_string(),
            reported_by: model.reported_by.map(|id| id.to_string()),
            resolved: model.resolved,
            notes: model.notes,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    pub event: EventResponse,
    pub gallery_items: Vec<super::gallery::GalleryItemResponse>,
}

#[derive(Debug, Deserialize)]
pub struct PollutionReportRequest {
    pub reef_id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: Option<String>,
    pub event_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoralSightingRequest {
    pub reef_id: Uuid,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub notes: Option<String>,
}

// ============ Filtering/sorting ============

/// Allow-listed sort keys for the event listing; `-` prefix means descending.
fn parse_event_sort(sort: Option<&str>) -> Option<(event::Column, Order)> {
    match sort.unwrap_or_default() {
        "event_date" => Some((event::Column::EventDate, Order::Asc)),
        "-event_date" => Some((event::Column::EventDate, Order::Desc)),
        "severity" => Some((event::Column::Severity, Order::Asc)),
        "-severity" => Some((event::Column::Severity, Order::Desc)),
        "created_at" => Some((event::Column::CreatedAt, Order::Asc)),
        "-created_at" => Some((event::Column::CreatedAt, Order::Desc)),
        _ => None,
    }
}

/// Half-open calendar-year date range for the `year` filter.
fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
    Some((start, end))
}

fn event_filter_condition(query: &EventListQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(event_type) = query.event_type.as_deref().filter(|s| !s.is_empty()) {
        condition = match EventType::parse(event_type) {
            Some(event_type) => condition.add(event::Column::EventType.eq(event_type)),
            None => condition.add(match_nothing()),
        };
    }

    if let Some(severity) = query.severity.as_deref().filter(|s| !s.is_empty()) {
        condition = match Severity::parse(severity) {
            Some(severity) => condition.add(event::Column::Severity.eq(severity)),
            None => condition.add(match_nothing()),
        };
    }

    // A year that does not parse is ignored, like an unknown sort key.
    if let Some(year) = query
        .year
        .as_deref()
        .and_then(|y| y.parse::<i32>().ok())
        .and_then(year_bounds)
    {
        condition = condition
            .add(event::Column::EventDate.gte(year.0))
            .add(event::Column::EventDate.lt(year.1));
    }

    // Only the literal strings "true"/"false" filter; anything else is ignored.
    match query.resolved.as_deref() {
        Some("true") => condition = condition.add(event::Column::Resolved.eq(true)),
        Some("false") => condition = condition.add(event::Column::Resolved.eq(false)),
        _ => {}
    }

    condition
}

// ============ Handlers ============

/// GET /events
/// Event listing filtered by type, severity, year, and resolved status.
pub async fn list_events(
    db: web::Data<DatabaseConnection>,
    query: web::Query<EventListQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let mut select = event::Entity::find().filter(event_filter_condition(&query));
    select = match parse_event_sort(query.sort.as_deref()) {
        Some((column, order)) => select.order_by(column, order),
        None => select
            .order_by_desc(event::Column::EventDate)
            .order_by_desc(event::Column::CreatedAt),
    };

    let paginator = select
        .find_also_related(reef::Entity)
        .paginate(db.as_ref(), EVENT_PAGE_SIZE);
    let counts = paginator.num_items_and_pages().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let page = page_number(query.page);
    let rows = paginator.fetch_page(page - 1).await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let events = rows
        .into_iter()
        .map(|(event, reef)| {
            let mut response = EventResponse::from(event);
            response.reef_name = reef.map(|r| r.name);
            response
        })
        .collect();

    Ok(HttpResponse::Ok().json(EventListResponse {
        events,
        total: counts.number_of_items,
        page,
        total_pages: counts.number_of_pages,
    }))
}

/// GET /events/{id}
pub async fn get_event(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, actix_web::Error> {
    let event_id = path.into_inner();

    let (event, reef) = event::Entity::find_by_id(event_id)
        .find_also_related(reef::Entity)
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Event not found"))?;

    let gallery_items = gallery_item::Entity::find()
        .filter(gallery_item::Column::EventId.eq(event_id))
        .order_by_desc(gallery_item::Column::UploadedAt)
        .all(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    let mut response = EventResponse::from(event);
    response.reef_name = reef.map(|r| r.name);

    Ok(HttpResponse::Ok().json(EventDetailResponse {
        event: response,
        gallery_items: gallery_items
            .into_iter()
            .map(super::gallery::GalleryItemResponse::from)
            .collect(),
    }))
}

/// Event type is pinned server-side; a client-supplied value never reaches
/// the row (the request struct has no such field).
fn pollution_event(
    payload: &PollutionReportRequest,
    severity: Severity,
    reporter: Uuid,
) -> event::ActiveModel {
    event::ActiveModel {
        id: Set(Uuid::new_v4()),
        reef_id: Set(payload.reef_id),
        event_type: Set(EventType::Pollution),
        title: Set(payload.title.clone()),
        description: Set(payload.description.clone()),
        severity: Set(severity),
        event_date: Set(payload.event_date),
        reported_by: Set(Some(reporter)),
        resolved: Set(false),
        notes: Set(payload.notes.clone().unwrap_or_default()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
}

/// Coral sightings are always recorded as low-severity sighting events.
fn sighting_event(payload: &CoralSightingRequest, reporter: Uuid) -> event::ActiveModel {
    event::ActiveModel {
        id: Set(Uuid::new_v4()),
        reef_id: Set(payload.reef_id),
        event_type: Set(EventType::Sighting),
        title: Set(payload.title.clone()),
        description: Set(payload.description.clone()),
        severity: Set(Severity::Low),
        event_date: Set(payload.event_date),
        reported_by: Set(Some(reporter)),
        resolved: Set(false),
        notes: Set(payload.notes.clone().unwrap_or_default()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
}

async fn reef_exists(
    db: &DatabaseConnection,
    reef_id: Uuid,
) -> Result<bool, actix_web::Error> {
    let found = reef::Entity::find_by_id(reef_id)
        .one(db)
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;
    Ok(found.is_some())
}

/// POST /events/report (authenticated)
pub async fn create_pollution_report(
    db: web::Data<DatabaseConnection>,
    claims: web::ReqData<Claims>,
    payload: web::Json<PollutionReportRequest>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;

    if payload.title.trim().is_empty() || payload.description.trim().is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(ErrorResponse::new("Title and description are required")));
    }

    let severity = match payload.severity.as_deref() {
        None | Some("") => Severity::Medium,
        Some(value) => match Severity::parse(value) {
            Some(severity) => severity,
            None => {
                return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(format!(
                    "Invalid severity '{}'",
                    value
                ))));
            }
        },
    };

    if !reef_exists(db.as_ref(), payload.reef_id).await? {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Reef not found")));
    }

    let event = pollution_event(&payload, severity, user.id)
        .insert(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Failed to create pollution report: {}", e);
            actix_web::error::ErrorInternalServerError("Failed to create pollution report")
        })?;

    log::info!(
        "🛢️  Pollution report '{}' submitted by '{}'",
        event.title,
        user.username
    );

    Ok(HttpResponse::Created().json(EventResponse::from(event)))
}

/// POST /events/sighting (authenticated)
pub async fn create_coral_sighting(
    db: web::Data<DatabaseConnection>,
    claims: web::ReqData<Claims>,
    payload: web::Json<CoralSightingRequest>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;

    if payload.title.trim().is_empty() || payload.description.trim().is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(ErrorResponse::new("Title and description are required")));
    }

    if !reef_exists(db.as_ref(), payload.reef_id).await? {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Reef not found")));
    }

    let event = sighting_event(&payload, user.id)
        .insert(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Failed to create coral sighting: {}", e);
            actix_web::error::ErrorInternalServerError("Failed to create coral sighting")
        })?;

    log::info!(
        "🐠 Coral sighting '{}' submitted by '{}'",
        event.title,
        user.username
    );

    Ok(HttpResponse::Created().json(EventResponse::from(event)))
}

/// DELETE /events/{id} (admin)
pub async fn delete_event(
    db: web::Data<DatabaseConnection>,
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;
    ensure_admin(&user)?;

    let event_id = path.into_inner();
    let event = event::Entity::find_by_id(event_id)
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Event not found"))?;

    delete_event_cascade(db.as_ref(), event_id).await.map_err(|e| {
        log::error!("Failed to delete event {}: {}", event_id, e);
        actix_web::error::ErrorInternalServerError("Failed to delete event")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Deleted {}", event.title)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn test_event_sort_allow_list() {
        assert!(matches!(
            parse_event_sort(Some("-event_date")),
            Some((event::Column::EventDate, Order::Desc))
        ));
        assert!(matches!(
            parse_event_sort(Some("severity")),
            Some((event::Column::Severity, Order::Asc))
        ));
        assert!(parse_event_sort(Some("title")).is_none());
        assert!(parse_event_sort(None).is_none());
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2023).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_pollution_report_pins_event_type() {
        // A client-supplied event_type is not part of the request shape and
        // is dropped during deserialization.
        let payload: PollutionReportRequest = serde_json::from_value(serde_json::json!({
            "reef_id": Uuid::new_v4(),
            "title": "Oil slick",
            "description": "Visible sheen near the north mooring",
            "severity": "high",
            "event_date": "2024-05-12",
            "event_type": "damage"
        }))
        .unwrap();

        let model = pollution_event(&payload, Severity::High, Uuid::new_v4());
        assert!(matches!(
            model.event_type,
            ActiveValue::Set(EventType::Pollution)
        ));
        assert!(matches!(model.severity, ActiveValue::Set(Severity::High)));
        assert!(matches!(model.resolved, ActiveValue::Set(false)));
    }

    #[test]
    fn test_sighting_pins_type_and_severity() {
        let payload = CoralSightingRequest {
            reef_id: Uuid::new_v4(),
            title: "Staghorn regrowth".to_string(),
            description: "New colonies on the east slope".to_string(),
            event_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            notes: None,
        };

        let model = sighting_event(&payload, Uuid::new_v4());
        assert!(matches!(
            model.event_type,
            ActiveValue::Set(EventType::Sighting)
        ));
        assert!(matches!(model.severity, ActiveValue::Set(Severity::Low)));
    }
}

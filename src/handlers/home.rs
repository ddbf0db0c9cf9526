use actix_web::{web, HttpResponse, Responder};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

use crate::models::{article, event, reef};

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub featured_articles: Vec<super::articles::ArticleResponse>,
    pub recent_events: Vec<super::events::EventResponse>,
    pub reef_count: u64,
    pub event_count: u64,
}

/// GET /home
/// Landing-page content: featured articles, recent events, totals.
pub async fn get_home(
    db: web::Data<DatabaseConnection>,
) -> Result<impl Responder, actix_web::Error> {
    let featured_articles = article::Entity::find()
        .filter(article::Column::Published.eq(true))
        .filter(article::Column::Featured.eq(true))
        .order_by_desc(article::Column::CreatedAt)
        .limit(3)
        .all(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    let recent_events = event::Entity::find()
        .order_by_desc(event::Column::EventDate)
        .order_by_desc(event::Column::CreatedAt)
        .limit(5)
        .find_also_related(reef::Entity)
        .all(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    let reef_count = reef::Entity::find().count(db.as_ref()).await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let event_count = event::Entity::find().count(db.as_ref()).await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(HomeResponse {
        featured_articles: featured_articles
            .into_iter()
            .map(super::articles::ArticleResponse::from)
            .collect(),
        recent_events: recent_events
            .into_iter()
            .map(|(event, reef)| {
                let mut response = super::events::EventResponse::from(event);
                response.reef_name = reef.map(|r| r.name);
                response
            })
            .collect(),
        reef_count,
        event_count,
    }))
}

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{current_user, ensure_contributor, match_nothing, page_number, ErrorResponse};
use crate::models::article::{self, ArticleCategory};
use crate::utils::auth::Claims;
use crate::utils::validators::{escape_like, validate_slug};

const ARTICLE_PAGE_SIZE: u64 = 10;
const MAX_EXCERPT_CHARS: usize = 300;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize)]
pub struct ArticleListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub content: String,
    pub excerpt: String,
    pub author: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<article::Model> for ArticleResponse {
    fn from(model: article::Model) -> Self {
        Self {
            id: model.id.to_string(),
            title: model.title,
            slug: model.slug,
            category: model.category.as_str().to_string(),
            content: model.content,
            excerpt: model.excerpt,
            author: model.author.map(|id| id.to_string()),
            published: model.published,
            featured: model.featured,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub slug: String,
    pub category: String,
    pub content: String,
    pub excerpt: String,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

// ============ Filtering/sorting ============

fn parse_article_sort(sort: Option<&str>) -> Option<(article::Column, Order)> {
    match sort.unwrap_or_default() {
        "title" => Some((article::Column::Title, Order::Asc)),
        "-title" => Some((article::Column::Title, Order::Desc)),
        "created_at" => Some((article::Column::CreatedAt, Order::Asc)),
        "-created_at" => Some((article::Column::CreatedAt, Order::Desc)),
        _ => None,
    }
}

fn article_filter_condition(query: &ArticleListQuery) -> Condition {
    // Listings only ever show published articles.
    let mut condition = Condition::all().add(article::Column::Published.eq(true));

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(
            Condition::any()
                .add(Expr::col(article::Column::Title).ilike(pattern.clone()))
                .add(Expr::col(article::Column::Content).ilike(pattern.clone()))
                .add(Expr::col(article::Column::Excerpt).ilike(pattern)),
        );
    }

    if let Some(category) = query.category.as_deref().filter(|s| !s.is_empty()) {
        condition = match ArticleCategory::parse(category) {
            Some(category) => condition.add(article::Column::Category.eq(category)),
            None => condition.add(match_nothing()),
        };
    }

    condition
}

// ============ Handlers ============

/// GET /articles
/// Published articles with search, category filter, and sorting.
pub async fn list_articles(
    db: web::Data<DatabaseConnection>,
    query: web::Query<ArticleListQuery>,
) -> Result<impl Responder, actix_web::Error> {
    let mut select = article::Entity::find().filter(article_filter_condition(&query));
    select = match parse_article_sort(query.sort.as_deref()) {
        Some((column, order)) => select.order_by(column, order),
        None => select.order_by_desc(article::Column::CreatedAt),
    };

    let paginator = select.paginate(db.as_ref(), ARTICLE_PAGE_SIZE);
    let counts = paginator.num_items_and_pages().await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let page = page_number(query.page);
    let articles = paginator.fetch_page(page - 1).await.map_err(|e| {
        log::error!("Database error: {}", e);
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(ArticleListResponse {
        articles: articles.into_iter().map(ArticleResponse::from).collect(),
        total: counts.number_of_items,
        page,
        total_pages: counts.number_of_pages,
    }))
}

/// GET /articles/{slug}
/// Unpublished articles are invisible here, even by exact slug.
pub async fn get_article(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<impl Responder, actix_web::Error> {
    let slug = path.into_inner();

    let article = article::Entity::find()
        .filter(article::Column::Slug.eq(&slug))
        .filter(article::Column::Published.eq(true))
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Article not found"))?;

    Ok(HttpResponse::Ok().json(ArticleResponse::from(article)))
}

/// POST /articles (researcher/admin)
pub async fn create_article(
    db: web::Data<DatabaseConnection>,
    claims: web::ReqData<Claims>,
    payload: web::Json<CreateArticleRequest>,
) -> Result<impl Responder, actix_web::Error> {
    let user = current_user(&db, &claims).await?;
    ensure_contributor(&user)?;

    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Ok(
            HttpResponse::BadRequest().json(ErrorResponse::new("Title and content are required"))
        );
    }

    if let Err(e) = validate_slug(&payload.slug) {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())));
    }

    if payload.excerpt.chars().count() > MAX_EXCERPT_CHARS {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(format!(
            "Excerpt must be at most {} characters",
            MAX_EXCERPT_CHARS
        ))));
    }

    let category = match ArticleCategory::parse(&payload.category) {
        Some(category) => category,
        None => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(format!(
                "Invalid category '{}'",
                payload.category
            ))));
        }
    };

    // Slug is globally unique; the unique index backs this check up.
    let existing = article::Entity::find()
        .filter(article::Column::Slug.eq(&payload.slug))
        .one(db.as_ref())
        .await
        .map_err(|e| {
            log::error!("Database error: {}", e);
            actix_web::error::ErrorInternalServerError("Database error")
        })?;

    if existing.is_some() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(format!(
            "Slug '{}' is already in use",
            payload.slug
        ))));
    }

    let new_article = article::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.clone()),
        slug: Set(payload.slug.clone()),
        category: Set(category),
        content: Set(payload.content.clone()),
        excerpt: Set(payload.excerpt.clone()),
        author: Set(Some(user.id)),
        published: Set(payload.published.unwrap_or(false)),
        featured: Set(payload.featured.unwrap_or(false)),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    };

    let article = new_article.insert(db.as_ref()).await.map_err(|e| {
        log::error!("Failed to create article: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to create article")
    })?;

    log::info!("📰 Article '{}' created by '{}'", article.title, user.username);

    Ok(HttpResponse::Created().json(ArticleResponse::from(article)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_sort_allow_list() {
        assert!(matches!(
            parse_article_sort(Some("title")),
            Some((article::Column::Title, Order::Asc))
        ));
        assert!(matches!(
            parse_article_sort(Some("-created_at")),
            Some((article::Column::CreatedAt, Order::Desc))
        ));
        assert!(parse_article_sort(Some("slug")).is_none());
        assert!(parse_article_sort(None).is_none());
    }
}

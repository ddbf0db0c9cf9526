use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ErrorResponse;
use crate::models::user::{self, UserRole};
use crate::utils::auth::{create_jwt, hash_password, verify_password};
use crate::utils::config::Config;
use crate::utils::validators::validate_username;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
    pub organization: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
}

pub async fn register(
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    log::info!("📝 Registration attempt for username: {}", req.username);

    if !config.allow_registration {
        log::warn!("❌ Registration attempt rejected - registration is disabled");
        return HttpResponse::Forbidden().json(ErrorResponse::new(
            "Registration is currently disabled",
        ));
    }

    if let Err(e) = validate_username(&req.username) {
        return HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string()));
    }

    if !req.email.contains('@') {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Invalid email address"));
    }

    if req.password.len() < 8 {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Password must be at least 8 characters",
        ));
    }

    // Role defaults to student; anything outside the three choices is rejected.
    let role = match req.role.as_deref() {
        None | Some("") => UserRole::Student,
        Some(value) => match UserRole::parse(value) {
            Some(role) => role,
            None => {
                return HttpResponse::BadRequest().json(ErrorResponse::new(format!(
                    "Invalid role '{}'. Choices: admin, researcher, student",
                    value
                )));
            }
        },
    };

    let existing_user = user::Entity::find()
        .filter(user::Column::Username.eq(&req.username))
        .one(db.get_ref())
        .await;

    match existing_user {
        Ok(Some(_)) => {
            log::warn!(
                "❌ Registration failed - username '{}' already exists",
                req.username
            );
            return HttpResponse::BadRequest()
                .json(ErrorResponse::new("Username already exists"));
        }
        Err(e) => {
            log::error!("❌ Database error during registration: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Database error"));
        }
        _ => {}
    }

    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(e) => {
            log::error!("❌ Failed to hash password: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to hash password"));
        }
    };

    log::info!("💾 Creating user '{}'...", req.username);
    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(req.username.clone()),
        password_hash: Set(password_hash),
        email: Set(req.email.clone()),
        first_name: Set(req.first_name.clone()),
        last_name: Set(req.last_name.clone()),
        role: Set(role),
        bio: Set(req.bio.clone().unwrap_or_default()),
        organization: Set(req.organization.clone().unwrap_or_default()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    };

    match new_user.insert(db.get_ref()).await {
        Ok(user) => {
            log::info!(
                "✅ User '{}' created successfully (ID: {}, role: {})",
                user.username,
                user.id,
                user.role.as_str()
            );

            let token = match create_jwt(user.id, &config.jwt_secret, config.jwt_expiration_hours)
            {
                Ok(t) => t,
                Err(e) => {
                    log::error!("❌ Failed to generate token: {}", e);
                    return HttpResponse::InternalServerError()
                        .json(ErrorResponse::new("Failed to generate token"));
                }
            };

            log::info!("🎫 JWT token generated for user '{}'", user.username);

            HttpResponse::Created().json(AuthResponse {
                token,
                user_id: user.id.to_string(),
                username: user.username,
                role: user.role.as_str().to_string(),
            })
        }
        Err(e) => {
            log::error!("❌ Failed to create user: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to create user"))
        }
    }
}

pub async fn login(
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    log::info!("🔐 Login attempt for username: {}", req.username);

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(&req.username))
        .one(db.get_ref())
        .await;

    match user {
        Ok(Some(user)) => match verify_password(&req.password, &user.password_hash) {
            Ok(true) => {
                let token =
                    match create_jwt(user.id, &config.jwt_secret, config.jwt_expiration_hours) {
                        Ok(t) => t,
                        Err(e) => {
                            log::error!("❌ Failed to generate token: {}", e);
                            return HttpResponse::InternalServerError()
                                .json(ErrorResponse::new("Failed to generate token"));
                        }
                    };

                log::info!("✅ Login succeeded for user '{}'", req.username);

                HttpResponse::Ok().json(AuthResponse {
                    token,
                    user_id: user.id.to_string(),
                    username: user.username,
                    role: user.role.as_str().to_string(),
                })
            }
            Ok(false) => {
                log::warn!("❌ Invalid password for user '{}'", req.username);
                HttpResponse::Unauthorized().json(ErrorResponse::new("Invalid credentials"))
            }
            Err(e) => {
                log::error!("❌ Failed to verify password: {}", e);
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::new("Failed to verify password"))
            }
        },
        Ok(None) => {
            log::warn!("❌ User '{}' not found", req.username);
            HttpResponse::Unauthorized().json(ErrorResponse::new("Invalid credentials"))
        }
        Err(e) => {
            log::error!("❌ Database error during login: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Database error"))
        }
    }
}

mod handlers;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use services::session_state::SessionStore;
use utils::{config::Config, db::establish_connection};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file FIRST before anything else
    dotenv::dotenv().ok();

    // Initialize logger with default level if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================================");
    println!("🪸 ReefGuard Backend Server");
    println!("=================================================");

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    let host = config.host.clone();
    let port = config.port;

    println!("📝 Configuration loaded:");
    println!(
        "   - Database: {}",
        config.database_url.split('@').last().unwrap_or("***")
    );
    println!("   - Host: {}", host);
    println!("   - Port: {}", port);
    println!("   - Media root: {}", config.media_root);
    println!(
        "   - Registration: {}",
        if config.allow_registration {
            "ENABLED"
        } else {
            "DISABLED"
        }
    );
    println!(
        "   - Log level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    );

    // Establish database connection
    print!("🔌 Connecting to database... ");
    let db = establish_connection(&config.database_url)
        .await
        .expect("Failed to connect to database");
    println!("✅ Connected!");

    log::info!("Database connection established");

    // Per-visitor session state (last filters, recently viewed reefs)
    let sessions = SessionStore::new();

    // Start HTTP server
    println!("🌐 Starting HTTP server at http://{}:{}", host, port);
    println!("📍 Available endpoints:");
    println!("   - POST http://{}:{}/auth/register", host, port);
    println!("   - POST http://{}:{}/auth/login", host, port);
    println!("   - GET  http://{}:{}/home", host, port);
    println!("   - GET  http://{}:{}/reefs", host, port);
    println!("   - GET  http://{}:{}/events", host, port);
    println!("   - GET  http://{}:{}/articles", host, port);
    println!("   - GET  http://{}:{}/gallery", host, port);
    println!(
        "   - POST http://{}:{}/events/report (JWT required)",
        host, port
    );
    println!(
        "   - POST http://{}:{}/events/sighting (JWT required)",
        host, port
    );
    println!(
        "   - GET  http://{}:{}/bookmarks (JWT required)",
        host, port
    );
    println!("=================================================");

    log::info!("Server started at http://{}:{}", host, port);

    let media_root = config.media_root.clone();

    HttpServer::new(move || {
        // Strict CORS for the JSON API; cookies carry the session id
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin(&config.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .wrap(Logger::default())
            .wrap(cors) // CORS must be wrapped AFTER Logger to ensure headers are added to all responses
            // Public endpoints (no authentication required)
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login)),
            )
            .route("/home", web::get().to(handlers::home::get_home))
            // Reefs: public browsing, authenticated mutation
            .service(
                web::scope("/reefs")
                    .route("", web::get().to(handlers::reefs::list_reefs))
                    .route(
                        "",
                        web::post()
                            .to(handlers::reefs::create_reef)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    )
                    .route(
                        "/{id}/bookmark",
                        web::post()
                            .to(handlers::bookmarks::toggle_bookmark)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    )
                    .route("/{id}", web::get().to(handlers::reefs::get_reef))
                    .route(
                        "/{id}",
                        web::delete()
                            .to(handlers::reefs::delete_reef)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    ),
            )
            // Events: public browsing; report/sighting submission is login-gated
            .service(
                web::scope("/events")
                    .route("", web::get().to(handlers::events::list_events))
                    .route(
                        "/report",
                        web::post()
                            .to(handlers::events::create_pollution_report)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    )
                    .route(
                        "/sighting",
                        web::post()
                            .to(handlers::events::create_coral_sighting)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    )
                    .route("/{id}", web::get().to(handlers::events::get_event))
                    .route(
                        "/{id}",
                        web::delete()
                            .to(handlers::events::delete_event)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    ),
            )
            // Published articles are public; authoring is login-gated
            .service(
                web::scope("/articles")
                    .route("", web::get().to(handlers::articles::list_articles))
                    .route(
                        "",
                        web::post()
                            .to(handlers::articles::create_article)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    )
                    .route("/{slug}", web::get().to(handlers::articles::get_article)),
            )
            // Media gallery
            .service(
                web::scope("/gallery")
                    .route("", web::get().to(handlers::gallery::list_gallery))
                    .route(
                        "",
                        web::post()
                            .to(handlers::gallery::upload_media)
                            .wrap(crate::middleware::auth::JwtMiddleware),
                    ),
            )
            // Bookmarks (JWT required)
            .service(
                web::scope("/bookmarks")
                    .wrap(crate::middleware::auth::JwtMiddleware)
                    .route("", web::get().to(handlers::bookmarks::list_bookmarks)),
            )
            // Uploaded media files
            .service(actix_files::Files::new("/media", media_root.clone()))
    })
    .bind((host, port))?
    .run()
    .await
}

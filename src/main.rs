use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, Router},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use crate::{
    config::Config,
    services::{
        AnalyticsService, AuthService, BookmarkService, CommentService, Database, FollowService,
        LikeService, NotificationDispatcher, NotificationService, PoemService, QueueTransport,
        RedisQueue, TagService, UserService,
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "linger_server=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Linger service...");

    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let db = Arc::new(match Database::new(&config).await {
        Ok(db) => {
            db.verify_connection().await?;
            info!("Database connection established successfully");
            db
        }
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(anyhow::anyhow!("Database initialization failed"));
        }
    });

    // A broken broker must not keep the service from starting: queueing is
    // disabled and notifications persist directly.
    let queue = Arc::new(RedisQueue::new(
        &config.redis_url,
        &config.notification_queue_name,
    ));
    let queue_enabled = if config.notification_queue_enabled {
        match queue.connect().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Queue connection failed, falling back to direct persistence: {}", e);
                false
            }
        }
    } else {
        info!("Notification queueing disabled by configuration");
        false
    };

    let dispatcher = NotificationDispatcher::new(db.clone(), queue.clone(), queue_enabled);
    if queue_enabled {
        dispatcher.start_consumer();
    }

    let auth_service = AuthService::new(&config).await?;
    let user_service = UserService::new(db.clone()).await?;
    let poem_service = PoemService::new(db.clone(), user_service.clone()).await?;
    let notification_service = NotificationService::new(db.clone(), dispatcher).await?;
    let comment_service = CommentService::new(
        db.clone(),
        poem_service.clone(),
        user_service.clone(),
        notification_service.clone(),
    )
    .await?;
    let like_service = LikeService::new(
        db.clone(),
        poem_service.clone(),
        user_service.clone(),
        notification_service.clone(),
    )
    .await?;
    let bookmark_service = BookmarkService::new(
        db.clone(),
        poem_service.clone(),
        user_service.clone(),
        notification_service.clone(),
    )
    .await?;
    let follow_service = FollowService::new(
        db.clone(),
        user_service.clone(),
        notification_service.clone(),
    )
    .await?;
    let tag_service = TagService::new(db.clone()).await?;
    let analytics_service =
        AnalyticsService::new(poem_service.clone(), tag_service.clone()).await?;

    let app_state = Arc::new(AppState {
        config: config.clone(),
        db,
        auth_service,
        user_service,
        poem_service,
        comment_service,
        like_service,
        bookmark_service,
        follow_service,
        tag_service,
        notification_service,
        analytics_service,
    });

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_origin(
            config
                .cors_allowed_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        );

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/poems", routes::poems::router())
        .nest("/api/comments", routes::comments::router())
        .nest("/api/likes", routes::likes::router())
        .nest("/api/bookmarks", routes::bookmarks::router())
        .nest("/api/follows", routes::follows::router())
        .nest("/api/notifications", routes::notifications::router())
        .nest("/api/tags", routes::tags::router())
        .nest("/api/analytics", routes::analytics::router())
        .nest("/api/users", routes::users::router())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            utils::middleware::rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            utils::middleware::auth_middleware,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "Linger is running!"
}

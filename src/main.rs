use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    routing::{get, post},
};
use pulse_backend::{
    AppState,
    config::Config,
    middleware::{auth_middleware, log_errors},
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'pulse_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState {
        pool,
        config: config.clone(),
    };

    let public_routes = Router::new()
        .route("/ping", get(routes::ping::ping))
        .route("/countries", get(routes::country::handler::list_countries))
        .route(
            "/countries/{alpha2}",
            get(routes::country::handler::get_country),
        )
        .route("/auth/register", post(routes::user::handler::register))
        .route("/auth/sign-in", post(routes::user::handler::sign_in));

    let protected_routes = Router::new()
        .route(
            "/me/profile",
            get(routes::user::handler::get_profile).patch(routes::user::handler::update_profile),
        )
        .route(
            "/me/updatePassword",
            post(routes::user::handler::update_password),
        )
        .route("/friends/add", post(routes::friend::handler::add_friend))
        .route(
            "/friends/remove",
            post(routes::friend::handler::remove_friend),
        )
        .route("/friends", get(routes::friend::handler::list_friends))
        .route("/posts/new", post(routes::post::handler::create_post))
        .route("/posts/feed/my", get(routes::post::handler::feed_my))
        .route("/posts/feed/{login}", get(routes::post::handler::feed_user))
        .route("/posts/{post_id}", get(routes::post::handler::get_post))
        .route(
            "/profiles/{login}",
            get(routes::profile::handler::get_profile),
        )
        // Authentication resolves before any protected handler runs.
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new().nest(
        "/api",
        Router::new().merge(public_routes).merge(protected_routes),
    );

    let router = router.layer(axum::middleware::from_fn(log_errors));

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}

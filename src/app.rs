/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config → dependencies → Router
 * - Middleware (HTTP, CORS, security headers)
 * - axum::serve() with graceful shutdown
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,token_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        // Development: crash the whole process. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    // A missing or broken secret stops the process here, before any request is served.
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting token gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = AppState::from_config(&config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

pub(crate) fn build_router(state: AppState, config: &Config) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .fallback(|| async { AppError::NotFound })
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn app_with_secret(secret: &str) -> Router {
        let vars = HashMap::from([("JWT_SECRET".to_string(), secret.to_string())]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        build_router(AppState::from_config(&config), &config)
    }

    fn sign(secret: &str, claims: &Value) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn get_me(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/api/v1/users/me");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn rejected() -> Value {
        json!({ "message": "Invalid or expired token" })
    }

    #[tokio::test]
    async fn absent_cookie_is_unauthorized() {
        let (status, body) = send(app_with_secret("abc"), get_me(None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, rejected());
    }

    #[tokio::test]
    async fn valid_cookie_echoes_the_claims() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = sign("abc", &json!({ "id": 1, "role": "tutor", "exp": exp }));

        let (status, body) = send(
            app_with_secret("abc"),
            get_me(Some(&format!("token={token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "User fetched successfully",
                "decoded": { "id": 1, "role": "tutor", "exp": exp },
            })
        );
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_unauthorized() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = sign("abc", &json!({ "id": 1, "role": "tutor", "exp": exp }));

        let (status, body) = send(
            app_with_secret("xyz"),
            get_me(Some(&format!("token={token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, rejected());
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let exp = chrono::Utc::now().timestamp() - 60;
        let token = sign("abc", &json!({ "id": 1, "role": "tutor", "exp": exp }));

        let (status, body) = send(
            app_with_secret("abc"),
            get_me(Some(&format!("token={token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, rejected());
    }

    #[tokio::test]
    async fn same_request_twice_gives_same_outcome() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let cookie = format!("token={}", sign("abc", &json!({ "id": 3, "exp": exp })));
        let app = app_with_secret("abc");

        let first = send(app.clone(), get_me(Some(&cookie))).await;
        let second = send(app, get_me(Some(&cookie))).await;

        assert_eq!(first, second);
        assert_eq!(first.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_needs_no_credential() {
        let req = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app_with_secret("abc"), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let req = Request::builder()
            .uri("/api/v1/nope")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app_with_secret("abc"), req).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Not found" }));
    }

    #[tokio::test]
    async fn responses_are_not_cacheable_and_carry_a_request_id() {
        let response = app_with_secret("abc").oneshot(get_me(None)).await.unwrap();

        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn development_cors_echoes_origin_with_credentials() {
        let req = Request::builder()
            .uri("/api/v1/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();

        let response = app_with_secret("abc").oneshot(req).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }
}

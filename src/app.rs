use std::net::SocketAddr;

use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::{auth, stats};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(stats::router())
        .route("/", get(index))
        .route("/health", get(health))
        .route("/test_db", get(test_db))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let request_id = req
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = %request_id,
                        status = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        // Request ids tag log spans only; they are not echoed to clients.
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn index() -> &'static str {
    "You've reached the resistance."
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn test_db(State(state): State<AppState>) -> ApiResult<&'static str> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .context("database ping")?;
    Ok("ok")
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    async fn get_path(uri: &str) -> axum::http::Response<Body> {
        build_app(AppState::fake())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn index_and_health_are_public() {
        let res = get_path("/").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"You've reached the resistance.");

        let res = get_path("/health").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn request_ids_stay_server_side() {
        let res = get_path("/health").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get("x-request-id").is_none());
    }

    #[tokio::test]
    async fn protected_routes_are_mounted() {
        let res = get_path("/user_authenticated").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let res = get_path("/get_user_stats").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

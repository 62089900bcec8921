use std::net::SocketAddr;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;
use crate::{auth, catalog};

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/", get(|| async { "Skill Sphere Backend is running" }))
        .route("/api/test", get(test_route))
        .merge(auth::router())
        .merge(catalog::router())
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
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
}

async fn test_route() -> Json<Value> {
    Json(json!({ "message": "Hello from backend!" }))
}

/// Single allowed origin with credentials. Other origins get no
/// `access-control-allow-origin` header; an origin that is not a valid
/// header value allows no cross-origin callers at all.
fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(v) => AllowOrigin::list([v]),
        Err(e) => {
            tracing::warn!(error = %e, origin, "invalid CORS origin; cross-origin requests disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

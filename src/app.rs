use std::net::SocketAddr;

use axum::{error_handling::HandleErrorLayer, routing::get, BoxError, Router};
use tower::{
    timeout::{error::Elapsed, TimeoutLayer},
    ServiceBuilder,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;
use crate::{auth, products};

pub fn build_app(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(products::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

/// A request that outlives the timeout was stuck on storage; report it the
/// same way as any other storage failure.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("request timed out");
        ApiError::internal(anyhow::anyhow!("request timed out"))
    } else {
        ApiError::internal(anyhow::anyhow!("middleware error: {err}"))
    }
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::{send, test_app, InMemoryUsers};
    use axum::{body::Body, http::{Request, StatusCode}};
    use std::sync::Arc;

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = test_app(Arc::new(InMemoryUsers::default()));
        let req = Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap();
        let res = send(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn routes_live_under_the_api_prefix() {
        let (app, _) = test_app(Arc::new(InMemoryUsers::default()));
        let req = Request::builder().uri("/products").body(Body::empty()).unwrap();
        assert_eq!(send(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn products_reject_post() {
        let (app, _) = test_app(Arc::new(InMemoryUsers::default()));
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/products")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, req).await.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

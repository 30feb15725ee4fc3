use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use vellum_collate::Collator;

use crate::error::ErrorDetail;
use crate::handler::{self, AppState};

/// Build the axum router with all Vellum endpoints.
pub fn build_router(collator: Collator) -> Router {
    let state = AppState { collator };

    Router::new()
        .route("/health", get(handler::health_handler))
        .route(
            "/artifacts",
            get(handler::list_artifacts).fallback(handler::method_not_allowed),
        )
        .route(
            "/artifacts/:key",
            get(handler::show_artifact)
                .put(handler::store_artifact)
                .delete(handler::remove_artifact)
                .fallback(handler::method_not_allowed),
        )
        .route(
            "/collation",
            get(handler::collate_artifacts).fallback(handler::method_not_allowed),
        )
        .fallback(handler::not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_failures))
        .layer(TraceLayer::new_for_http())
}

/// Log server-side failures with the request line that caused them.
async fn log_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    if let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>() {
        tracing::error!(%method, %uri, error = %detail, "request failed");
    }
    response
}

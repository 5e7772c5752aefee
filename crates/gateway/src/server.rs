use {
    axum::{
        Router,
        response::{IntoResponse, Json},
        routing::get,
    },
    tracing::info,
};

/// Fixed confirmation string returned on the root route.
const LIVENESS_BANNER: &str = "pictor is active now";

/// Build the liveness router (shared between startup and tests).
pub fn build_app() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

/// Bind and serve until the process exits.
pub async fn serve(bind: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "liveness server listening");
    axum::serve(listener, build_app()).await?;
    Ok(())
}

async fn root_handler() -> &'static str {
    LIVENESS_BANNER
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {
        axum::{
            body::{Body, to_bytes},
            http::{Request, StatusCode},
        },
        tower::ServiceExt,
    };

    use super::*;

    #[tokio::test]
    async fn root_returns_the_fixed_confirmation_string() {
        let response = build_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], LIVENESS_BANNER.as_bytes());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = build_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
    }
}

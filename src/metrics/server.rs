use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use prometheus::{Encoder, Registry, TextEncoder};

// ============================================================================
// Scrape Endpoints
// ============================================================================

/// Mount `/metrics` and `/health`. Expects an `Arc<Registry>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(scrape))
        .route("/health", web::get().to(health));
}

/// Serve the storefront registry on `port`.
/// Blocks its runtime until the server stops, so give it a dedicated thread.
pub async fn serve_metrics(registry: Arc<Registry>, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(registry);
    tracing::info!(port, "Serving storefront metrics");

    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

async fn scrape(registry: web::Data<Arc<Registry>>) -> HttpResponse {
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&registry.gather()) {
        Ok(body) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Metrics scrape failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "framing-storefront",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

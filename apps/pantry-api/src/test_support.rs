//! Shared fixtures for the API tests: a fake product database on an
//! ephemeral port.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde_json::json;

/// Number of requests the fake upstream has received.
#[derive(Debug, Clone, Default)]
pub struct UpstreamHits(Arc<AtomicUsize>);

impl UpstreamHits {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fake product database.
///
/// - `3017620422003`: Nutella by Ferrero, 539 kcal
/// - `20202020`: a product whose name is 201 characters long
/// - `99999999`: 503
/// - anything else: `{"status": 0}`
async fn product_doc(
    State(hits): State<UpstreamHits>,
    Path(file): Path<String>,
) -> (StatusCode, String) {
    hits.0.fetch_add(1, Ordering::SeqCst);

    let barcode = file.trim_end_matches(".json");
    let body = match barcode {
        "3017620422003" => json!({
            "code": barcode,
            "status": 1,
            "product": {
                "product_name": "Nutella",
                "brands": "Ferrero",
                "categories": "Spreads, Sweet spreads, Hazelnut spreads",
                "nutriments": {
                    "energy-kcal_100g": 539,
                    "proteins_100g": 6.3,
                    "fat_100g": 30.9,
                    "carbohydrates_100g": 57.5,
                    "sugars_100g": 56.3,
                    "fiber_100g": 0
                },
                "labels_tags": ["en:gluten-free", "en:green-dot"],
                "allergens_tags": ["en:milk", "en:nuts", "en:soybeans"],
                "image_front_url": "https://images.example/nutella.jpg"
            }
        }),
        "20202020" => json!({
            "code": barcode,
            "status": 1,
            "product": { "product_name": "X".repeat(201), "brands": "Verbose Foods" }
        }),
        "99999999" => return (StatusCode::SERVICE_UNAVAILABLE, String::new()),
        _ => json!({ "code": barcode, "status": 0, "status_verbose": "product not found" }),
    };

    (StatusCode::OK, body.to_string())
}

/// Starts the fake upstream and returns its base URL and hit counter.
pub async fn spawn_upstream() -> (String, UpstreamHits) {
    let hits = UpstreamHits::default();
    let router = Router::new()
        .route("/api/v2/product/{file}", get(product_doc))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

/// Starts the full API against an in-memory database and the fake
/// upstream. Returns the API base URL, the upstream hit counter and the
/// shared state.
pub async fn spawn_app() -> (String, UpstreamHits, crate::SharedState) {
    let (upstream, hits) = spawn_upstream().await;

    let config = crate::ApiConfig::from_lookup(|key| match key {
        "PANTRY_BIND_ADDR" => Some("127.0.0.1:0".to_string()),
        "PANTRY_PRODUCT_API_URL" => Some(upstream.clone()),
        _ => None,
    })
    .unwrap();

    let db = pantry_db::Database::new(pantry_db::DbConfig::in_memory())
        .await
        .unwrap();
    let source = pantry_lookup::ProductSource::new(config.source_config()).unwrap();
    let state = Arc::new(crate::AppState::new(db, source, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = crate::router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits, state)
}

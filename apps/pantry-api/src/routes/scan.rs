//! `POST /api/scan`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::routes::ApiResponse;
use crate::scan::ScanRequest;
use crate::SharedState;

/// Looks up a barcode and, depending on `action`, stores it.
///
/// ## Request
/// ```json
/// { "barcode": "3017620422003", "action": "scan_and_save" }
/// ```
///
/// ## Response
/// ```json
/// {
///   "success": true,
///   "data": { "barcode": "3017620422003", "name": "Nutella", "calories": 539.0,
///             "id": "…", "quantity": 1, "created_at": "…" },
///   "message": "Product scanned and saved to inventory"
/// }
/// ```
pub async fn scan(
    State(state): State<SharedState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let Json(request) = payload?;
    debug!(barcode = %request.barcode, action = %request.action, "Scan requested");

    let outcome = state.scanner.handle(request).await?;

    let data = serde_json::to_value(outcome.data())
        .map_err(|e| ApiError::internal(format!("Failed to encode product: {}", e)))?;

    Ok(Json(ApiResponse::ok(data).with_message(outcome.message())))
}

#[cfg(test)]
mod tests {
    use crate::test_support::spawn_app;
    use serde_json::{json, Value};

    async fn post_scan(base: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/api/scan", base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_scan_and_save_nutella() {
        let (base, _, state) = spawn_app().await;

        let (status, body) = post_scan(
            &base,
            json!({ "barcode": "3017620422003", "action": "scan_and_save" }),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Nutella");
        assert_eq!(body["data"]["brand"], "Ferrero");
        assert_eq!(body["data"]["calories"].as_f64(), Some(539.0));
        assert_eq!(body["data"]["fiber"].as_f64(), Some(0.0));
        assert_eq!(body["data"]["labels"], json!(["gluten free"]));
        assert!(body["data"]["id"].is_string());
        assert_eq!(state.db.foods().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_scan_defaults_to_lookup_only() {
        let (base, hits, state) = spawn_app().await;

        let (status, body) = post_scan(&base, json!({ "barcode": "3017620422003" })).await;

        assert_eq!(status, 200);
        assert!(body["data"].get("id").is_none());
        assert_eq!(hits.count(), 1);
        assert_eq!(state.db.foods().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bad_barcode() {
        let (base, hits, _) = spawn_app().await;

        let (status, body) = post_scan(&base, json!({ "barcode": "12345" })).await;

        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "BAD_BARCODE");
        assert_eq!(hits.count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (base, _, state) = spawn_app().await;

        let (status, body) = post_scan(
            &base,
            json!({ "barcode": "00000000", "action": "scan_and_save" }),
        )
        .await;

        assert_eq!(status, 404);
        assert_eq!(body["error"], "PRODUCT_NOT_FOUND");
        assert_eq!(state.db.foods().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upstream_unavailable() {
        let (base, _, _) = spawn_app().await;

        let (status, body) = post_scan(&base, json!({ "barcode": "99999999" })).await;

        assert_eq!(status, 500);
        assert_eq!(body["error"], "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_persistence_error_returns_product() {
        let (base, _, state) = spawn_app().await;
        state.db.close().await;

        let (status, body) = post_scan(
            &base,
            json!({ "barcode": "3017620422003", "action": "scan_and_save" }),
        )
        .await;

        assert_eq!(status, 500);
        assert_eq!(body["error"], "PERSISTENCE_ERROR");
        assert_eq!(body["data"]["name"], "Nutella");
    }

    #[tokio::test]
    async fn test_malformed_requests() {
        let (base, _, _) = spawn_app().await;

        let (status, body) = post_scan(&base, json!({ "barcode": "12345678", "action": "delete" })).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "BAD_REQUEST");

        let (status, body) = post_scan(&base, json!({ "action": "scan" })).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "BAD_REQUEST");
    }
}

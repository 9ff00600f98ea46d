//! # Product Source
//!
//! HTTP client for the external product database.
//!
//! ## Response Envelope
//! ```text
//! {
//!   "code": "3017620422003",
//!   "status": 1,                ← 1 = found, anything else = miss
//!   "product": { ... }          ← deserialized as ExternalProduct
//! }
//! ```
//!
//! Every product field is optional. Missing or oddly-shaped nutrient
//! entries are left to the normalizer.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::error::{LookupError, LookupResult};
use pantry_core::ExternalProduct;

/// Body of `GET /api/v2/product/{barcode}.json`.
#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    product: Option<ExternalProduct>,
}

/// Client for an Open Food Facts compatible product database.
///
/// Holds configuration and a connection-pooling `reqwest::Client`; cheap to
/// clone and safe to share between requests.
#[derive(Debug, Clone)]
pub struct ProductSource {
    config: SourceConfig,
    http: reqwest::Client,
}

impl ProductSource {
    /// Builds a source from configuration.
    pub fn new(config: SourceConfig) -> LookupResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LookupError::Unavailable(format!("client setup failed: {}", e)))?;

        Ok(ProductSource { config, http })
    }

    /// Returns the configuration this source was built with.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Fetches the raw product for a barcode.
    ///
    /// The barcode is expected to be validated already; it is placed in
    /// the URL path as-is.
    pub async fn lookup(&self, barcode: &str) -> LookupResult<ExternalProduct> {
        let url = self.config.product_url(barcode);
        debug!(barcode = %barcode, url = %url, "Looking up product");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(barcode = %barcode, "Product database returned 404");
            return Err(LookupError::NotFound {
                barcode: barcode.to_string(),
            });
        }
        if !status.is_success() {
            warn!(barcode = %barcode, status = %status, "Product database error status");
            return Err(LookupError::Unavailable(format!("HTTP {}", status)));
        }

        let envelope: ProductEnvelope = response.json().await.map_err(|e| {
            if e.is_decode() {
                warn!(barcode = %barcode, error = %e, "Undecodable product document");
                LookupError::InvalidResponse(e.to_string())
            } else {
                self.transport_error(e)
            }
        })?;

        match envelope {
            ProductEnvelope {
                status: Some(1),
                product: Some(product),
            } => {
                debug!(barcode = %barcode, "Product found");
                Ok(product)
            }
            _ => {
                debug!(barcode = %barcode, "Product database reported a miss");
                Err(LookupError::NotFound {
                    barcode: barcode.to_string(),
                })
            }
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            let timeout_ms = self.config.timeout.as_millis() as u64;
            warn!(timeout_ms = timeout_ms, "Product lookup timed out");
            LookupError::Timeout { timeout_ms }
        } else {
            warn!(error = %err, "Product database unreachable");
            LookupError::Unavailable(err.to_string())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;
    use std::time::Duration;

    /// Serves `router` on an ephemeral port and returns its base URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn product_doc(Path(file): Path<String>, headers: HeaderMap) -> (StatusCode, String) {
        let barcode = file.trim_end_matches(".json");
        let body = match barcode {
            "3017620422003" => json!({
                "code": barcode,
                "status": 1,
                "product": {
                    "product_name": "Nutella",
                    "brands": "Ferrero",
                    "categories": "Spreads, Sweet spreads",
                    "nutriments": { "energy-kcal_100g": 539, "fat_100g": 30.9 },
                    "labels_tags": ["en:gluten-free"],
                    "unexpected_field": { "ignored": true }
                }
            }),
            "11111111" => json!({ "code": barcode, "status": 0, "status_verbose": "product not found" }),
            "22222222" => return (StatusCode::NOT_FOUND, String::new()),
            "33333333" => return (StatusCode::BAD_GATEWAY, "upstream down".to_string()),
            "44444444" => return (StatusCode::OK, "<html>maintenance</html>".to_string()),
            "55555555" => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                json!({ "status": 1, "product": {} })
            }
            "66666666" => {
                let agent = headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                json!({ "status": 1, "product": { "product_name": agent } })
            }
            _ => json!({ "status": 1 }),
        };
        (StatusCode::OK, body.to_string())
    }

    async fn source(timeout: Duration) -> ProductSource {
        let router = Router::new().route("/api/v2/product/{file}", get(product_doc));
        let base = spawn_upstream(router).await;
        let config = SourceConfig::new(base)
            .timeout(timeout)
            .user_agent("pantry-tests");
        ProductSource::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let source = source(Duration::from_secs(5)).await;

        let product = source.lookup("3017620422003").await.unwrap();
        assert_eq!(product.product_name.as_deref(), Some("Nutella"));
        assert_eq!(product.brands.as_deref(), Some("Ferrero"));
        let nutriments = product.nutriments.unwrap();
        assert_eq!(nutriments["energy-kcal_100g"], json!(539));
    }

    #[tokio::test]
    async fn test_lookup_misses() {
        let source = source(Duration::from_secs(5)).await;

        // status 0
        assert!(source.lookup("11111111").await.unwrap_err().is_not_found());
        // HTTP 404
        assert!(source.lookup("22222222").await.unwrap_err().is_not_found());
        // status 1 without a product
        assert!(source.lookup("99999999").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_lookup_failures() {
        let source = source(Duration::from_secs(5)).await;

        assert!(matches!(
            source.lookup("33333333").await,
            Err(LookupError::Unavailable(_))
        ));
        assert!(matches!(
            source.lookup("44444444").await,
            Err(LookupError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_timeout() {
        let source = source(Duration::from_millis(200)).await;

        assert!(matches!(
            source.lookup("55555555").await,
            Err(LookupError::Timeout { timeout_ms: 200 })
        ));
    }

    #[tokio::test]
    async fn test_lookup_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = ProductSource::new(SourceConfig::new(format!("http://{}", addr))).unwrap();
        let err = source.lookup("12345678").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_user_agent_is_sent() {
        let source = source(Duration::from_secs(5)).await;

        let product = source.lookup("66666666").await.unwrap();
        assert_eq!(product.product_name.as_deref(), Some("pantry-tests"));
    }

    #[test]
    fn test_envelope_tolerates_extra_fields() {
        let envelope: ProductEnvelope = serde_json::from_value(json!({
            "code": "12345678",
            "status": 1,
            "status_verbose": "product found",
            "product": { "product_name": "Rice" }
        }))
        .unwrap();

        assert_eq!(envelope.status, Some(1));
        assert!(envelope.product.is_some());
    }
}

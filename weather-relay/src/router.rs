//! Router configuration for the relay API.
//!
//! Sets up all routes and middleware (CORS, tracing) and creates the axum
//! router ready for serving.

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the relay router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Browsers call the relay from any origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/geocode/{city}", get(handlers::geocode))
        .route("/reverse-geocode", get(handlers::reverse_geocode))
        .route("/weather", get(handlers::weather))
        .route("/air-quality", get(handlers::air_quality));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use weather_core::{Coordinates, Units, UpstreamProvider};

    /// Answers every call with a canned body, or fails when `fail` is set.
    #[derive(Debug, Default)]
    struct FakeProvider {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn respond(&self, call: String, body: Value) -> anyhow::Result<Value> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                anyhow::bail!("OpenWeather request failed with status 401 Unauthorized: Invalid API key");
            }
            Ok(body)
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpstreamProvider for FakeProvider {
        async fn geocode(&self, city: &str) -> anyhow::Result<Value> {
            let body = if city == "Atlantis" {
                json!([])
            } else {
                json!([{"name": city, "country": "FR", "lat": 48.85, "lon": 2.35}])
            };
            self.respond(format!("geocode:{city}"), body)
        }

        async fn reverse_geocode(&self, coords: Coordinates) -> anyhow::Result<Value> {
            self.respond(
                format!("reverse:{},{}", coords.lat, coords.lon),
                json!([{"name": "Here", "country": "FR", "lat": coords.lat, "lon": coords.lon}]),
            )
        }

        async fn one_call(&self, coords: Coordinates, units: Units) -> anyhow::Result<Value> {
            self.respond(
                format!("weather:{},{}:{}", coords.lat, coords.lon, units),
                json!({"current": {"temp": 1.0}, "daily": [], "extra": {"kept": true}}),
            )
        }

        async fn air_pollution(&self, coords: Coordinates) -> anyhow::Result<Value> {
            self.respond(
                format!("air:{},{}", coords.lat, coords.lon),
                json!({"list": [{"main": {"aqi": 3}}]}),
            )
        }
    }

    async fn get(provider: Arc<FakeProvider>, uri: &str) -> (StatusCode, Value) {
        let app = create_router(AppState::new(provider));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_check() {
        let (status, body) = get(Arc::default(), "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "OK", "message": "Weather API proxy is running"}));
    }

    #[tokio::test]
    async fn geocode_decodes_path_and_passes_body_through() {
        let provider = Arc::new(FakeProvider::default());
        let (status, body) = get(provider.clone(), "/api/geocode/Saint%20Malo").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Saint Malo");
        assert_eq!(provider.calls(), ["geocode:Saint Malo"]);
    }

    #[tokio::test]
    async fn geocode_without_matches_is_empty_list() {
        let (status, body) = get(Arc::default(), "/api/geocode/Atlantis").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn weather_defaults_to_metric_and_keeps_unknown_fields() {
        let provider = Arc::new(FakeProvider::default());
        let (status, body) = get(provider.clone(), "/api/weather?lat=48.85&lon=2.35").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extra"]["kept"], true);
        assert_eq!(provider.calls(), ["weather:48.85,2.35:metric"]);
    }

    #[tokio::test]
    async fn weather_forwards_imperial() {
        let provider = Arc::new(FakeProvider::default());
        get(provider.clone(), "/api/weather?lat=1&lon=2&units=imperial").await;

        assert_eq!(provider.calls(), ["weather:1,2:imperial"]);
    }

    #[tokio::test]
    async fn reverse_geocode_and_air_quality() {
        let provider = Arc::new(FakeProvider::default());

        let (status, body) = get(provider.clone(), "/api/reverse-geocode?lat=10.5&lon=-3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Here");

        let (status, body) = get(provider.clone(), "/api/air-quality?lat=10.5&lon=-3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["list"][0]["main"]["aqi"], 3);

        assert_eq!(provider.calls(), ["reverse:10.5,-3", "air:10.5,-3"]);
    }

    #[tokio::test]
    async fn upstream_failures_are_flattened() {
        let provider = Arc::new(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });

        let cases = [
            ("/api/geocode/Paris", "Failed to fetch coordinates"),
            ("/api/reverse-geocode?lat=1&lon=2", "Failed to reverse geocode"),
            ("/api/weather?lat=1&lon=2", "Failed to fetch weather data"),
            ("/api/air-quality?lat=1&lon=2", "Failed to fetch air quality data"),
        ];

        for (uri, message) in cases {
            let (status, body) = get(provider.clone(), uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(body, json!({"error": message}), "{uri}");
        }
    }

    #[tokio::test]
    async fn malformed_queries_never_reach_upstream() {
        let provider = Arc::new(FakeProvider::default());

        let cases = [
            ("/api/weather?lat=abc&lon=2", "Failed to fetch weather data"),
            ("/api/weather?lat=1&lon=2&units=kelvin", "Failed to fetch weather data"),
            ("/api/reverse-geocode?lat=1", "Failed to reverse geocode"),
            ("/api/air-quality", "Failed to fetch air quality data"),
        ];

        for (uri, message) in cases {
            let (status, body) = get(provider.clone(), uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(body, json!({"error": message}), "{uri}");
        }

        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = create_router(AppState::new(Arc::new(FakeProvider::default())));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("origin", "https://weather.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use weather_core::OpenWeatherProvider;
use weather_relay::{AppState, create_router};

const KEY: &str = "test-secret-key";

fn relay(server: &MockServer) -> Router {
    let provider = OpenWeatherProvider::new(KEY.to_string(), server.uri()).unwrap();
    create_router(AppState::new(Arc::new(provider)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn geocode_attaches_credential_and_limit() {
    let server = MockServer::start().await;
    let matches = json!([
        {"name": "London", "country": "GB", "state": "England", "lat": 51.5073, "lon": -0.1276},
        {"name": "London", "country": "CA", "state": "Ontario", "lat": 42.9834, "lon": -81.233}
    ]);

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "London"))
        .and(query_param("limit", "7"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(&matches))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(relay(&server), "/api/geocode/London").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), matches);
}

#[tokio::test]
async fn weather_body_passes_through_verbatim() {
    let server = MockServer::start().await;
    let payload = json!({
        "timezone_offset": 3600,
        "current": {"temp": 21.4, "feels_like": 20.9, "humidity": 40, "wind_speed": 3.2, "weather": []},
        "daily": [],
        "minutely": [{"dt": 1, "precipitation": 0}]
    });

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .and(query_param("lat", "51.5"))
        .and(query_param("lon", "-0.12"))
        .and(query_param("units", "imperial"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
        .mount(&server)
        .await;

    let (status, body) = get(relay(&server), "/api/weather?lat=51.5&lon=-0.12&units=imperial").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), payload);
}

#[tokio::test]
async fn air_quality_and_reverse_geocode_reach_their_upstreams() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": [{"main": {"aqi": 2}}]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .and(query_param("limit", "1"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "Camden", "country": "GB"}])))
        .mount(&server)
        .await;

    let (status, body) = get(relay(&server), "/api/air-quality?lat=51.5&lon=-0.12").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"aqi\":2"));

    let (status, body) = get(relay(&server), "/api/reverse-geocode?lat=51.5&lon=-0.12").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Camden"));
}

#[tokio::test]
async fn rejected_credential_is_flattened_without_leaking() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401"
        })))
        .mount(&server)
        .await;

    let (status, body) = get(relay(&server), "/api/weather?lat=1&lon=2").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"error": "Failed to fetch weather data"})
    );
    assert!(!body.contains(KEY));
}

#[tokio::test]
async fn unreachable_upstream_is_flattened() {
    let server = MockServer::start().await;
    let app = relay(&server);
    drop(server);

    let (status, body) = get(app, "/api/geocode/Paris").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"Failed to fetch coordinates"}"#);
}

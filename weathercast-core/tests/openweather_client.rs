//! Integration tests for OpenWeatherProvider using wiremock.

use std::time::Duration;

use weathercast_core::{Coordinate, OpenWeatherProvider, WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new(
        "TEST_KEY".to_string(),
        &format!("{}/data/3.0/onecall", server.uri()),
        &format!("{}/geo/1.0", server.uri()),
        Duration::from_secs(2),
    )
    .unwrap()
}

fn weather_body() -> serde_json::Value {
    serde_json::json!({
        "lat": 37.7749,
        "lon": -122.4194,
        "current": {
            "temp": 61.5,
            "weather": [{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}]
        },
        "hourly": [
            {"dt": 1_700_000_000, "temp": 61.5, "weather": [{"id": 801, "description": "few clouds", "icon": "02d"}]}
        ],
        "daily": [
            {"dt": 1_700_020_000, "temp": {"day": 63.0, "night": 52.0}, "weather": [{"id": 800, "description": "clear sky", "icon": "01d"}]}
        ]
    })
}

#[tokio::test]
async fn test_geocode_takes_first_match() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Paris"))
        .and(query_param("limit", "1"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "Paris", "lat": 48.8589, "lon": 2.32, "country": "FR", "local_names": {"fr": "Paris"}},
            {"name": "Paris", "lat": 33.66, "lon": -95.55, "country": "US"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let place = provider(&mock_server).geocode_by_text("Paris").await.unwrap();

    assert_eq!(place.display_name(), "Paris");
    assert_eq!(place.coordinate(), Coordinate { latitude: 48.8589, longitude: 2.32 });
}

#[tokio::test]
async fn test_geocode_no_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).geocode_by_text("Atlantis").await.unwrap_err();

    assert_eq!(err, WeatherError::NoResults("Atlantis".to_string()));
}

#[tokio::test]
async fn test_reverse_geocode_returns_first_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .and(query_param("lat", "37.7749"))
        .and(query_param("lon", "-122.4194"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "San Francisco", "lat": 37.7749, "lon": -122.4194, "country": "US", "state": "California"}
        ])))
        .mount(&mock_server)
        .await;

    let coordinate = Coordinate::new(37.7749, -122.4194).unwrap();
    let name = provider(&mock_server).reverse_geocode(coordinate).await.unwrap();

    assert_eq!(name, "San Francisco");
}

#[tokio::test]
async fn test_reverse_geocode_no_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let coordinate = Coordinate::new(0.0, 0.0).unwrap();
    let err = provider(&mock_server).reverse_geocode(coordinate).await.unwrap_err();

    assert!(matches!(err, WeatherError::NoResults(_)));
}

#[tokio::test]
async fn test_fetch_weather_uses_imperial_units() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .and(query_param("units", "imperial"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinate = Coordinate::new(37.7749, -122.4194).unwrap();
    let weather = provider(&mock_server).fetch_weather(coordinate).await.unwrap();

    assert_eq!(weather.current.temperature, 61.5);
    assert_eq!(weather.hourly.len(), 1);
    assert_eq!(weather.daily[0].day_temperature, 63.0);
    assert_eq!(weather.daily[0].conditions[0].icon_id, "01d");
}

#[tokio::test]
async fn test_fetch_weather_missing_daily_is_decode_error() {
    let mock_server = MockServer::start().await;
    let mut body = weather_body();
    body.as_object_mut().unwrap().remove("daily");

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let coordinate = Coordinate::new(1.0, 1.0).unwrap();
    let err = provider(&mock_server).fetch_weather(coordinate).await.unwrap_err();

    assert!(matches!(err, WeatherError::Decode(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_fetch_weather_empty_daily_is_ok() {
    let mock_server = MockServer::start().await;
    let mut body = weather_body();
    body["daily"] = serde_json::json!([]);

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let coordinate = Coordinate::new(1.0, 1.0).unwrap();
    let weather = provider(&mock_server).fetch_weather(coordinate).await.unwrap();

    assert!(weather.daily.is_empty());
}

#[tokio::test]
async fn test_status_codes_are_classified() {
    let cases: [(u16, fn(&WeatherError) -> bool); 4] = [
        (401, |e| matches!(e, WeatherError::Unauthorized)),
        (429, |e| matches!(e, WeatherError::RateLimited)),
        (503, |e| matches!(e, WeatherError::Server { status: 503, .. })),
        (404, |e| matches!(e, WeatherError::Client { status: 404, .. })),
    ];

    for (status, check) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(serde_json::json!({"cod": status, "message": "nope"})),
            )
            .mount(&mock_server)
            .await;

        let coordinate = Coordinate::new(1.0, 1.0).unwrap();
        let err = provider(&mock_server).fetch_weather(coordinate).await.unwrap_err();

        assert!(check(&err), "status {status} mapped to {err:?}");
    }
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(weather_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let fast = OpenWeatherProvider::new(
        "TEST_KEY".to_string(),
        &format!("{}/data/3.0/onecall", mock_server.uri()),
        &format!("{}/geo/1.0", mock_server.uri()),
        Duration::from_millis(200),
    )
    .unwrap();

    let coordinate = Coordinate::new(1.0, 1.0).unwrap();
    let err = fast.fetch_weather(coordinate).await.unwrap_err();

    assert!(matches!(err, WeatherError::Network(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let unreachable = OpenWeatherProvider::new(
        "TEST_KEY".to_string(),
        "http://127.0.0.1:1/onecall",
        "http://127.0.0.1:1/geo",
        Duration::from_secs(2),
    )
    .unwrap();

    let err = unreachable.geocode_by_text("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::Network(_)), "unexpected error: {err:?}");
}

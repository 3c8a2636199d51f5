//! Full resolve pipeline: wiremock upstream, in-process cache.

use std::{sync::Arc, time::Duration};

use checkweather_core::{
    CacheStore, ErrorKind, MemoryCache, OpenWeatherClient, UpstreamConfig, WeatherRequest,
    WeatherResolver,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Eight daily entries; index 0 is today and is deliberately empty.
fn onecall_body() -> serde_json::Value {
    let mut daily = vec![serde_json::json!({})];
    for i in 1..8 {
        daily.push(serde_json::json!({
            "dt": 1_664_182_400 + (i - 1) * 86_400,
            "temp": { "min": 20.0, "max": 30.0 },
            "weather": [{ "description": "few clouds", "icon": "02d" }]
        }));
    }

    serde_json::json!({
        "lat": 30.04,
        "lon": 31.24,
        "current": {
            "dt": 1_664_096_000,
            "temp": 25.0,
            "humidity": 60,
            "wind_speed": 3.0,
            "weather": [{ "description": "clear sky", "icon": "01d" }]
        },
        "daily": daily,
        "alerts": []
    })
}

async fn mount_upstream(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Cairo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": 30.04, "lon": 31.24 }
        ])))
        .expect(expected_calls)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(onecall_body()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn resolver_for(server: &MockServer, cache: &MemoryCache) -> WeatherResolver {
    let config = UpstreamConfig {
        geocode_url: format!("{}/geo/1.0/direct", server.uri()),
        onecall_url: format!("{}/data/3.0/onecall", server.uri()),
        timeout_secs: 5,
    };
    let client = OpenWeatherClient::new("TEST_KEY".to_string(), &config).unwrap();

    WeatherResolver::new(Arc::new(cache.clone()), Arc::new(client), Duration::from_secs(900))
}

#[tokio::test]
async fn test_city_lookup_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_upstream(&mock_server, 1).await;
    let cache = MemoryCache::new();

    let data = resolver_for(&mock_server, &cache)
        .resolve(&WeatherRequest::city("Cairo"))
        .await
        .unwrap();

    assert_eq!(data.location, "Cairo");
    assert_eq!(data.current.temperature, 25.0);
    assert!((data.current.wind_speed - 10.8).abs() < 1e-9);
    assert_eq!(data.current.condition, "Clear sky");
    assert_eq!(data.forecast.len(), 7);
    assert_eq!(data.forecast[0].date, "2022-09-26");
    assert_eq!(data.forecast[0].condition, "Few clouds");
    assert_eq!(data.alert, None);

    assert_eq!(cache.get("weather:Cairo").await, Some(data));
}

#[tokio::test]
async fn test_repeat_lookup_is_served_from_cache() {
    let mock_server = MockServer::start().await;
    // `expect(1)` is verified when the server drops
    mount_upstream(&mock_server, 1).await;
    let cache = MemoryCache::new();
    let resolver = resolver_for(&mock_server, &cache);

    let first = resolver.get_weather(Some("Cairo"), None, None).await.unwrap();
    let second = resolver.get_weather(Some("Cairo"), None, None).await.unwrap();

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn test_unknown_city_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(onecall_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cache = MemoryCache::new();
    let err = resolver_for(&mock_server, &cache)
        .get_weather(Some("Atlantis"), None, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(cache.is_empty());
}

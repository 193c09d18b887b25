use instant_weather_core::{
    DisplayMode, OpenWeatherClient, WeatherClient, WeatherError, display,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn tokyo_body() -> serde_json::Value {
    json!({
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 20.4, "feels_like": 19.8, "humidity": 63},
        "wind": {"speed": 3.5, "deg": 100},
        "sys": {"country": "JP"},
        "name": "Tokyo",
        "cod": 200
    })
}

#[tokio::test]
async fn fetch_sends_metric_query_and_parses_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Tokyo,JP"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenWeatherClient::with_base_url(mock_server.uri());
    let snapshot = client.fetch("Tokyo,JP", "abc123").await.unwrap();

    assert_eq!(snapshot.location_name, "Tokyo");
    assert_eq!(snapshot.country, "JP");
    assert_eq!(
        display::render(DisplayMode::Temperature, &snapshot).text,
        "☀️ 20℃/69℉"
    );
    assert_eq!(
        display::render(DisplayMode::Wind, &snapshot).tooltip,
        "clear sky"
    );
}

#[tokio::test]
async fn location_with_spaces_is_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "New York,US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenWeatherClient::with_base_url(mock_server.uri());
    assert!(client.fetch("New York,US", "abc123").await.is_ok());
}

#[tokio::test]
async fn unauthorized_is_fetch_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"cod": 401, "message": "Invalid API key."})),
        )
        .mount(&mock_server)
        .await;

    let client = OpenWeatherClient::with_base_url(mock_server.uri());
    let err = client.fetch("Tokyo,JP", "wrong").await.unwrap_err();

    match err {
        WeatherError::FetchFailed(reason) => assert!(reason.contains("401")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn empty_body_is_fetch_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = OpenWeatherClient::with_base_url(mock_server.uri());
    let err = client.fetch("Tokyo,JP", "abc123").await.unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}

#[tokio::test]
async fn incomplete_payload_is_fetch_failed() {
    let mock_server = MockServer::start().await;

    let mut body = tokyo_body();
    body.as_object_mut().unwrap().remove("main");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = OpenWeatherClient::with_base_url(mock_server.uri());
    let err = client.fetch("Tokyo,JP", "abc123").await.unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}

#[tokio::test]
async fn unreachable_host_is_fetch_failed() {
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };
    // Either refused or answered 404 by a recycled server.
    let client = OpenWeatherClient::with_base_url(uri);
    let err = client.fetch("Tokyo,JP", "abc123").await.unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}

//! Integration tests for the IP geolocation lookup using wiremock.

use weatherdash_core::{Coordinates, Geolocator, IpGeolocator, Query, location::LocationError};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_locate_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "country": "Tajikistan",
            "city": "Dushanbe",
            "lat": 38.5358,
            "lon": 68.7791
        })))
        .mount(&mock_server)
        .await;

    let geo = IpGeolocator::new(format!("{}/json", mock_server.uri())).unwrap();
    let coords = geo.locate().await.unwrap();

    assert_eq!(coords, Coordinates::new(38.5358, 68.7791));
}

#[tokio::test]
async fn test_locate_failure_status_in_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "private range"
        })))
        .mount(&mock_server)
        .await;

    let geo = IpGeolocator::new(mock_server.uri()).unwrap();
    let err = geo.locate().await.unwrap_err();

    assert!(matches!(err, LocationError::Lookup(ref msg) if msg == "private range"));
}

#[tokio::test]
async fn test_locate_forbidden_is_denial() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let geo = IpGeolocator::new(mock_server.uri()).unwrap();
    assert!(matches!(geo.locate().await, Err(LocationError::PermissionDenied)));

    let query = weatherdash_core::location::resolve_initial_location(&geo, "Dushanbe").await;
    assert_eq!(query, Query::City("Dushanbe".into()));
}

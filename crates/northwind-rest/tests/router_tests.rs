use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use northwind_core::{Customer, Order};
use northwind_csv::{CsvDataStore, CsvRequestTracker};
use northwind_rest::{build_router, AppState};
use northwind_service::{NorthwindService, TrackingService};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    router: Router,
}

fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let shipped = NaiveDate::from_ymd_opt(1997, 9, 2).and_then(|d| d.and_hms_opt(0, 0, 0));

    let store = CsvDataStore::from_records(
        vec![
            Customer::new("ALFKI", "Alfreds Futterkiste")
                .with_contact("Maria Anders")
                .with_country("Germany")
                .with_phone("030-0074321"),
            Customer::new("AROUT", "Around the Horn")
                .with_contact("Thomas Hardy")
                .with_country("UK"),
        ],
        vec![
            Order::new(10643, Some("ALFKI".into())).with_shipped_date(shipped),
            Order::new(10702, Some("ALFKI".into())),
        ],
    );
    let tracker = CsvRequestTracker::open(dir.path().join("webtracker.csv")).unwrap();

    let state = AppState::new(
        Arc::new(NorthwindService::csv_only(Arc::new(store))),
        TrackingService::new(Arc::new(tracker)),
    );

    TestApp {
        _dir: dir,
        router: build_router(state),
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> Value {
    let (status, body) = get(router, uri).await;
    assert_eq!(status, StatusCode::OK, "GET {uri}");
    serde_json::from_slice(&body).unwrap()
}

async fn soap(router: &Router, envelope: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/NorthwindService/basichttp")
                .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
                .body(Body::from(envelope.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn customers_by_country_returns_pascal_case_json() {
    let app = test_app();

    let json = get_json(&app.router, "/Customers/CustomersByCountryData?country=germany").await;
    let customers = json.as_array().unwrap();

    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["CustomerID"], "ALFKI");
    assert_eq!(customers[0]["CompanyName"], "Alfreds Futterkiste");
    assert_eq!(customers[0]["Phone"], "030-0074321");
}

#[tokio::test]
async fn blank_or_missing_parameters_return_empty_arrays() {
    let app = test_app();

    for uri in [
        "/Customers/CustomersByCountryData",
        "/Customers/CustomersByCountryData?country=",
        "/api/v1/customers?country=%20%20",
        "/Customers/CustomerOrdersInformation?id=",
    ] {
        let json = get_json(&app.router, uri).await;
        assert_eq!(json, Value::Array(Vec::new()), "GET {uri}");
    }
}

#[tokio::test]
async fn orders_routes_return_csv_ordering() {
    let app = test_app();

    let by_query = get_json(&app.router, "/Customers/CustomerOrdersInformation?id=alfki").await;
    let by_path = get_json(&app.router, "/api/v1/customers/ALFKI/orders").await;
    assert_eq!(by_query, by_path);

    let orders = by_path.as_array().unwrap();
    // Unshipped orders sort first on the CSV path.
    assert_eq!(orders[0]["OrderID"], 10702);
    assert_eq!(orders[0]["ShippedDate"], Value::Null);
    assert_eq!(orders[1]["OrderID"], 10643);
    assert_eq!(orders[1]["ShippedDate"], "1997-09-02T00:00:00");
}

#[tokio::test]
async fn every_request_is_tracked_with_query_string() {
    let app = test_app();

    get(&app.router, "/Customers/CustomersByCountryData?country=UK").await;

    let mut request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let peer: SocketAddr = "192.168.1.20:51234".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    app.router.clone().oneshot(request).await.unwrap();

    let json = get_json(&app.router, "/api/v1/tracking?limit=10").await;
    let entries = json.as_array().unwrap();

    // The tracking query itself is recorded before its handler runs.
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["URLRequest"], "/api/v1/tracking?limit=10");
    assert_eq!(entries[0]["Id"], 3);
    assert_eq!(entries[1]["URLRequest"], "/health");
    assert_eq!(entries[1]["SourceIp"], "192.168.1.20");
    assert_eq!(entries[2]["URLRequest"], "/Customers/CustomersByCountryData?country=UK");
    assert_eq!(entries[2]["SourceIp"], "unknown");
    assert_eq!(entries[2]["Id"], 1);
}

#[tokio::test]
async fn ready_reports_csv_data_source() {
    let app = test_app();

    let json = get_json(&app.router, "/ready").await;
    assert_eq!(json["status"], "ready");
    assert_eq!(json["data_source"], "csv");
    assert_eq!(json["tracking"], "csv");
}

#[tokio::test]
async fn soap_get_customers_by_country() {
    let app = test_app();

    let (status, body) = soap(
        &app.router,
        "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\" xmlns:tem=\"http://tempuri.org/\">\
         <soap:Body><tem:GetCustomersByCountry><tem:country>uk</tem:country></tem:GetCustomersByCountry></soap:Body>\
         </soap:Envelope>",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<GetCustomersByCountryResult"));
    assert!(body.contains("<CustomerID>AROUT</CustomerID>"));
    assert!(!body.contains("ALFKI"));
}

#[tokio::test]
async fn soap_unknown_operation_returns_fault() {
    let app = test_app();

    let (status, body) = soap(
        &app.router,
        "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soap:Body><DropTables/></soap:Body></soap:Envelope>",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("<s:Fault>"));
    assert!(body.contains("DropTables"));
}

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use diamond_utils::AppConfig;
use serde_json::Value;
use tower::ServiceExt;

use super::{create_app, AppState};

const BOUNDARY: &str = "diamond-test-boundary";

fn app() -> Router {
    create_app(AppState::new(AppConfig::default()).unwrap())
}

fn upload(uri: &str, filename: &str, content: &str) -> Request<Body> {
    upload_as(uri, filename, "text/csv", content.as_bytes())
}

fn upload_as(uri: &str, filename: &str, content_type: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn health_reports_service() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "diamond-id-generator");
    assert_eq!(json["rule_set"], "v6.1");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let response = app()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn categories_list_all_ten() {
    let response = app()
        .oneshot(Request::get("/api/v1/categories").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let categories = json.as_array().unwrap();
    assert_eq!(categories.len(), 10);
    assert_eq!(categories[5]["label"], "5: Cladding Assy");
    assert_eq!(
        categories[5]["required_columns"],
        serde_json::json!(["MasterCode", "Cladding Panel", "Backer Board"])
    );
    assert_eq!(categories[9]["download_filename"], "Frame_Diamond_IDs.csv");
}

#[tokio::test]
async fn preview_accepts_selector_label() {
    let response = app()
        .oneshot(upload(
            "/api/v1/diamond-ids/preview?category=5%3A%20Cladding%20Assy",
            "cladding.csv",
            "MasterCode,Cladding Panel,Backer Board\nO-61025-01-71815-01,CP-100,BB-200\n61025-01,CP-100,BB-200",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["category"], "5: Cladding Assy");
    assert_eq!(json["output_column"], "Cladding Assy");
    assert_eq!(json["summary"]["generated"], 1);
    assert_eq!(json["summary"]["format_errors"], 1);
    assert_eq!(
        json["headers"],
        serde_json::json!(["MasterCode", "Cladding Panel", "Backer Board", "Cladding Assy"])
    );
    assert_eq!(json["rows"][0][3], "51092-01");
    assert_eq!(json["rows"][1][3], "FORMAT ERROR: Start with O-");
}

#[tokio::test]
async fn preview_rejects_missing_columns() {
    let response = app()
        .oneshot(upload(
            "/api/v1/diamond-ids/preview?category=5",
            "cladding.csv",
            "MasterCode,Cladding Panel\nO-61025-01-71815-01,CP-100",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "MISSING_COLUMNS");
    assert_eq!(json["message"], "Missing Columns in CSV: Backer Board");
    assert_eq!(json["details"]["missing_columns"], serde_json::json!(["Backer Board"]));
}

#[tokio::test]
async fn unknown_category_is_bad_request() {
    let response = app()
        .oneshot(upload(
            "/api/v1/diamond-ids/preview?category=12",
            "bom.csv",
            "MasterCode\nA-1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "UNKNOWN_CATEGORY");
}

#[tokio::test]
async fn unsupported_file_type_is_bad_request() {
    let response = app()
        .oneshot(upload_as(
            "/api/v1/diamond-ids/preview?category=9",
            "bom.pdf",
            "application/pdf",
            b"MasterCode\nA-1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn download_returns_csv_attachment() {
    let response = app()
        .oneshot(upload(
            "/api/v1/diamond-ids/download?category=9",
            "frames.csv",
            "MasterCode\nX-12-03-99-B",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Frame_Diamond_IDs.csv\""
    );
    assert_eq!(response.headers()["x-diamond-warnings"], "0");
    assert_eq!(body_bytes(response).await, b"MasterCode,Frame\nX-12-03-99-B,92999-02\n");
}

#[tokio::test]
async fn legacy_rule_set_selectable_per_request() {
    let response = app()
        .oneshot(upload(
            "/api/v1/diamond-ids/preview?category=5&rule_set=v6.0",
            "cladding.csv",
            "Cladding Panel,Backer Board\nCP-100,BB-200",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["rule_set"], "v6.0");
    assert_eq!(json["rows"][0][2], "5P340-01");
}

#[tokio::test]
async fn metrics_count_batches() {
    let app = app();
    let response = app
        .clone()
        .oneshot(upload(
            "/api/v1/diamond-ids/preview?category=9",
            "frames.csv",
            "MasterCode\nX-12-03-99-B",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("diamond_batches_total{category=\"9\",rule_set=\"v6.1\"} 1"));
    assert!(text.contains("diamond_rows_total{category=\"9\"} 1"));
}

#[tokio::test]
async fn content_type_selects_format_without_extension() {
    let response = app()
        .oneshot(upload_as(
            "/api/v1/diamond-ids/preview?category=9",
            "export",
            "text/csv; charset=utf-8",
            b"MasterCode\nX-12-03-99-B",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rows"][0][1], "92999-02");
}

#[tokio::test]
async fn download_keeps_undecodable_rows() {
    let response = app()
        .oneshot(upload_as(
            "/api/v1/diamond-ids/download?category=8",
            "bom.csv",
            "text/csv",
            b"MasterCode,Note\nA-11-1,ok\nB-22-2,caf\xe9\nC-33-3,ok",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-diamond-warnings"], "1");
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    let codes: Vec<&str> = body.lines().skip(1).map(|line| &line[..6]).collect();
    assert_eq!(codes, vec!["A-11-1", "B-22-2", "C-33-3"]);
    assert!(body.contains("caf\u{fffd}"));
}

#[tokio::test]
async fn extra_cells_reject_upload() {
    let response = app()
        .oneshot(upload(
            "/api/v1/diamond-ids/download?category=8",
            "bom.csv",
            "MasterCode\nA-11-1,extra",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BOM_PARSING_ERROR");
}

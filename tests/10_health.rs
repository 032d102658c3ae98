mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn root_describes_the_api() {
    let res = common::get("/", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["name"], "MSA Acompanhamento API");
    assert!(res.body["data"]["endpoints"]["fichas"].is_string());
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let res = common::get("/health", None).await;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(res.body["data"]["status"], "degraded");
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let res = common::get("/api/nada-aqui", None).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

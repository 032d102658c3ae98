mod common;

use axum::http::{header, Method, StatusCode};
use serde_json::json;

use msa_acompanhamento::types::Role;

#[tokio::test]
async fn protected_routes_require_a_session() {
    for uri in ["/api/alunos", "/api/turmas", "/api/fichas", "/api/relatorios/resumo", "/api/auth/me"] {
        let res = common::get(uri, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(res.body["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let mut token = common::token(Role::Admin);
    token.push('x');

    let res = common::get("/api/alunos", Some(&token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "Sessão inválida ou expirada");
}

#[tokio::test]
async fn valid_token_reaches_the_usuario_lookup() {
    // The session is well-formed, so the only thing left to fail is storage
    let res = common::get("/api/alunos", Some(&common::token(Role::Instrutor))).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn login_validates_before_touching_storage() {
    let res = common::send_json(
        Method::POST,
        "/api/auth/login",
        &json!({ "email": "sem-arroba", "senha": "" }),
        None,
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(common::issue_paths(&res.body), vec!["email", "senha"]);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let res = common::send_raw(Method::POST, "/api/auth/login", "{\"email\":", None).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn public_registration_refuses_admin_role() {
    let res = common::send_json(
        Method::POST,
        "/api/auth/register",
        &json!({
            "nome": "Maria",
            "email": "maria@ccb.org.br",
            "senha": "segredo1",
            "role": "ADMIN",
            "congregacao": "Central"
        }),
        None,
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(common::issue_paths(&res.body), vec!["role"]);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let res = common::send_raw(Method::POST, "/api/auth/logout", "", None).await;

    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("msa_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

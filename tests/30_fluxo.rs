//! End-to-end flows against a real Postgres. Skipped unless `DATABASE_URL` is set.

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use msa_acompanhamento::app::{app, AppState};
use msa_acompanhamento::database::models::InstrutorDetalhe;
use msa_acompanhamento::database::repository::{fases, fichas, instrumentos};
use msa_acompanhamento::database::repository::fases::FaseInput;
use msa_acompanhamento::database::repository::fichas::AulaInput;
use msa_acompanhamento::database::repository::instrumentos::InstrumentoInput;
use msa_acompanhamento::services::{NovaConta, Origem, RegistrationService};
use msa_acompanhamento::types::Role;

struct Conta {
    detalhe: InstrutorDetalhe,
    token: String,
}

async fn conta(pool: &PgPool, role: Role, congregacao: &str) -> Conta {
    let nova = NovaConta {
        nome: format!("{} {}", role, common::unico()),
        email: format!("{}@teste.ccb", common::unico()),
        senha: "segredo1".to_string(),
        role,
        congregacao: congregacao.to_string(),
        telefone: None,
        instrumento_ids: vec![],
    };
    let detalhe = RegistrationService::new(pool.clone())
        .registrar(nova, Origem::Administrador)
        .await
        .expect("account created");
    let token = common::token_for(detalhe.usuario_id, role);

    Conta { detalhe, token }
}

/// Active instrumento and fase ids for aluno payloads
async fn catalogo(pool: &PgPool) -> (Uuid, Uuid) {
    let instrumento = instrumentos::insert(
        pool,
        &InstrumentoInput {
            nome: format!("Violino {}", common::unico()),
            categoria: Some("Cordas".to_string()),
            ativo: true,
        },
    )
    .await
    .expect("instrumento");
    let ordem = (Uuid::new_v4().as_u128() % 1_000_000_000) as i32 + 1_000;
    let fase = fases::insert(
        pool,
        &FaseInput {
            nome: format!("Fase {}", ordem),
            ordem,
            descricao: None,
        },
    )
    .await
    .expect("fase");

    (instrumento.id, fase.id)
}

async fn novo_aluno(app: &Router, dono: &Conta, instrumento_id: Uuid, fase_id: Uuid) -> Value {
    let res = common::call(
        app,
        Method::POST,
        "/api/alunos",
        Some(json!({
            "nome": "Aluno Teste",
            "congregacao": dono.detalhe.congregacao,
            "instrumentoId": instrumento_id,
            "faseId": fase_id,
        })),
        &dono.token,
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    res.body["data"].clone()
}

#[tokio::test]
async fn fifth_encarregado_is_refused_with_exact_message() {
    let Some(pool) = common::live_pool().await else { return };
    let app = app(AppState::new(pool));
    let congregacao = format!("Congregação {}", common::unico());

    let registrar = |n: usize| {
        let app = app.clone();
        let congregacao = congregacao.clone();
        async move {
            common::send_json_to(
                &app,
                Method::POST,
                "/api/auth/register",
                &json!({
                    "nome": format!("Encarregado {}", n),
                    "email": format!("enc{}-{}@teste.ccb", n, common::unico()),
                    "senha": "segredo1",
                    "role": "ENCARREGADO",
                    "congregacao": congregacao,
                }),
            )
            .await
        }
    };

    for n in 1..=4 {
        assert_eq!(registrar(n).await.status, StatusCode::CREATED);
    }

    let res = registrar(5).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body["error"],
        format!("Já existe um Encarregado de Orquestra cadastrado para a congregação {}", congregacao)
    );
}

#[tokio::test]
async fn promoting_encarregado_respects_admin_cap() {
    let Some(pool) = common::live_pool().await else { return };
    let congregacao = format!("Congregação {}", common::unico());

    let admin = conta(&pool, Role::Admin, &congregacao).await;
    conta(&pool, Role::Admin, &congregacao).await;
    conta(&pool, Role::Admin, &congregacao).await;
    let encarregado = conta(&pool, Role::Encarregado, &congregacao).await;
    let app = app(AppState::new(pool));

    let uri = format!("/api/instrutores/{}", encarregado.detalhe.id);
    let res = common::call(&app, Method::PUT, &uri, Some(json!({ "role": "ADMIN" })), &admin.token).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);
    assert_eq!(
        res.body["error"],
        format!("Limite de administradores atingido para a congregação {}", congregacao)
    );

    let res = common::call(&app, Method::GET, &uri, None, &admin.token).await;
    assert_eq!(res.body["data"]["role"], "ENCARREGADO");
}

#[tokio::test]
async fn aluno_with_missing_catalog_rows_is_rejected() {
    let Some(pool) = common::live_pool().await else { return };
    let instrutor = conta(&pool, Role::Instrutor, &format!("Congregação {}", common::unico())).await;
    let app = app(AppState::new(pool));

    let res = common::call(
        &app,
        Method::POST,
        "/api/alunos",
        Some(json!({
            "nome": "Sem Catálogo",
            "congregacao": instrutor.detalhe.congregacao,
            "instrumentoId": Uuid::new_v4(),
            "faseId": Uuid::new_v4(),
        })),
        &instrutor.token,
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(common::issue_paths(&res.body), vec!["instrumentoId", "faseId"]);
}

#[tokio::test]
async fn other_instrutores_cannot_touch_an_aluno_or_its_fichas() {
    let Some(pool) = common::live_pool().await else { return };
    let congregacao = format!("Congregação {}", common::unico());
    let (instrumento_id, fase_id) = catalogo(&pool).await;
    let dono = conta(&pool, Role::Instrutor, &congregacao).await;
    let outro = conta(&pool, Role::Instrutor, &congregacao).await;
    let encarregado = conta(&pool, Role::Encarregado, &congregacao).await;
    let app = app(AppState::new(pool));

    let aluno = novo_aluno(&app, &dono, instrumento_id, fase_id).await;
    let aluno_uri = format!("/api/alunos/{}", aluno["id"].as_str().unwrap());

    assert_eq!(common::call(&app, Method::GET, &aluno_uri, None, &outro.token).await.status, StatusCode::FORBIDDEN);
    let put = common::call(&app, Method::PUT, &aluno_uri, Some(json!({ "nome": "Outro" })), &outro.token).await;
    assert_eq!(put.status, StatusCode::FORBIDDEN);
    assert_eq!(common::call(&app, Method::DELETE, &aluno_uri, None, &outro.token).await.status, StatusCode::FORBIDDEN);

    // Opened by the encarregado, so only the aluno's instrutor links the owner to it
    let ficha = common::call(
        &app,
        Method::POST,
        "/api/fichas",
        Some(json!({ "alunoId": aluno["id"], "tipoAula": "INSTRUMENTO" })),
        &encarregado.token,
    )
    .await;
    assert_eq!(ficha.status, StatusCode::CREATED, "{}", ficha.body);
    assert_eq!(ficha.body["data"]["instrutorId"], json!(encarregado.detalhe.id));

    let ficha_uri = format!("/api/fichas/{}", ficha.body["data"]["id"].as_str().unwrap());
    assert_eq!(common::call(&app, Method::GET, &ficha_uri, None, &dono.token).await.status, StatusCode::OK);
    assert_eq!(common::call(&app, Method::GET, &ficha_uri, None, &outro.token).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn finalization_is_one_shot_and_freezes_the_ficha() {
    let Some(pool) = common::live_pool().await else { return };
    let (instrumento_id, fase_id) = catalogo(&pool).await;
    let dono = conta(&pool, Role::Instrutor, &format!("Congregação {}", common::unico())).await;
    let app = app(AppState::new(pool.clone()));

    let aluno = novo_aluno(&app, &dono, instrumento_id, fase_id).await;
    let ficha = common::call(
        &app,
        Method::POST,
        "/api/fichas",
        Some(json!({ "alunoId": aluno["id"], "tipoAula": "TEORIA" })),
        &dono.token,
    )
    .await;
    let ficha_uri = format!("/api/fichas/{}", ficha.body["data"]["id"].as_str().unwrap());

    let aula = json!({ "numeroAula": 1, "data": "2024-03-02", "presenca": true });
    let res = common::call(&app, Method::POST, &format!("{}/aulas", ficha_uri), Some(aula), &dono.token).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let aula_id: Uuid = res.body["data"]["id"].as_str().unwrap().parse().unwrap();
    for (numero, nota) in [(1, 6.0), (2, 8.0)] {
        let avaliacao = json!({ "numero": numero, "nota": nota });
        let res = common::call(&app, Method::POST, &format!("{}/avaliacoes", ficha_uri), Some(avaliacao), &dono.token).await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    }

    // The instrutor's verdict is kept even though the average passes
    let finalizar = format!("{}/finalizar", ficha_uri);
    let res = common::call(&app, Method::POST, &finalizar, Some(json!({ "apto": false })), &dono.token).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["mediaFinal"], 7.0);
    assert_eq!(res.body["data"]["apto"], false);
    assert_eq!(res.body["data"]["aprovadoPorMedia"], true);

    let again = common::call(&app, Method::POST, &finalizar, Some(json!({ "apto": true })), &dono.token).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["error"], "Ficha já foi finalizada");

    let detalhe = common::call(&app, Method::GET, &ficha_uri, None, &dono.token).await;
    assert_eq!(detalhe.body["data"]["apto"], false);
    assert_eq!(detalhe.body["data"]["mediaFinal"], 7.0);

    let aula = json!({ "numeroAula": 2, "data": "2024-03-09", "presenca": true });
    let res = common::call(&app, Method::POST, &format!("{}/aulas", ficha_uri), Some(aula), &dono.token).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    // Writes that passed the handler check before finalization still land nowhere
    let ficha_id: Uuid = ficha.body["data"]["id"].as_str().unwrap().parse().unwrap();
    let atrasada: AulaInput =
        serde_json::from_value(json!({ "numeroAula": 3, "data": "2024-03-16", "presenca": true })).unwrap();
    assert!(fichas::insert_aula(&pool, ficha_id, &atrasada).await.unwrap().is_none());
    assert!(!fichas::delete_aula(&pool, ficha_id, aula_id).await.unwrap());
    assert_eq!(fichas::list_aulas(&pool, ficha_id).await.unwrap().len(), 1);
}

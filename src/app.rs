use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::{self, SecurityConfig};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{session_auth_middleware, validate_user_middleware};

/// Shared by every handler; the pool is the only runtime state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub fn app(state: AppState) -> Router {
    let config = config::config();

    let protected = Router::new()
        .merge(auth_routes())
        .merge(aluno_routes())
        .merge(ficha_routes())
        .merge(catalog_routes())
        .merge(turma_routes())
        .merge(instrutor_routes())
        .merge(relatorio_routes())
        // Runs inner to outer: session token first, then the usuario lookup
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn(session_auth_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected)
        .fallback(fallback)
        // Global middleware
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/logout", post(auth::logout_post))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/api/auth/me", get(auth::me_get))
        .route("/api/auth/senha", put(auth::senha_put))
}

fn aluno_routes() -> Router<AppState> {
    use protected::alunos;

    Router::new()
        .route("/api/alunos", get(alunos::collection_get).post(alunos::collection_post))
        .route(
            "/api/alunos/:id",
            get(alunos::record_get).put(alunos::record_put).delete(alunos::record_delete),
        )
}

fn ficha_routes() -> Router<AppState> {
    use protected::fichas;

    Router::new()
        .route("/api/fichas", get(fichas::collection_get).post(fichas::collection_post))
        .route(
            "/api/fichas/:id",
            get(fichas::record_get).put(fichas::record_put).delete(fichas::record_delete),
        )
        .route("/api/fichas/:id/aulas", get(fichas::aulas_get).post(fichas::aulas_post))
        .route(
            "/api/fichas/:id/aulas/:aula_id",
            put(fichas::aula_put).delete(fichas::aula_delete),
        )
        .route(
            "/api/fichas/:id/avaliacoes",
            get(fichas::avaliacoes_get).post(fichas::avaliacoes_post),
        )
        .route(
            "/api/fichas/:id/avaliacoes/:avaliacao_id",
            put(fichas::avaliacao_put).delete(fichas::avaliacao_delete),
        )
        .route("/api/fichas/:id/finalizar", post(fichas::finalizar_post))
}

fn catalog_routes() -> Router<AppState> {
    use protected::catalog::{fases, instrumentos, programas};

    Router::new()
        // Instrumentos
        .route("/api/instrumentos", get(instrumentos::list).post(instrumentos::create))
        .route(
            "/api/instrumentos/:id",
            get(instrumentos::show).put(instrumentos::update).delete(instrumentos::remove),
        )
        // Fases and tópicos MSA
        .route("/api/fases", get(fases::list).post(fases::create))
        .route(
            "/api/fases/:id",
            get(fases::show).put(fases::update).delete(fases::remove),
        )
        .route("/api/fases/:id/topicos", get(fases::topicos_list).post(fases::topicos_create))
        .route("/api/topicos/:id", put(fases::topico_update).delete(fases::topico_remove))
        // Programa mínimo
        .route("/api/programa-minimo", get(programas::list).post(programas::create))
        .route(
            "/api/programa-minimo/:id",
            get(programas::show).put(programas::update).delete(programas::remove),
        )
        .route("/api/programa-minimo/:id/itens", post(programas::item_create))
        .route(
            "/api/programa-minimo/itens/:item_id",
            put(programas::item_update).delete(programas::item_remove),
        )
}

fn turma_routes() -> Router<AppState> {
    use protected::turmas;

    Router::new()
        .route("/api/turmas", get(turmas::collection_get).post(turmas::collection_post))
        .route(
            "/api/turmas/:id",
            get(turmas::record_get).put(turmas::record_put).delete(turmas::record_delete),
        )
        .route("/api/turmas/:id/alunos", post(turmas::membro_post))
        .route("/api/turmas/:id/alunos/:aluno_id", axum::routing::delete(turmas::membro_delete))
        .route("/api/turmas/:id/sessoes", get(turmas::sessoes_get).post(turmas::sessoes_post))
        .route(
            "/api/turmas/:id/sessoes/:sessao_id",
            get(turmas::sessao_get).put(turmas::sessao_put).delete(turmas::sessao_delete),
        )
        .route("/api/turmas/:id/sessoes/:sessao_id/presencas", put(turmas::presencas_put))
}

fn instrutor_routes() -> Router<AppState> {
    use protected::instrutores;

    Router::new()
        .route(
            "/api/instrutores",
            get(instrutores::collection_get).post(instrutores::collection_post),
        )
        .route(
            "/api/instrutores/:id",
            get(instrutores::record_get)
                .put(instrutores::record_put)
                .delete(instrutores::record_delete),
        )
}

fn relatorio_routes() -> Router<AppState> {
    use protected::relatorios;

    Router::new()
        .route("/api/relatorios/resumo", get(relatorios::resumo_get))
        .route("/api/relatorios/alunos/:id", get(relatorios::aluno_get))
        .route("/api/relatorios/turmas/:id/frequencia", get(relatorios::frequencia_get))
}

/// Explicit origins allow credentialed (cookie) requests; no origins falls back to permissive
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "MSA Acompanhamento API",
            "version": version,
            "description": "Acompanhamento de alunos do Programa Mínimo / MSA",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/login, /api/auth/register, /api/auth/logout (public); /api/auth/me, /api/auth/senha",
                "alunos": "/api/alunos[/:id]",
                "fichas": "/api/fichas[/:id][/aulas|/avaliacoes|/finalizar]",
                "catalogo": "/api/instrumentos, /api/fases, /api/topicos, /api/programa-minimo",
                "turmas": "/api/turmas[/:id][/alunos|/sessoes]",
                "instrutores": "/api/instrutores[/:id]",
                "relatorios": "/api/relatorios/*",
            }
        }
    }))
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Banco de dados indisponível",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

async fn fallback() -> ApiError {
    ApiError::not_found("Rota não encontrada")
}

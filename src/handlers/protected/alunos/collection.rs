use axum::{
    extract::{Query, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::Aluno;
use crate::database::repository::alunos::{self, AlunoFiltro, AlunoInput};
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};

use super::check_referencias;

impl Validate for AlunoInput {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.required_text("nome", &self.nome, 150)
            .required_text("congregacao", &self.congregacao, 150)
            .optional_text("telefone", self.telefone.as_deref(), 30)
            .optional_text("observacoes", self.observacoes.as_deref(), 2000);
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            v.email("email", email);
        }
        if let (Some(primario), Some(secundario)) = (self.instrutor_id, self.instrutor_secundario_id) {
            v.check(
                primario != secundario,
                "instrutorSecundarioId",
                "Instrutor secundário deve ser diferente do principal",
            );
        }
        v.finish()
    }
}

/// GET /api/alunos - List alunos visible to the caller
///
/// Filters: `faseId`, `instrumentoId`, `ativo`, `busca` (name substring).
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(filtro): Query<AlunoFiltro>,
) -> ApiResult<Vec<Aluno>> {
    let alunos = alunos::list(&state.pool, user.actor().scope(), &filtro).await?;
    Ok(ApiResponse::success(alunos))
}

/// POST /api/alunos - Create an aluno
///
/// An instrutor creating an aluno becomes its primary instrutor unless
/// `instrutorId` is given, and must remain primary or secondary.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(input): ValidatedJson<AlunoInput>,
) -> ApiResult<Aluno> {
    let actor = user.actor();

    let instrutor_id = input
        .instrutor_id
        .or(actor.instrutor_id)
        .ok_or_else(|| ApiError::invalid_field("instrutorId", "Campo obrigatório"))?;

    let owners: Vec<_> = std::iter::once(instrutor_id)
        .chain(input.instrutor_secundario_id)
        .collect();
    actor.ensure_access(&owners, "aluno")?;

    check_referencias(&state.pool, input.instrumento_id, input.fase_id, &owners).await?;

    let aluno = alunos::insert(&state.pool, &input, instrutor_id).await?;
    tracing::info!("Aluno {} created by {}", aluno.id, user.email);

    Ok(ApiResponse::created(aluno))
}

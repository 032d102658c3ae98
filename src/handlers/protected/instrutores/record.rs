use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{InstrutorDetalhe, Usuario};
use crate::database::repository::{instrumentos, instrutores, usuarios};
use crate::domain::registration::{self, LimitesAfetados};
use crate::domain::{Actor, Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::types::{nullable, Role};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrutorPatch {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub congregacao: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub telefone: Option<Option<String>>,
    pub instrumento_ids: Option<Vec<Uuid>>,
    /// ADMIN only
    pub role: Option<Role>,
    /// ADMIN only
    pub ativo: Option<bool>,
}

impl Validate for InstrutorPatch {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(nome) = &self.nome {
            v.required_text("nome", nome, 150);
        }
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        if let Some(congregacao) = &self.congregacao {
            v.required_text("congregacao", congregacao, 150);
        }
        v.optional_text("telefone", self.telefone.as_ref().and_then(|t| t.as_deref()), 30)
            .finish()
    }
}

impl InstrutorPatch {
    fn touches_account_status(&self) -> bool {
        self.role.is_some() || self.ativo.is_some()
    }
}

/// Global roles see every profile; an instrutor sees only their own
fn ensure_self_or_global(actor: &Actor, detalhe: &InstrutorDetalhe) -> Result<(), ApiError> {
    if actor.is_global() || actor.usuario_id == detalhe.usuario_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Você não tem permissão para acessar este instrutor"))
    }
}

async fn load_detalhe(state: &AppState, id: Uuid) -> Result<InstrutorDetalhe, ApiError> {
    instrutores::find_detalhe(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Instrutor não encontrado"))
}

/// GET /api/instrutores/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<InstrutorDetalhe> {
    let detalhe = load_detalhe(&state, id).await?;
    ensure_self_or_global(&user.actor(), &detalhe)?;
    Ok(ApiResponse::success(detalhe))
}

/// PUT /api/instrutores/:id - Update profile and account fields
///
/// `role` and `ativo` are ADMIN only. Becoming ENCARREGADO/ADMIN or moving
/// congregação re-runs the per-congregação caps.
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<InstrutorPatch>,
) -> ApiResult<InstrutorDetalhe> {
    let actor = user.actor();
    let detalhe = load_detalhe(&state, id).await?;
    ensure_self_or_global(&actor, &detalhe)?;
    if patch.touches_account_status() {
        actor.ensure_admin()?;
    }

    let usuario: Usuario = usuarios::find_by_id(&state.pool, detalhe.usuario_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Usuário não encontrado"))?;

    let email = match &patch.email {
        Some(email) => {
            let email = registration::normalize_email(email);
            if usuarios::email_taken_by_other(&state.pool, &email, usuario.id).await? {
                return Err(ApiError::conflict("Email já cadastrado"));
            }
            email
        }
        None => usuario.email.clone(),
    };
    let nome = patch.nome.as_deref().map(str::trim).unwrap_or(&usuario.nome).to_string();
    let congregacao = patch
        .congregacao
        .as_deref()
        .map(str::trim)
        .unwrap_or(&detalhe.congregacao)
        .to_string();
    let role = patch.role.unwrap_or(usuario.role);
    let ativo = patch.ativo.unwrap_or(usuario.ativo);
    let telefone = patch.telefone.clone().unwrap_or_else(|| detalhe.telefone.clone());

    if let Some(ids) = &patch.instrumento_ids {
        let ativos = instrumentos::active_ids(&state.pool, ids).await?;
        let invalidos = registration::instrumentos_invalidos(ids, &ativos);
        if !invalidos.is_empty() {
            let lista = invalidos.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ");
            return Err(ApiError::invalid_field(
                "instrumentoIds",
                format!("Instrumentos inválidos ou inativos: {}", lista),
            ));
        }
    }

    let mut tx = state.pool.begin().await?;

    let limites = LimitesAfetados::na_mudanca(usuario.role, role, congregacao != usuario.congregacao);
    if limites.algum() {
        let lotacao = usuarios::lotacao(&mut *tx, &congregacao).await?;
        limites.check(role, &congregacao, lotacao)?;
    }

    usuarios::update_conta(&mut *tx, usuario.id, &nome, &email, role, &congregacao, ativo).await?;
    instrutores::update(&mut *tx, detalhe.id, &congregacao, telefone.as_deref()).await?;
    if let Some(ids) = &patch.instrumento_ids {
        instrutores::set_instrumentos(&mut *tx, detalhe.id, ids).await?;
    }

    tx.commit().await?;

    if role != usuario.role || ativo != usuario.ativo {
        tracing::info!(
            "Account {} changed by {}: role {} -> {}, ativo {} -> {}",
            email,
            user.email,
            usuario.role,
            role,
            usuario.ativo,
            ativo
        );
    }

    let detalhe = load_detalhe(&state, id).await?;
    Ok(ApiResponse::success(detalhe))
}

/// DELETE /api/instrutores/:id - Remove the account (ADMIN only)
///
/// Refused with 409 while the instrutor is still primary for alunos, fichas
/// or turmas.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let actor = user.actor();
    actor.ensure_admin()?;

    let detalhe = load_detalhe(&state, id).await?;
    if detalhe.usuario_id == actor.usuario_id {
        return Err(ApiError::bad_request("Não é possível excluir o próprio usuário"));
    }

    if !usuarios::delete(&state.pool, detalhe.usuario_id).await? {
        return Err(ApiError::not_found("Instrutor não encontrado"));
    }
    tracing::info!("Instrutor {} deleted by {}", detalhe.email, user.email);

    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn detalhe(usuario_id: Uuid) -> InstrutorDetalhe {
        InstrutorDetalhe {
            id: Uuid::new_v4(),
            usuario_id,
            nome: "João".into(),
            email: "joao@ccb.org.br".into(),
            role: Role::Instrutor,
            ativo: true,
            congregacao: "Central".into(),
            telefone: None,
            instrumento_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn actor(role: Role) -> Actor {
        Actor {
            usuario_id: Uuid::new_v4(),
            role,
            instrutor_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn instrutor_can_only_see_own_profile() {
        let me = actor(Role::Instrutor);
        assert!(ensure_self_or_global(&me, &detalhe(me.usuario_id)).is_ok());
        assert!(ensure_self_or_global(&me, &detalhe(Uuid::new_v4())).is_err());
    }

    #[test]
    fn encarregado_sees_everyone() {
        assert!(ensure_self_or_global(&actor(Role::Encarregado), &detalhe(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn role_and_ativo_are_account_status() {
        let patch: InstrutorPatch = serde_json::from_value(json!({ "telefone": null })).unwrap();
        assert!(!patch.touches_account_status());
        assert_eq!(patch.telefone, Some(None));

        let patch: InstrutorPatch = serde_json::from_value(json!({ "ativo": false })).unwrap();
        assert!(patch.touches_account_status());
    }
}

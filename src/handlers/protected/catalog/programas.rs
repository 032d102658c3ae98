use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{ProgramaMinimo, ProgramaMinimoItem};
use crate::database::repository::instrumentos;
use crate::database::repository::programas::{self, ItemInput, ProgramaInput};
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::types::{nullable, NivelPrograma};

impl Validate for ProgramaInput {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("descricao", self.descricao.as_deref(), 2000)
            .finish()
    }
}

impl Validate for ItemInput {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("titulo", &self.titulo, 200)
            .check(self.ordem >= 0, "ordem", "Não pode ser negativa")
            .optional_text("descricao", self.descricao.as_deref(), 2000)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramaQuery {
    pub instrumento_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramaPatch {
    pub instrumento_id: Option<Uuid>,
    pub nivel: Option<NivelPrograma>,
    #[serde(default, deserialize_with = "nullable")]
    pub descricao: Option<Option<String>>,
}

impl Validate for ProgramaPatch {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("descricao", self.descricao.as_ref().and_then(|d| d.as_deref()), 2000)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub descricao: Option<Option<String>>,
    pub ordem: Option<i32>,
    pub obrigatorio: Option<bool>,
}

impl Validate for ItemPatch {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(titulo) = &self.titulo {
            v.required_text("titulo", titulo, 200);
        }
        if let Some(ordem) = self.ordem {
            v.check(ordem >= 0, "ordem", "Não pode ser negativa");
        }
        v.optional_text("descricao", self.descricao.as_ref().and_then(|d| d.as_deref()), 2000)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramaDetalhe {
    #[serde(flatten)]
    pub programa: ProgramaMinimo,
    pub itens: Vec<ProgramaMinimoItem>,
}

async fn ensure_instrumento(state: &AppState, instrumento_id: Uuid) -> Result<(), ApiError> {
    if instrumentos::find(&state.pool, instrumento_id).await?.is_none() {
        return Err(ApiError::invalid_field("instrumentoId", "Instrumento não encontrado"));
    }
    Ok(())
}

/// GET /api/programa-minimo - Filter: `instrumentoId`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProgramaQuery>,
) -> ApiResult<Vec<ProgramaMinimo>> {
    let programas = programas::list(&state.pool, query.instrumento_id).await?;
    Ok(ApiResponse::success(programas))
}

/// GET /api/programa-minimo/:id - Programa with its ordered itens
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<ProgramaDetalhe> {
    let programa = programas::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Programa mínimo não encontrado"))?;
    let itens = programas::list_itens(&state.pool, programa.id).await?;

    Ok(ApiResponse::success(ProgramaDetalhe { programa, itens }))
}

/// POST /api/programa-minimo - One programa per (instrumento, nivel)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(input): ValidatedJson<ProgramaInput>,
) -> ApiResult<ProgramaMinimo> {
    user.actor().ensure_global()?;
    ensure_instrumento(&state, input.instrumento_id).await?;

    if programas::find_by_nivel(&state.pool, input.instrumento_id, input.nivel)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(format!(
            "Já existe um programa mínimo {} para este instrumento",
            input.nivel
        )));
    }

    let programa = programas::insert(&state.pool, &input).await?;
    Ok(ApiResponse::created(programa))
}

/// PUT /api/programa-minimo/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<ProgramaPatch>,
) -> ApiResult<ProgramaMinimo> {
    user.actor().ensure_global()?;

    let mut programa = programas::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Programa mínimo não encontrado"))?;

    if let Some(instrumento_id) = patch.instrumento_id {
        ensure_instrumento(&state, instrumento_id).await?;
        programa.instrumento_id = instrumento_id;
    }
    if let Some(nivel) = patch.nivel {
        programa.nivel = nivel;
    }
    if let Some(descricao) = patch.descricao {
        programa.descricao = descricao;
    }

    let programa = programas::update(&state.pool, &programa).await?;
    Ok(ApiResponse::success(programa))
}

/// DELETE /api/programa-minimo/:id - Itens go with it
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.actor().ensure_global()?;

    if !programas::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Programa mínimo não encontrado"));
    }
    Ok(ApiResponse::no_content())
}

/// POST /api/programa-minimo/:id/itens
pub async fn item_create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<ItemInput>,
) -> ApiResult<ProgramaMinimoItem> {
    user.actor().ensure_global()?;

    if programas::find(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Programa mínimo não encontrado"));
    }
    let item = programas::insert_item(&state.pool, id, &input).await?;
    Ok(ApiResponse::created(item))
}

/// PUT /api/programa-minimo/itens/:item_id
pub async fn item_update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(item_id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<ItemPatch>,
) -> ApiResult<ProgramaMinimoItem> {
    user.actor().ensure_global()?;

    let mut item = programas::find_item(&state.pool, item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item não encontrado"))?;

    if let Some(titulo) = patch.titulo {
        item.titulo = titulo.trim().to_string();
    }
    if let Some(descricao) = patch.descricao {
        item.descricao = descricao;
    }
    if let Some(ordem) = patch.ordem {
        item.ordem = ordem;
    }
    if let Some(obrigatorio) = patch.obrigatorio {
        item.obrigatorio = obrigatorio;
    }

    let item = programas::update_item(&state.pool, &item).await?;
    Ok(ApiResponse::success(item))
}

/// DELETE /api/programa-minimo/itens/:item_id
pub async fn item_remove(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<()> {
    user.actor().ensure_global()?;

    if !programas::delete_item(&state.pool, item_id).await? {
        return Err(ApiError::not_found("Item não encontrado"));
    }
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_defaults_to_required() {
        let input: ItemInput = serde_json::from_value(json!({ "titulo": "Escala de Dó maior" })).unwrap();
        assert!(input.obrigatorio);
        assert_eq!(input.ordem, 0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn item_patch_rejects_blank_title() {
        let patch: ItemPatch = serde_json::from_value(json!({ "titulo": "" })).unwrap();
        assert!(patch.validate().is_err());

        assert!(ItemPatch::default().validate().is_ok());
    }

    #[test]
    fn programa_patch_distinguishes_null_descricao() {
        let patch: ProgramaPatch = serde_json::from_value(json!({ "descricao": null })).unwrap();
        assert_eq!(patch.descricao, Some(None));
        let patch: ProgramaPatch = serde_json::from_value(json!({ "nivel": "RJM" })).unwrap();
        assert_eq!(patch.descricao, None);
        assert_eq!(patch.nivel, Some(NivelPrograma::Rjm));
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::NivelPrograma;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProgramaMinimo {
    pub id: Uuid,
    pub instrumento_id: Uuid,
    #[sqlx(try_from = "String")]
    pub nivel: NivelPrograma,
    pub descricao: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProgramaMinimoItem {
    pub id: Uuid,
    pub programa_id: Uuid,
    pub ordem: i32,
    pub titulo: String,
    pub descricao: Option<String>,
    pub obrigatorio: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

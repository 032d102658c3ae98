use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::Role;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Instrutor {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub congregacao: String,
    pub telefone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Instrutor joined with its account and taught instruments
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InstrutorDetalhe {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub nome: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub ativo: bool,
    pub congregacao: String,
    pub telefone: Option<String>,
    pub instrumento_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

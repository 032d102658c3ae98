use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Fase {
    pub id: Uuid,
    pub nome: String,
    pub ordem: i32,
    pub descricao: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopicoMsa {
    pub id: Uuid,
    pub fase_id: Uuid,
    pub titulo: String,
    pub descricao: Option<String>,
    pub ordem: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::TipoAula;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FichaAcompanhamento {
    pub id: Uuid,
    pub aluno_id: Uuid,
    pub instrutor_id: Uuid,
    #[sqlx(try_from = "String")]
    pub tipo_aula: TipoAula,
    pub data_inicio: NaiveDate,
    pub media_final: Option<f64>,
    pub apto: Option<bool>,
    pub observacoes_finais: Option<String>,
    pub finalizada_em: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FichaAcompanhamento {
    pub fn is_finalizada(&self) -> bool {
        self.finalizada_em.is_some()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AulaRegistro {
    pub id: Uuid,
    pub ficha_id: Uuid,
    pub numero_aula: i32,
    pub data: NaiveDate,
    pub presenca: bool,
    pub conteudo: Option<String>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Avaliacao {
    pub id: Uuid,
    pub ficha_id: Uuid,
    pub numero: i32,
    pub data: Option<NaiveDate>,
    pub nota: Option<f64>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

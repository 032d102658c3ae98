use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Aluno {
    pub id: Uuid,
    pub nome: String,
    pub data_nascimento: Option<NaiveDate>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub congregacao: String,
    pub instrumento_id: Uuid,
    pub fase_id: Uuid,
    pub instrutor_id: Uuid,
    pub instrutor_secundario_id: Option<Uuid>,
    pub ativo: bool,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Aluno {
    /// Primary and, when set, secondary instrutor
    pub fn instrutores(&self) -> Vec<Uuid> {
        std::iter::once(self.instrutor_id)
            .chain(self.instrutor_secundario_id)
            .collect()
    }
}

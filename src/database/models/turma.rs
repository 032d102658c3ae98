use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Turma {
    pub id: Uuid,
    pub nome: String,
    pub descricao: Option<String>,
    pub instrutor_id: Uuid,
    pub instrutor_secundario_id: Option<Uuid>,
    pub instrumento_id: Option<Uuid>,
    pub fase_id: Option<Uuid>,
    pub ativa: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Turma {
    pub fn instrutores(&self) -> Vec<Uuid> {
        std::iter::once(self.instrutor_id)
            .chain(self.instrutor_secundario_id)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessaoAula {
    pub id: Uuid,
    pub turma_id: Uuid,
    pub data: NaiveDate,
    pub conteudo: Option<String>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PresencaSessao {
    pub sessao_id: Uuid,
    pub aluno_id: Uuid,
    pub presente: bool,
    pub observacao: Option<String>,
}

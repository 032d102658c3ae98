//! Aggregate read queries behind `/api/relatorios`.
//!
//! Every query takes the caller's instrutor scope; `None` covers all alunos.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contagem {
    pub id: Uuid,
    pub nome: String,
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TotaisAlunos {
    pub total: i64,
    pub ativos: i64,
}

#[derive(Debug, Clone, Default, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TotaisFichas {
    pub abertas: i64,
    pub finalizadas: i64,
    pub aptas: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FrequenciaAluno {
    pub aluno_id: Uuid,
    pub nome: String,
    pub sessoes: i64,
    pub presencas: i64,
    pub ausencias: i64,
}

/// Share of registered sessions attended, 0.0..=1.0; `None` with nothing registered
fn taxa_presenca(presencas: i64, registradas: i64) -> Option<f64> {
    (registradas > 0).then(|| presencas as f64 / registradas as f64)
}

impl FrequenciaAluno {
    pub fn taxa(&self) -> Option<f64> {
        taxa_presenca(self.presencas, self.presencas + self.ausencias)
    }
}

#[derive(Debug, Clone, Default, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PresencaTurmas {
    pub presencas: i64,
    pub registradas: i64,
}

impl PresencaTurmas {
    pub fn taxa(&self) -> Option<f64> {
        taxa_presenca(self.presencas, self.registradas)
    }
}

const ALUNO_SCOPE: &str = "($1::uuid IS NULL OR a.instrutor_id = $1 OR a.instrutor_secundario_id = $1)";

pub async fn totais_alunos(pool: &PgPool, scope: Option<Uuid>) -> Result<TotaisAlunos, DatabaseError> {
    let sql = format!(
        "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE a.ativo) AS ativos
         FROM alunos a WHERE {ALUNO_SCOPE}"
    );
    let totais = sqlx::query_as::<_, TotaisAlunos>(&sql)
        .bind(scope)
        .fetch_one(pool)
        .await?;

    Ok(totais)
}

pub async fn alunos_por_fase(pool: &PgPool, scope: Option<Uuid>) -> Result<Vec<Contagem>, DatabaseError> {
    let sql = format!(
        "SELECT f.id, f.nome, COUNT(a.id) AS total
         FROM fases f
         LEFT JOIN alunos a ON a.fase_id = f.id AND a.ativo AND {ALUNO_SCOPE}
         GROUP BY f.id, f.nome, f.ordem
         ORDER BY f.ordem"
    );
    let contagens = sqlx::query_as::<_, Contagem>(&sql)
        .bind(scope)
        .fetch_all(pool)
        .await?;

    Ok(contagens)
}

pub async fn alunos_por_instrumento(pool: &PgPool, scope: Option<Uuid>) -> Result<Vec<Contagem>, DatabaseError> {
    let sql = format!(
        "SELECT i.id, i.nome, COUNT(a.id) AS total
         FROM instrumentos i
         LEFT JOIN alunos a ON a.instrumento_id = i.id AND a.ativo AND {ALUNO_SCOPE}
         GROUP BY i.id, i.nome
         ORDER BY i.nome"
    );
    let contagens = sqlx::query_as::<_, Contagem>(&sql)
        .bind(scope)
        .fetch_all(pool)
        .await?;

    Ok(contagens)
}

pub async fn totais_fichas(pool: &PgPool, scope: Option<Uuid>) -> Result<TotaisFichas, DatabaseError> {
    let totais = sqlx::query_as::<_, TotaisFichas>(
        "SELECT COUNT(*) FILTER (WHERE f.finalizada_em IS NULL) AS abertas,
                COUNT(*) FILTER (WHERE f.finalizada_em IS NOT NULL) AS finalizadas,
                COUNT(*) FILTER (WHERE f.finalizada_em IS NOT NULL AND f.apto) AS aptas
         FROM fichas_acompanhamento f
         JOIN alunos a ON a.id = f.aluno_id
         WHERE ($1::uuid IS NULL OR f.instrutor_id = $1 OR a.instrutor_id = $1 OR a.instrutor_secundario_id = $1)",
    )
    .bind(scope)
    .fetch_one(pool)
    .await?;

    Ok(totais)
}

pub async fn turmas_ativas(pool: &PgPool, scope: Option<Uuid>) -> Result<i64, DatabaseError> {
    let (total,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM turmas
         WHERE ativa AND ($1::uuid IS NULL OR instrutor_id = $1 OR instrutor_secundario_id = $1)",
    )
    .bind(scope)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// Attendance of one aluno across every turma session where it was registered
pub async fn presenca_em_turmas(pool: &PgPool, aluno_id: Uuid) -> Result<PresencaTurmas, DatabaseError> {
    let presenca = sqlx::query_as::<_, PresencaTurmas>(
        "SELECT COUNT(*) FILTER (WHERE presente) AS presencas, COUNT(*) AS registradas
         FROM presencas_sessao
         WHERE aluno_id = $1",
    )
    .bind(aluno_id)
    .fetch_one(pool)
    .await?;

    Ok(presenca)
}

/// One row per current member; sessions without a register entry count for neither column
pub async fn frequencia_turma(pool: &PgPool, turma_id: Uuid) -> Result<Vec<FrequenciaAluno>, DatabaseError> {
    let linhas = sqlx::query_as::<_, FrequenciaAluno>(
        "SELECT a.id AS aluno_id, a.nome,
                (SELECT COUNT(*) FROM sessoes_aula s WHERE s.turma_id = $1) AS sessoes,
                COUNT(p.aluno_id) FILTER (WHERE p.presente) AS presencas,
                COUNT(p.aluno_id) FILTER (WHERE NOT p.presente) AS ausencias
         FROM turma_alunos ta
         JOIN alunos a ON a.id = ta.aluno_id
         LEFT JOIN sessoes_aula s ON s.turma_id = ta.turma_id
         LEFT JOIN presencas_sessao p ON p.sessao_id = s.id AND p.aluno_id = a.id
         WHERE ta.turma_id = $1
         GROUP BY a.id, a.nome
         ORDER BY a.nome",
    )
    .bind(turma_id)
    .fetch_all(pool)
    .await?;

    Ok(linhas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linha(presencas: i64, ausencias: i64) -> FrequenciaAluno {
        FrequenciaAluno {
            aluno_id: Uuid::new_v4(),
            nome: "Ana".to_string(),
            sessoes: 10,
            presencas,
            ausencias,
        }
    }

    #[test]
    fn taxa_ignores_unregistered_sessions() {
        assert_eq!(linha(3, 1).taxa(), Some(0.75));
        assert_eq!(linha(0, 0).taxa(), None);
    }

    #[test]
    fn aluno_rate_matches_turma_rate() {
        let total = PresencaTurmas { presencas: 3, registradas: 4 };
        assert_eq!(total.taxa(), linha(3, 1).taxa());
        assert_eq!(PresencaTurmas::default().taxa(), None);
    }
}

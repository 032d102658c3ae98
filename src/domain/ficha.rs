//! Ficha de acompanhamento evaluation and finalization rules.

use serde::Serialize;

use super::DomainError;
use crate::database::models::{AulaRegistro, Avaliacao, FichaAcompanhamento};

/// Minimum average for `aprovadoPorMedia`
pub const MEDIA_MINIMA: f64 = 7.0;
/// Minimum attended lessons for `aprovadoPorPresenca`
pub const PRESENCAS_MINIMAS: usize = 15;
/// Lesson entries are numbered 1..=MAX_AULAS
pub const MAX_AULAS: i32 = 20;
/// Evaluations are numbered 1..=MAX_AVALIACOES
pub const MAX_AVALIACOES: i32 = 3;
pub const NOTA_MINIMA: f64 = 0.0;
pub const NOTA_MAXIMA: f64 = 10.0;

/// Computed summary of a ficha. Advisory only: the stored `apto` is whatever
/// the instrutor submits at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumoFicha {
    pub media: Option<f64>,
    pub aprovado_por_media: bool,
    pub aprovado_por_presenca: bool,
    pub total_presencas: usize,
    pub total_aulas: usize,
    pub avaliacoes_com_nota: usize,
}

/// Mean of the scored evaluations; `None` when nothing is scored
pub fn media<I>(notas: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (soma, quantidade) = notas
        .into_iter()
        .flatten()
        .fold((0.0_f64, 0_usize), |(soma, n), nota| (soma + nota, n + 1));

    (quantidade > 0).then(|| soma / quantidade as f64)
}

impl ResumoFicha {
    pub fn calcular<P, N>(presencas: P, notas: N) -> Self
    where
        P: IntoIterator<Item = bool>,
        N: IntoIterator<Item = Option<f64>>,
    {
        let (total_aulas, total_presencas) = presencas
            .into_iter()
            .fold((0, 0), |(aulas, presentes), presente| (aulas + 1, presentes + usize::from(presente)));

        let notas: Vec<Option<f64>> = notas.into_iter().collect();
        let avaliacoes_com_nota = notas.iter().filter(|n| n.is_some()).count();
        let media = media(notas);

        Self {
            media,
            aprovado_por_media: media.is_some_and(|m| m >= MEDIA_MINIMA),
            aprovado_por_presenca: total_presencas >= PRESENCAS_MINIMAS,
            total_presencas,
            total_aulas,
            avaliacoes_com_nota,
        }
    }

    pub fn from_registros(aulas: &[AulaRegistro], avaliacoes: &[Avaliacao]) -> Self {
        Self::calcular(
            aulas.iter().map(|a| a.presenca),
            avaliacoes.iter().map(|a| a.nota),
        )
    }
}

/// Aulas and avaliações of a finalized ficha are frozen, and it cannot be finalized twice
pub fn ensure_aberta(ficha: &FichaAcompanhamento) -> Result<(), DomainError> {
    if ficha.is_finalizada() {
        return Err(DomainError::FichaFinalizada);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::types::TipoAula;

    fn ficha(finalizada: bool) -> FichaAcompanhamento {
        FichaAcompanhamento {
            id: Uuid::new_v4(),
            aluno_id: Uuid::new_v4(),
            instrutor_id: Uuid::new_v4(),
            tipo_aula: TipoAula::Teoria,
            data_inicio: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            media_final: None,
            apto: None,
            observacoes_finais: None,
            finalizada_em: finalizada.then(Utc::now),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn media_ignores_unscored_evaluations() {
        let m = media([Some(8.0), None, Some(6.0)]).unwrap();
        assert!((m - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn media_is_sum_over_count() {
        let notas = [Some(9.5), Some(7.25), Some(4.0)];
        let expected = (9.5 + 7.25 + 4.0) / 3.0;
        assert!((media(notas).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn media_is_undefined_without_scores() {
        assert_eq!(media([None, None]), None);
        assert_eq!(media(Vec::new()), None);
    }

    #[test]
    fn media_threshold_is_inclusive() {
        let resumo = ResumoFicha::calcular(Vec::new(), [Some(7.0)]);
        assert!(resumo.aprovado_por_media);

        let resumo = ResumoFicha::calcular(Vec::new(), [Some(6.99)]);
        assert!(!resumo.aprovado_por_media);
    }

    #[test]
    fn no_scores_never_approves_by_media() {
        let resumo = ResumoFicha::calcular(vec![true; 20], [None, None, None]);
        assert_eq!(resumo.media, None);
        assert!(!resumo.aprovado_por_media);
        assert!(resumo.aprovado_por_presenca);
    }

    #[test]
    fn presence_threshold_counts_only_attended_lessons() {
        let mut presencas = vec![true; 14];
        presencas.extend([false; 6]);
        let resumo = ResumoFicha::calcular(presencas.clone(), []);
        assert_eq!(resumo.total_aulas, 20);
        assert_eq!(resumo.total_presencas, 14);
        assert!(!resumo.aprovado_por_presenca);

        presencas[14] = true;
        let resumo = ResumoFicha::calcular(presencas, []);
        assert_eq!(resumo.total_presencas, 15);
        assert!(resumo.aprovado_por_presenca);
    }

    #[test]
    fn counts_scored_evaluations() {
        let resumo = ResumoFicha::calcular([], [Some(10.0), None, Some(0.0)]);
        assert_eq!(resumo.avaliacoes_com_nota, 2);
        assert_eq!(resumo.media, Some(5.0));
    }

    #[test]
    fn finalized_ficha_is_closed() {
        assert_eq!(ensure_aberta(&ficha(true)), Err(DomainError::FichaFinalizada));
        assert_eq!(ensure_aberta(&ficha(false)), Ok(()));
    }
}

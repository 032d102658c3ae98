//! Catalog fixtures.
//!
//! ```yaml
//! instrumentos:
//!   - nome: Violino
//!     categoria: Cordas
//! fases:
//!   - nome: Fase 1
//!     ordem: 1
//!     topicos:
//!       - titulo: Pulsação e compasso
//! programas:
//!   - instrumento: Violino
//!     nivel: RJM
//!     itens:
//!       - titulo: Escala de Sol maior
//! ```
//!
//! Rows that already exist (same instrumento nome, fase ordem, or
//! instrumento/nível pair) are skipped, so a fixture can be re-applied.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::repository::fases::{self, FaseInput, TopicoInput};
use crate::database::repository::instrumentos::{self, InstrumentoInput};
use crate::database::repository::programas::{self, ItemInput, ProgramaInput};
use crate::database::DatabaseError;
use crate::types::NivelPrograma;

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub instrumentos: Vec<InstrumentoInput>,
    #[serde(default)]
    pub fases: Vec<FaseFixture>,
    #[serde(default)]
    pub programas: Vec<ProgramaFixture>,
}

#[derive(Debug, Deserialize)]
pub struct FaseFixture {
    #[serde(flatten)]
    pub fase: FaseInput,
    #[serde(default)]
    pub topicos: Vec<TopicoInput>,
}

#[derive(Debug, Deserialize)]
pub struct ProgramaFixture {
    /// Instrumento nome, matched case-insensitively
    pub instrumento: String,
    pub nivel: NivelPrograma,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub itens: Vec<ItemInput>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub instrumentos: usize,
    pub fases: usize,
    pub topicos: usize,
    pub programas: usize,
    pub itens: usize,
    pub ignorados: usize,
}

pub fn parse(yaml: &str) -> anyhow::Result<Fixture> {
    let fixture: Fixture = serde_yaml::from_str(yaml)?;
    Ok(fixture)
}

pub async fn handle(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&file)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", file.display(), e))?;
    let fixture = parse(&content)?;

    let pool = super::connect().await?;
    let report = apply(&pool, &fixture).await?;

    output_success(
        output_format,
        &format!(
            "Seeded {} instrumentos, {} fases ({} tópicos), {} programas ({} itens); {} skipped",
            report.instrumentos, report.fases, report.topicos, report.programas, report.itens, report.ignorados
        ),
        Some(json!({ "report": report })),
    )
}

/// `Ok(None)` when the row already exists
fn skip_existing<T>(result: Result<T, DatabaseError>) -> Result<Option<T>, DatabaseError> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(DatabaseError::UniqueViolation(msg)) => {
            tracing::info!("Skipping existing row: {}", msg);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub async fn apply(pool: &PgPool, fixture: &Fixture) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    for input in &fixture.instrumentos {
        match skip_existing(instrumentos::insert(pool, input).await)? {
            Some(_) => report.instrumentos += 1,
            None => report.ignorados += 1,
        }
    }

    for item in &fixture.fases {
        match skip_existing(fases::insert(pool, &item.fase).await)? {
            Some(fase) => {
                report.fases += 1;
                for topico in &item.topicos {
                    fases::insert_topico(pool, fase.id, topico).await?;
                    report.topicos += 1;
                }
            }
            None => report.ignorados += 1,
        }
    }

    let por_nome: HashMap<String, Uuid> = instrumentos::list(pool, false)
        .await?
        .into_iter()
        .map(|i| (i.nome.to_lowercase(), i.id))
        .collect();

    for item in &fixture.programas {
        let instrumento_id = por_nome
            .get(&item.instrumento.trim().to_lowercase())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("programa references unknown instrumento '{}'", item.instrumento))?;

        if programas::find_by_nivel(pool, instrumento_id, item.nivel).await?.is_some() {
            report.ignorados += 1;
            continue;
        }

        let programa = programas::insert(
            pool,
            &ProgramaInput {
                instrumento_id,
                nivel: item.nivel,
                descricao: item.descricao.clone(),
            },
        )
        .await?;
        report.programas += 1;

        for input in &item.itens {
            programas::insert_item(pool, programa.id, input).await?;
            report.itens += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
instrumentos:
  - nome: Violino
    categoria: Cordas
  - nome: Trompete
    ativo: false
fases:
  - nome: Fase 1
    ordem: 1
    topicos:
      - titulo: Pulsação
      - titulo: Compasso simples
        ordem: 2
programas:
  - instrumento: violino
    nivel: CULTO_OFICIAL
    itens:
      - titulo: Hinos 1 a 50
        obrigatorio: false
"#;

    #[test]
    fn parses_a_full_fixture() {
        let fixture = parse(FIXTURE).unwrap();

        assert_eq!(fixture.instrumentos.len(), 2);
        assert!(fixture.instrumentos[0].ativo);
        assert!(!fixture.instrumentos[1].ativo);

        assert_eq!(fixture.fases[0].fase.ordem, 1);
        assert_eq!(fixture.fases[0].topicos.len(), 2);
        assert_eq!(fixture.fases[0].topicos[1].ordem, 2);

        let programa = &fixture.programas[0];
        assert_eq!(programa.nivel, NivelPrograma::CultoOficial);
        assert!(!programa.itens[0].obrigatorio);
    }

    #[test]
    fn sections_are_optional() {
        let fixture = parse("instrumentos: []").unwrap();
        assert!(fixture.fases.is_empty());
        assert!(fixture.programas.is_empty());
    }

    #[test]
    fn unknown_nivel_is_rejected() {
        let yaml = "programas:\n  - instrumento: Violino\n    nivel: AVANCADO\n";
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn unique_violations_are_skipped() {
        let skipped = skip_existing::<()>(Err(DatabaseError::UniqueViolation("nome".into()))).unwrap();
        assert!(skipped.is_none());
        assert!(skip_existing::<()>(Err(DatabaseError::ConfigMissing("DATABASE_URL"))).is_err());
    }
}

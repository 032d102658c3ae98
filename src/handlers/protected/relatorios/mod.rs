// handlers/protected/relatorios/mod.rs - Read-only progress reports
//
// INSTRUTOR callers get figures for their own alunos and turmas only.

pub mod aluno;
pub mod frequencia;
pub mod resumo;

pub use aluno::get as aluno_get;
pub use frequencia::get as frequencia_get;
pub use resumo::get as resumo_get;

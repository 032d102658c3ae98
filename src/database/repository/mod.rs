//! SQL access, one module per aggregate.
//!
//! Functions that may run inside a transaction take any `PgExecutor`; the rest
//! take the pool directly.

pub mod alunos;
pub mod fases;
pub mod fichas;
pub mod instrumentos;
pub mod instrutores;
pub mod programas;
pub mod relatorios;
pub mod turmas;
pub mod usuarios;

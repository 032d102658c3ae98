// handlers/protected/mod.rs - Protected handlers (session required)
//
// Every route here sits behind `session_auth_middleware` and
// `validate_user_middleware`; handlers receive the caller as
// `Extension<SessionUser>` and check record ownership themselves.

pub mod alunos; // Aluno CRUD
pub mod auth; // Current session and password change
pub mod catalog; // Instrumentos, fases/tópicos, programa mínimo
pub mod fichas; // Fichas de acompanhamento, aulas, avaliações, finalização
pub mod instrutores; // Instrutor profiles and admin account creation
pub mod relatorios; // Aggregate reports
pub mod turmas; // Turmas, membership, sessões, presenças

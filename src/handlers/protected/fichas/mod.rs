// handlers/protected/fichas/mod.rs - Ficha de acompanhamento endpoints
//
// A ficha is owned by its own instrutor and by the aluno's instrutores.
// Once finalized, the ficha and its aulas/avaliações are read-only.

pub mod aulas;
pub mod avaliacoes;
pub mod collection;
pub mod finalizar;
pub mod record;

pub use aulas::delete as aula_delete;
pub use aulas::list as aulas_get;
pub use aulas::post as aulas_post;
pub use aulas::put as aula_put;
pub use avaliacoes::delete as avaliacao_delete;
pub use avaliacoes::list as avaliacoes_get;
pub use avaliacoes::post as avaliacoes_post;
pub use avaliacoes::put as avaliacao_put;
pub use collection::get as collection_get;
pub use collection::post as collection_post;
pub use finalizar::post as finalizar_post;
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;

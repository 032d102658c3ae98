pub mod aluno;
pub mod fase;
pub mod ficha;
pub mod instrumento;
pub mod instrutor;
pub mod programa;
pub mod turma;
pub mod usuario;

pub use aluno::Aluno;
pub use fase::{Fase, TopicoMsa};
pub use ficha::{AulaRegistro, Avaliacao, FichaAcompanhamento};
pub use instrumento::Instrumento;
pub use instrutor::{Instrutor, InstrutorDetalhe};
pub use programa::{ProgramaMinimo, ProgramaMinimoItem};
pub use turma::{PresencaSessao, SessaoAula, Turma};
pub use usuario::Usuario;

// handlers/protected/catalog/mod.rs - Curriculum catalog endpoints
//
// Reads are open to any session; writes require ADMIN or ENCARREGADO.

pub mod fases;
pub mod instrumentos;
pub mod programas;

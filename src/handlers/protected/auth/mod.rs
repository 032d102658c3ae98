// handlers/protected/auth/mod.rs - Authenticated account endpoints

pub mod senha;
pub mod session;

pub use senha::put as senha_put;
pub use session::me as me_get;

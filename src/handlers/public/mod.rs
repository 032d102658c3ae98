// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Session acquisition and self-registration. Inputs come from anonymous
// callers, so every payload goes through `ValidatedJson`.

pub mod auth;

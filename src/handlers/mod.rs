// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (session cookie or Bearer token).
// Protected routes receive the caller as `Extension<SessionUser>`.

pub mod protected; // Tier 2: session required (/api/*)
pub mod public; // Tier 1: no authentication (/api/auth/login, register, logout)

// handlers/public/auth/mod.rs - Public authentication handlers

pub mod login; // POST /api/auth/login - verify credentials, set session cookie
pub mod logout; // POST /api/auth/logout - clear session cookie
pub mod register; // POST /api/auth/register - self-registration

pub use login::login_post;
pub use logout::logout_post;
pub use register::register_post;

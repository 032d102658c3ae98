// handlers/protected/instrutores/mod.rs - Instrutor account endpoints
//
// Listing is for ADMIN and ENCARREGADO, creation and deletion for ADMIN.
// Every instrutor may read and edit their own profile.

pub mod collection;
pub mod record;

pub use collection::get as collection_get;
pub use collection::post as collection_post;
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;

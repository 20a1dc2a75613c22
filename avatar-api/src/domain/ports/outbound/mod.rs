mod avatar_codec;
mod content_store;
mod default_avatar;
mod user_repository;

pub use avatar_codec::*;
pub use content_store::*;
pub use default_avatar::*;
pub use user_repository::*;

//! In-memory adapters for tests.

mod content_store;
mod user_repository;

pub use content_store::MockContentStore;
pub use user_repository::MockUserRepository;

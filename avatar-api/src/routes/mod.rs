pub(crate) mod avatars;
pub(crate) mod error;
pub(crate) mod users;

pub(crate) use error::ApiError;

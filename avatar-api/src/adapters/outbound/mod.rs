pub mod filesystem;
pub mod media;
pub mod postgres;

#[cfg(test)]
pub mod mock;

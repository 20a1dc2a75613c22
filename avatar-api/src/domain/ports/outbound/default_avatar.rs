use crate::domain::models::AvatarImage;

pub trait DefaultAvatarGenerator: Send + Sync + 'static {
    /// Same seed, same bytes.
    fn generate(&self, seed: &str) -> AvatarImage;
}

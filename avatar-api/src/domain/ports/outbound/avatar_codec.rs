use crate::domain::{models::NormalizedAvatar, AvatarError};

pub trait AvatarCodec: Send + Sync + 'static {
    /// Validate raw upload bytes and convert them to the stored representation.
    fn normalize(&self, input: &[u8]) -> Result<NormalizedAvatar, AvatarError>;

    /// MIME type of everything `normalize` produces.
    fn mime_type(&self) -> &str;
}

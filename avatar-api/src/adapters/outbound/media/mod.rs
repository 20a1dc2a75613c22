mod avatar_codec;
mod identicon;

pub use avatar_codec::{CodecConfigError, WebpAvatarCodec};
pub use identicon::IdenticonGenerator;

use image::RgbaImage;

pub(crate) const WEBP_MIME: &str = "image/webp";

pub(crate) fn encode_webp(rgba: &RgbaImage, quality: f32) -> Vec<u8> {
    let (width, height) = rgba.dimensions();
    let encoder = webp::Encoder::from_rgba(rgba, width, height);
    encoder.encode(quality).to_vec()
}

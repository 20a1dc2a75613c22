use std::io::Cursor;

use image::{imageops::FilterType, ImageFormat, ImageReader, Limits};
use thiserror::Error;

use super::{encode_webp, WEBP_MIME};
use crate::{
    config::AvatarSettings,
    domain::{models::NormalizedAvatar, ports::outbound::AvatarCodec, AvatarError},
};

#[derive(Debug, Error)]
pub enum CodecConfigError {
    #[error("unknown image format in allowed_formats: {0}")]
    UnknownFormat(String),
    #[error("rendered_size must be greater than zero")]
    ZeroRenderedSize,
}

/// Crops uploads to a centered square, scales them to `rendered_size` and
/// re-encodes them as WebP.
#[derive(Debug, Clone)]
pub struct WebpAvatarCodec {
    max_bytes: usize,
    max_dimension: u32,
    rendered_size: u32,
    quality: f32,
    allowed_formats: Vec<ImageFormat>,
}

impl WebpAvatarCodec {
    pub fn new(
        max_bytes: usize,
        max_dimension: u32,
        rendered_size: u32,
        quality: f32,
        allowed_formats: Vec<ImageFormat>,
    ) -> Self {
        Self {
            max_bytes,
            max_dimension,
            rendered_size,
            quality,
            allowed_formats,
        }
    }

    pub fn from_settings(settings: &AvatarSettings) -> Result<Self, CodecConfigError> {
        if settings.rendered_size == 0 {
            return Err(CodecConfigError::ZeroRenderedSize);
        }

        let allowed_formats = settings
            .allowed_formats
            .iter()
            .map(|name| {
                ImageFormat::from_extension(name.trim().to_lowercase())
                    .ok_or_else(|| CodecConfigError::UnknownFormat(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(
            settings.max_bytes,
            settings.max_dimension,
            settings.rendered_size,
            settings.quality,
            allowed_formats,
        ))
    }

    fn decode_limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_dimension);
        limits.max_image_height = Some(self.max_dimension);
        limits
    }
}

impl AvatarCodec for WebpAvatarCodec {
    fn normalize(&self, input: &[u8]) -> Result<NormalizedAvatar, AvatarError> {
        if input.len() > self.max_bytes {
            return Err(AvatarError::ImageTooLarge {
                size: input.len(),
                limit: self.max_bytes,
            });
        }

        let format = image::guess_format(input)
            .map_err(|_| AvatarError::invalid_image("unrecognized image format"))?;
        if !self.allowed_formats.contains(&format) {
            return Err(AvatarError::invalid_image(format!(
                "{format:?} images are not accepted"
            )));
        }

        // Header only, so oversized images are rejected before any pixel
        // data is decoded.
        let (width, height) = ImageReader::with_format(Cursor::new(input), format)
            .into_dimensions()
            .map_err(|err| AvatarError::invalid_image(err.to_string()))?;
        if width == 0 || height == 0 {
            return Err(AvatarError::invalid_image("image has no pixels"));
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(AvatarError::invalid_image(format!(
                "image is {width}x{height}, limit is {0}x{0}",
                self.max_dimension
            )));
        }

        let mut reader = ImageReader::with_format(Cursor::new(input), format);
        reader.limits(self.decode_limits());
        let image = reader
            .decode()
            .map_err(|err| AvatarError::invalid_image(err.to_string()))?;

        let side = image.width().min(image.height());
        let x = (image.width() - side) / 2;
        let y = (image.height() - side) / 2;
        let squared = image.crop_imm(x, y, side, side).resize_exact(
            self.rendered_size,
            self.rendered_size,
            FilterType::Lanczos3,
        );

        let webp = encode_webp(&squared.to_rgba8(), self.quality);
        Ok(NormalizedAvatar::new(webp, WEBP_MIME))
    }

    fn mime_type(&self) -> &str {
        WEBP_MIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AvatarKey;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    fn codec() -> WebpAvatarCodec {
        WebpAvatarCodec::new(
            1024 * 1024,
            512,
            64,
            80.0,
            vec![ImageFormat::Png, ImageFormat::Jpeg],
        )
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn normalizes_to_square_webp() {
        let normalized = codec().normalize(&png(120, 80)).unwrap();

        assert_eq!(normalized.image.mime_type, "image/webp");
        assert_eq!(
            image::guess_format(&normalized.image.bytes).unwrap(),
            ImageFormat::WebP
        );
        let decoded = image::load_from_memory(&normalized.image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
        assert_eq!(normalized.key, AvatarKey::compute(&normalized.image.bytes));
    }

    #[test]
    fn accepts_every_allowed_format() {
        assert!(codec().normalize(&jpeg(32, 32)).is_ok());
        assert!(codec().normalize(&png(32, 32)).is_ok());
    }

    #[test]
    fn same_input_yields_same_key() {
        let input = png(40, 40);
        let first = codec().normalize(&input).unwrap();
        let second = codec().normalize(&input).unwrap();
        assert_eq!(first.key, second.key);
        assert_eq!(first.image.bytes, second.image.bytes);
    }

    #[test]
    fn rejects_garbage() {
        let err = codec().normalize(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AvatarError::InvalidImage(_)));
    }

    #[test]
    fn rejects_truncated_image() {
        let mut input = png(64, 64);
        input.truncate(input.len() / 2);
        let err = codec().normalize(&input).unwrap_err();
        assert!(matches!(err, AvatarError::InvalidImage(_)));
    }

    #[test]
    fn rejects_oversized_payload() {
        let codec = WebpAvatarCodec::new(100, 512, 64, 80.0, vec![ImageFormat::Png]);
        let err = codec.normalize(&png(64, 64)).unwrap_err();
        assert!(matches!(err, AvatarError::ImageTooLarge { limit: 100, .. }));
    }

    #[test]
    fn rejects_disallowed_format() {
        let codec = WebpAvatarCodec::new(1024 * 1024, 512, 64, 80.0, vec![ImageFormat::Jpeg]);
        let err = codec.normalize(&png(16, 16)).unwrap_err();
        assert!(matches!(err, AvatarError::InvalidImage(_)));
    }

    #[test]
    fn rejects_oversized_dimensions() {
        let codec = WebpAvatarCodec::new(1024 * 1024, 64, 32, 80.0, vec![ImageFormat::Png]);
        let err = codec.normalize(&png(100, 10)).unwrap_err();
        assert!(matches!(err, AvatarError::InvalidImage(_)));
    }

    #[test]
    fn settings_with_unknown_format_are_rejected() {
        let settings = AvatarSettings {
            allowed_formats: vec!["png".to_string(), "bmpx".to_string()],
            ..AvatarSettings::default()
        };
        assert!(matches!(
            WebpAvatarCodec::from_settings(&settings),
            Err(CodecConfigError::UnknownFormat(name)) if name == "bmpx"
        ));
    }

    #[test]
    fn settings_map_format_names() {
        let settings = AvatarSettings {
            allowed_formats: vec!["PNG".to_string(), "jpg".to_string()],
            ..AvatarSettings::default()
        };
        let codec = WebpAvatarCodec::from_settings(&settings).unwrap();
        assert_eq!(
            codec.allowed_formats,
            vec![ImageFormat::Png, ImageFormat::Jpeg]
        );
    }
}

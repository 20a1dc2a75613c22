use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

use super::{encode_webp, WEBP_MIME};
use crate::domain::{models::AvatarImage, ports::outbound::DefaultAvatarGenerator};

const GRID: u32 = 5;
const BACKGROUND: Rgba<u8> = Rgba([240, 240, 240, 255]);

/// Renders a horizontally mirrored 5x5 identicon from a SHA-256 of the seed.
#[derive(Debug, Clone)]
pub struct IdenticonGenerator {
    size: u32,
    quality: f32,
}

impl IdenticonGenerator {
    pub fn new(size: u32, quality: f32) -> Self {
        Self { size, quality }
    }

    fn cells(digest: &[u8]) -> [[bool; GRID as usize]; GRID as usize] {
        let mut cells = [[false; GRID as usize]; GRID as usize];
        let half = (GRID as usize).div_ceil(2);

        for (row, cells_row) in cells.iter_mut().enumerate() {
            for col in 0..half {
                let filled = digest[3 + row * half + col] & 1 == 1;
                cells_row[col] = filled;
                cells_row[GRID as usize - 1 - col] = filled;
            }
        }

        cells
    }

    fn render(&self, digest: &[u8]) -> RgbaImage {
        // Keep channels in the mid range so the glyph contrasts with the background.
        let foreground = Rgba([
            48 + digest[0] % 160,
            48 + digest[1] % 160,
            48 + digest[2] % 160,
            255,
        ]);
        let cells = Self::cells(digest);
        let padding = self.size / 10;
        let cell = ((self.size - 2 * padding) / GRID).max(1);

        RgbaImage::from_fn(self.size, self.size, |x, y| {
            if x < padding || y < padding {
                return BACKGROUND;
            }
            let col = (x - padding) / cell;
            let row = (y - padding) / cell;
            if col < GRID && row < GRID && cells[row as usize][col as usize] {
                foreground
            } else {
                BACKGROUND
            }
        })
    }
}

impl DefaultAvatarGenerator for IdenticonGenerator {
    fn generate(&self, seed: &str) -> AvatarImage {
        let digest = Sha256::digest(seed.as_bytes());
        let rgba = self.render(&digest);
        AvatarImage::new(encode_webp(&rgba, self.quality), WEBP_MIME)
    }
}

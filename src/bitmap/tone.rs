use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Monochrome toning applied to a photo before it is encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Warm brown tritone.
    #[default]
    Sepia,
    /// Plain grayscale.
    Gray,
}

/// Tone `img`, keeping its alpha channel.
pub fn apply_tone(img: RgbaImage, tone: Tone) -> RgbaImage {
    let luma = DynamicImage::ImageRgba8(img).to_luma_alpha8();
    RgbaImage::from_fn(luma.width(), luma.height(), |x, y| {
        let [l, a] = luma.get_pixel(x, y).0;
        let [r, g, b] = match tone {
            Tone::Gray => [l; 3],
            Tone::Sepia => sepia(l),
        };
        Rgba([r, g, b, a])
    })
}

fn sepia(level: u8) -> [u8; 3] {
    let [_, r, g, b] = SEPIA[usize::from(level)].to_be_bytes();
    [r, g, b]
}

/// Gray level to RGB, a tritone sepia ramp.
const SEPIA: [u32; 256] = [
    0x200202, 0x200202, 0x210302, 0x220403, 0x230403, 0x240503, 0x240503, 0x250603,
    0x260603, 0x270703, 0x290804, 0x2a0904, 0x2b0905, 0x2c0a05, 0x2d0b05, 0x2f0b06,
    0x2f0d06, 0x310e07, 0x320f08, 0x331008, 0x341109, 0x36130a, 0x38140b, 0x39140b,
    0x3b160c, 0x3c170d, 0x3d180e, 0x3e190f, 0x3f1a0f, 0x401b10, 0x411c11, 0x421d12,
    0x431e13, 0x442014, 0x462115, 0x472316, 0x482316, 0x4a2518, 0x4b2619, 0x4c281a,
    0x4d291b, 0x4e2a1b, 0x4f2b1c, 0x512c1d, 0x522d1e, 0x532e1f, 0x543020, 0x563122,
    0x573323, 0x583424, 0x5a3626, 0x5b3727, 0x5c3828, 0x5d3929, 0x5f3b2b, 0x603d2c,
    0x613e2d, 0x623f2f, 0x634030, 0x644231, 0x654332, 0x664433, 0x674534, 0x684736,
    0x694837, 0x6a4938, 0x6c4b3a, 0x6e4d3b, 0x6f4e3d, 0x71503e, 0x725240, 0x735341,
    0x745443, 0x755644, 0x765745, 0x775947, 0x785a48, 0x795b49, 0x7a5c4a, 0x7b5e4c,
    0x7c5f4d, 0x7d604e, 0x7e6250, 0x7f6351, 0x806452, 0x816654, 0x836856, 0x846957,
    0x856b59, 0x866c5b, 0x876d5c, 0x886e5d, 0x89705e, 0x8a7160, 0x8b7361, 0x8c7463,
    0x8c7564, 0x8d7665, 0x8e7867, 0x8f7969, 0x907b6a, 0x917c6c, 0x927d6d, 0x937e6e,
    0x948070, 0x958171, 0x968273, 0x978474, 0x988576, 0x998677, 0x9a8879, 0x9b897a,
    0x9b897a, 0x9c8a7c, 0x9d8c7d, 0x9e8d7f, 0x9f8e80, 0xa09082, 0xa19183, 0xa19284,
    0xa29385, 0xa39487, 0xa49689, 0xa5978a, 0xa6998c, 0xa7998c, 0xa89b8e, 0xa99c90,
    0xaa9e91, 0xaa9e91, 0xab9f93, 0xaba094, 0xaca195, 0xaca195, 0xada397, 0xaea499,
    0xafa599, 0xb0a69b, 0xb1a89d, 0xb2a89d, 0xb3aa9f, 0xb3aba0, 0xb4aba1, 0xb4aca2,
    0xb5ada3, 0xb6aea5, 0xb6afa5, 0xb7b0a6, 0xb8b1a8, 0xb9b2a9, 0xbab3ab, 0xbab3ab,
    0xbab5ac, 0xbbb6ad, 0xbcb7ae, 0xbcb7af, 0xbdb8b0, 0xbeb9b1, 0xbeb9b2, 0xbfbab3,
    0xc0bbb4, 0xc0bcb5, 0xc0bdb5, 0xc1bdb6, 0xc2beb7, 0xc2bfb8, 0xc3c0b9, 0xc4c1ba,
    0xc5c2bb, 0xc5c3bd, 0xc5c3bd, 0xc6c4bf, 0xc7c5bf, 0xc8c6c0, 0xc9c7c2, 0xcac8c3,
    0xcac8c3, 0xcac9c4, 0xcbcac5, 0xcccbc6, 0xcccbc6, 0xcdccc7, 0xceccc8, 0xcecdc9,
    0xcecdc9, 0xcfceca, 0xd0cfca, 0xd0cfcb, 0xd1d0cc, 0xd2d1cd, 0xd2d1cd, 0xd2d1ce,
    0xd3d2cf, 0xd3d2cf, 0xd4d3d0, 0xd5d4d1, 0xd6d5d2, 0xd6d5d2, 0xd6d6d3, 0xd7d6d3,
    0xd8d7d4, 0xd9d8d6, 0xd9d8d6, 0xd9d9d6, 0xdadad7, 0xdbdad8, 0xdcdbd9, 0xdddcda,
    0xdddddb, 0xdededc, 0xdfdedd, 0xe0dfdd, 0xe0dfdd, 0xe1e0de, 0xe1e1e0, 0xe2e2e0,
    0xe2e2e0, 0xe3e2e1, 0xe4e3e2, 0xe4e4e3, 0xe5e5e4, 0xe6e6e4, 0xe7e6e5, 0xe7e7e6,
    0xe8e8e7, 0xe9e9e7, 0xeaeae9, 0xeaeae9, 0xebeaea, 0xebebea, 0xececeb, 0xededec,
    0xeeeded, 0xeeeeee, 0xefefee, 0xf0f0ef, 0xf1f0f0, 0xf1f1f1, 0xf2f2f1, 0xf3f3f2,
    0xf4f4f3, 0xf5f4f4, 0xf5f5f4, 0xf6f6f5, 0xf7f7f6, 0xf8f7f7, 0xf7f7f7, 0xf8f8f8,
    0xf9f9f9, 0xfafafa, 0xfafafa, 0xfbfbfb, 0xfdfdfd, 0xfdfdfd, 0xfefefe, 0xffffff,
];

#[cfg(test)]
#[path = "../../tests/unit/bitmap/tone.rs"]
mod tests;

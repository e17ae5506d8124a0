use std::path::Path;

use anyhow::Context as _;
use image::{ImageFormat, ImageReader, RgbaImage};

use crate::foundation::error::{ShowError, ShowResult};

/// A photo decoded to straight-alpha RGBA with the format it was read from.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Decoded pixels.
    pub image: RgbaImage,
    /// Source container format, when it could be determined.
    pub format: Option<ImageFormat>,
}

impl DecodedImage {
    /// Wrap already decoded pixels.
    pub fn new(image: RgbaImage, format: Option<ImageFormat>) -> Self {
        Self { image, format }
    }

    /// Pixel dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Read and decode an image file, sniffing the format from its contents.
pub fn load_image(path: &Path) -> ShowResult<DecodedImage> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("sniff image format '{}'", path.display()))?;
    let format = reader.format();
    let image = reader
        .decode()
        .map_err(|e| ShowError::format(format!("decode image '{}': {e}", path.display())))?
        .to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(ShowError::format(format!(
            "image '{}' has no pixels",
            path.display()
        )));
    }
    Ok(DecodedImage { image, format })
}

/// Downscale `img` so it fits in `max_w` x `max_h`, preserving aspect. Smaller images are
/// returned unchanged.
pub fn fit_within(img: RgbaImage, max_w: u32, max_h: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w <= max_w && h <= max_h {
        return img;
    }
    let scale = (f64::from(max_w) / f64::from(w)).min(f64::from(max_h) / f64::from(h));
    let nw = ((f64::from(w) * scale).round() as u32).max(1);
    let nh = ((f64::from(h) * scale).round() as u32).max(1);
    image::imageops::resize(&img, nw, nh, image::imageops::FilterType::Triangle)
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/decode.rs"]
mod tests;

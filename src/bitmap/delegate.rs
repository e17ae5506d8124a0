use std::io::Write;

use anyhow::Context as _;
use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{ImageFormat, RgbaImage};

use crate::foundation::error::{ShowError, ShowResult};
use crate::foundation::math::mul_div255_u8;
use crate::swf::output::write_tag_header;
use crate::swf::tags::code;

/// Rows compressed per band by the truecolor encoder.
pub const TRUECOLOR_BAND_ROWS: u32 = 30;

/// JPEG quality used in normal mode.
pub const JPEG_QUALITY_NORMAL: u8 = 90;
/// JPEG quality used in quality mode.
pub const JPEG_QUALITY_HIGH: u8 = 95;

const LOSSLESS_FORMAT_ARGB: u8 = 5;

/// How a bitmap is stored in the container. Chosen once per bitmap by [`BitmapDelegate::select`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitmapDelegate {
    /// Zlib compressed premultiplied ARGB (`DefineBitsLossless2`, format 5).
    TruecolorZlib,
    /// JPEG color data, optionally followed by a zlib compressed alpha plane (`DefineBitsJPEG3`).
    JpegAlpha {
        /// Encoder quality, 1..=100.
        quality: u8,
    },
}

impl BitmapDelegate {
    /// Pick the delegate for a bitmap decoded from `source`.
    ///
    /// Quality mode keeps lossless sources lossless; everything else is stored as JPEG.
    pub fn select(quality_mode: bool, source: Option<ImageFormat>) -> Self {
        let lossless = matches!(
            source,
            Some(ImageFormat::Png | ImageFormat::Gif | ImageFormat::Bmp | ImageFormat::Tiff)
        );
        match (quality_mode, lossless) {
            (true, true) => Self::TruecolorZlib,
            (true, false) => Self::JpegAlpha {
                quality: JPEG_QUALITY_HIGH,
            },
            (false, _) => Self::JpegAlpha {
                quality: JPEG_QUALITY_NORMAL,
            },
        }
    }

    /// Stream-encode `img` into `out`, returning the delegate-specific layout of the payload.
    pub fn encode<W: Write>(self, img: &RgbaImage, out: W) -> ShowResult<EncodedLayout> {
        match self {
            Self::TruecolorZlib => {
                encode_truecolor(img, out)?;
                Ok(EncodedLayout::Truecolor)
            }
            Self::JpegAlpha { quality } => {
                let jpeg_len = encode_jpeg_alpha(img, quality, out)?;
                Ok(EncodedLayout::Jpeg { jpeg_len })
            }
        }
    }
}

/// Payload layout recorded at encode time and needed again to write the final tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodedLayout {
    /// Payload is a single zlib stream of ARGB rows.
    Truecolor,
    /// Payload is `jpeg_len` bytes of JPEG, then the alpha stream (possibly empty).
    Jpeg {
        /// Length of the JPEG part; the alpha stream starts here.
        jpeg_len: u32,
    },
}

impl EncodedLayout {
    /// Write the complete bitmap tag for `payload` read back from scratch.
    pub fn write_tag<W: Write>(
        self,
        w: &mut W,
        id: u16,
        width: u16,
        height: u16,
        payload: &[u8],
    ) -> ShowResult<()> {
        let too_large = || ShowError::encoding(format!("bitmap {id} payload is too large"));
        match self {
            Self::Truecolor => {
                let len = u32::try_from(payload.len() + 7).map_err(|_| too_large())?;
                write_tag_header(w, code::DEFINE_BITS_LOSSLESS2, len, true)
                    .context("write lossless bitmap header")?;
                w.write_u16::<LittleEndian>(id).context("write bitmap id")?;
                w.write_u8(LOSSLESS_FORMAT_ARGB)
                    .context("write bitmap format")?;
                w.write_u16::<LittleEndian>(width)
                    .context("write bitmap width")?;
                w.write_u16::<LittleEndian>(height)
                    .context("write bitmap height")?;
            }
            Self::Jpeg { jpeg_len } => {
                let len = u32::try_from(payload.len() + 6).map_err(|_| too_large())?;
                write_tag_header(w, code::DEFINE_BITS_JPEG3, len, true)
                    .context("write jpeg bitmap header")?;
                w.write_u16::<LittleEndian>(id).context("write bitmap id")?;
                w.write_u32::<LittleEndian>(jpeg_len)
                    .context("write jpeg length")?;
            }
        }
        w.write_all(payload).context("write bitmap payload")?;
        Ok(())
    }
}

/// Premultiply one straight-alpha RGBA pixel into ARGB byte order.
pub(crate) fn premultiplied_argb(px: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = px;
    match a {
        0 => [0, 0, 0, 0],
        255 => [255, r, g, b],
        _ => {
            let a16 = u16::from(a);
            [
                a,
                mul_div255_u8(u16::from(r), a16),
                mul_div255_u8(u16::from(g), a16),
                mul_div255_u8(u16::from(b), a16),
            ]
        }
    }
}

/// Deflate premultiplied ARGB rows into `out`, converting `TRUECOLOR_BAND_ROWS` rows at a time.
pub fn encode_truecolor<W: Write>(img: &RgbaImage, out: W) -> ShowResult<()> {
    let (width, height) = img.dimensions();
    let row_bytes = width as usize * 4;
    let mut band = Vec::with_capacity(row_bytes * TRUECOLOR_BAND_ROWS as usize);
    let mut z = ZlibEncoder::new(out, Compression::default());

    let mut y = 0;
    while y < height {
        let rows = TRUECOLOR_BAND_ROWS.min(height - y);
        band.clear();
        for row in y..y + rows {
            for x in 0..width {
                band.extend_from_slice(&premultiplied_argb(img.get_pixel(x, row).0));
            }
        }
        z.write_all(&band).context("deflate truecolor band")?;
        y += rows;
    }
    z.finish().context("finish truecolor stream")?;
    Ok(())
}

/// Counts bytes passed through to the inner writer.
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// JPEG-encode the color channels into `out`, then append a deflated alpha plane when any
/// pixel is not fully opaque. Returns the JPEG length.
pub fn encode_jpeg_alpha<W: Write>(img: &RgbaImage, quality: u8, out: W) -> ShowResult<u32> {
    let (width, height) = img.dimensions();
    let mut counting = CountingWriter {
        inner: out,
        count: 0,
    };

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    let mut opaque = true;
    for px in img.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        opaque &= px.0[3] == 255;
    }

    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut counting, quality)
        .encode(&rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| ShowError::encoding(format!("jpeg encode failed: {e}")))?;
    let jpeg_len = u32::try_from(counting.count)
        .map_err(|_| ShowError::encoding("jpeg payload is too large"))?;

    if !opaque {
        let mut z = ZlibEncoder::new(&mut counting, Compression::default());
        let mut row = Vec::with_capacity(width as usize);
        for y in 0..height {
            row.clear();
            row.extend((0..width).map(|x| img.get_pixel(x, y).0[3]));
            z.write_all(&row).context("deflate alpha row")?;
        }
        z.finish().context("finish alpha stream")?;
    }
    counting.flush().context("flush bitmap payload")?;
    Ok(jpeg_len)
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/delegate.rs"]
mod tests;

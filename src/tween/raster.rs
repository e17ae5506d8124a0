use std::sync::Arc;

use image::RgbaImage;
use kurbo::{Affine, Rect};

use crate::foundation::core::{StageSize, TWIPS_PER_PIXEL};
use crate::foundation::error::{ShowError, ShowResult};

/// Map from photo pixel coordinates to stage pixel coordinates for a photo placed with
/// `matrix` (twips) as a shape centered on the origin.
pub fn photo_to_stage(matrix: Affine, photo_w: u32, photo_h: u32) -> Affine {
    Affine::scale(1.0 / TWIPS_PER_PIXEL)
        * matrix
        * Affine::scale(TWIPS_PER_PIXEL)
        * Affine::translate((-f64::from(photo_w) / 2.0, -f64::from(photo_h) / 2.0))
}

/// Stage pixel bounds covered by the transformed photo.
pub fn stage_footprint(matrix: Affine, photo_w: u32, photo_h: u32) -> Rect {
    let rect = Rect::new(0.0, 0.0, f64::from(photo_w), f64::from(photo_h));
    photo_to_stage(matrix, photo_w, photo_h).transform_rect_bbox(rect)
}

/// Render `photo` transformed by `matrix` into a transparent stage-sized image.
///
/// Returns `None` when the photo does not overlap the stage or the transform is degenerate.
pub fn rasterize(
    photo: &RgbaImage,
    matrix: Affine,
    stage: StageSize,
) -> ShowResult<Option<RgbaImage>> {
    let (pw, ph) = photo.dimensions();
    let forward = photo_to_stage(matrix, pw, ph);
    if forward.determinant().abs() < 1e-12 {
        return Ok(None);
    }
    let footprint = stage_footprint(matrix, pw, ph).intersect(stage.rect_px());
    if footprint.width() <= 0.0 || footprint.height() <= 0.0 {
        return Ok(None);
    }

    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap_from_rgba(photo)?)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };
    let (sw, sh) = (dim_u16(stage.width)?, dim_u16(stage.height)?);
    let mut ctx = vello_cpu::RenderContext::new(sw, sh);
    ctx.set_transform(affine_to_cpu(forward));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(pw),
        f64::from(ph),
    ));
    ctx.flush();
    let mut target = vello_cpu::Pixmap::new(sw, sh);
    ctx.render_to_pixmap(&mut target);

    Ok(Some(rgba_from_pixmap(&target, stage.width, stage.height)?))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn dim_u16(v: u32) -> ShowResult<u16> {
    v.try_into()
        .map_err(|_| ShowError::state(format!("raster size {v} exceeds u16")))
}

/// Premultiply straight RGBA into a render source.
fn pixmap_from_rgba(photo: &RgbaImage) -> ShowResult<vello_cpu::Pixmap> {
    let (w, h) = (dim_u16(photo.width())?, dim_u16(photo.height())?);
    let pixels = photo
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            let mul = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([mul(r), mul(g), mul(b), a])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

/// Un-premultiply a rendered target back into straight RGBA.
fn rgba_from_pixmap(pixmap: &vello_cpu::Pixmap, width: u32, height: u32) -> ShowResult<RgbaImage> {
    let mut bytes = pixmap.data_as_u8_slice().to_vec();
    for px in bytes.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
        } else if a < 255 {
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
    }
    RgbaImage::from_raw(width, height, bytes)
        .ok_or_else(|| ShowError::state("rendered pixmap size does not match the stage"))
}

#[cfg(test)]
#[path = "../../tests/unit/tween/raster.rs"]
mod tests;

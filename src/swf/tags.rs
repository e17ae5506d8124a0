use kurbo::{Affine, Rect};

use crate::foundation::core::{ColorTransform, Rgb};
use crate::foundation::error::ShowResult;
use crate::swf::output::SwfOutput;
use crate::swf::records::{
    write_cxform_alpha, write_matrix, write_rect, write_rect_edges, write_rgb, write_rgba,
};

/// Record type codes emitted by this crate.
pub mod code {
    /// End of a tag list.
    pub const END: u16 = 0;
    /// Frame boundary.
    pub const SHOW_FRAME: u16 = 1;
    /// Shape definition.
    pub const DEFINE_SHAPE: u16 = 2;
    /// Release a character definition.
    pub const FREE_CHARACTER: u16 = 3;
    /// Stage background color.
    pub const SET_BACKGROUND_COLOR: u16 = 9;
    /// Action bytecode.
    pub const DO_ACTION: u16 = 12;
    /// Compressed audio for one frame.
    pub const SOUND_STREAM_BLOCK: u16 = 19;
    /// Place or move an object on the display list.
    pub const PLACE_OBJECT2: u16 = 26;
    /// Remove the object at a depth.
    pub const REMOVE_OBJECT2: u16 = 28;
    /// JPEG color data with a zlib alpha plane.
    pub const DEFINE_BITS_JPEG3: u16 = 35;
    /// Zlib compressed ARGB bitmap.
    pub const DEFINE_BITS_LOSSLESS2: u16 = 36;
    /// Stream sound format declaration.
    pub const SOUND_STREAM_HEAD2: u16 = 45;
    /// Morph shape definition.
    pub const DEFINE_MORPH_SHAPE: u16 = 46;
}

const ACTION_STOP: u8 = 0x07;
const ACTION_END: u8 = 0x00;

const FILL_SOLID: u8 = 0x00;
const FILL_CLIPPED_BITMAP: u8 = 0x41;

/// PlaceObject2 fields. Absent fields keep the values of the instance already at `depth`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaceFields {
    /// Display list depth.
    pub depth: u16,
    /// Character to place; `None` when only moving.
    pub character: Option<u16>,
    /// Transform in twips.
    pub matrix: Option<Affine>,
    /// Color transform.
    pub color: Option<ColorTransform>,
    /// Morph progress 0..=65535.
    pub ratio: Option<u16>,
    /// Highest depth masked by this object.
    pub clip_depth: Option<u16>,
    /// Modify the existing instance instead of placing a new one.
    pub is_move: bool,
}

pub(crate) fn end(out: &mut SwfOutput) -> ShowResult<()> {
    out.write_tag(code::END, &[])
}

pub(crate) fn show_frame(out: &mut SwfOutput) -> ShowResult<()> {
    out.write_tag(code::SHOW_FRAME, &[])
}

pub(crate) fn set_background_color(out: &mut SwfOutput, color: Rgb) -> ShowResult<()> {
    out.write_tag(code::SET_BACKGROUND_COLOR, &[color.r, color.g, color.b])
}

pub(crate) fn stop_action(out: &mut SwfOutput) -> ShowResult<()> {
    out.write_tag(code::DO_ACTION, &[ACTION_STOP, ACTION_END])
}

pub(crate) fn remove_object(out: &mut SwfOutput, depth: u16) -> ShowResult<()> {
    out.write_tag(code::REMOVE_OBJECT2, &depth.to_le_bytes())
}

pub(crate) fn free_character(out: &mut SwfOutput, id: u16) -> ShowResult<()> {
    out.write_tag(code::FREE_CHARACTER, &id.to_le_bytes())
}

pub(crate) fn place_object(out: &mut SwfOutput, place: &PlaceFields) -> ShowResult<()> {
    let mut body = SwfOutput::new();
    let mut flags = 0u8;
    if place.clip_depth.is_some() {
        flags |= 0x40;
    }
    if place.ratio.is_some() {
        flags |= 0x10;
    }
    if place.color.is_some() {
        flags |= 0x08;
    }
    if place.matrix.is_some() {
        flags |= 0x04;
    }
    if place.character.is_some() {
        flags |= 0x02;
    }
    if place.is_move {
        flags |= 0x01;
    }
    body.write_u8(flags);
    body.write_u16(place.depth);
    if let Some(id) = place.character {
        body.write_u16(id);
    }
    if let Some(m) = &place.matrix {
        write_matrix(&mut body, m);
    }
    if let Some(cx) = &place.color {
        write_cxform_alpha(&mut body, cx);
    }
    if let Some(ratio) = place.ratio {
        body.write_u16(ratio);
    }
    if let Some(clip) = place.clip_depth {
        body.write_u16(clip);
    }
    out.write_tag(code::PLACE_OBJECT2, body.as_bytes())
}

/// Shape filled with a clipped bitmap, spanning `bounds` (twips).
///
/// The fill matrix maps bitmap pixels onto the shape with a half-pixel nudge up and left, which
/// keeps players from duplicating the top/left edge pixels.
pub(crate) fn define_bitmap_shape(
    out: &mut SwfOutput,
    id: u16,
    bitmap_id: u16,
    bounds: Rect,
) -> ShowResult<()> {
    let mut body = SwfOutput::new();
    body.write_u16(id);
    write_rect(&mut body, bounds);
    body.write_u8(1);
    body.write_u8(FILL_CLIPPED_BITMAP);
    body.write_u16(bitmap_id);
    let fill = Affine::translate((bounds.x0 - 10.0, bounds.y0 - 10.0)) * Affine::scale(20.0);
    write_matrix(&mut body, &fill);
    body.write_u8(0);
    write_rect_edges(&mut body, bounds, true);
    out.write_tag(code::DEFINE_SHAPE, body.as_bytes())
}

/// Shape filled with a solid color, spanning `bounds` (twips).
pub(crate) fn define_solid_shape(
    out: &mut SwfOutput,
    id: u16,
    color: Rgb,
    bounds: Rect,
) -> ShowResult<()> {
    let mut body = SwfOutput::new();
    body.write_u16(id);
    write_rect(&mut body, bounds);
    body.write_u8(1);
    body.write_u8(FILL_SOLID);
    write_rgb(&mut body, color);
    body.write_u8(0);
    write_rect_edges(&mut body, bounds, true);
    out.write_tag(code::DEFINE_SHAPE, body.as_bytes())
}

/// Solid rectangle morphing from `start` to `end` (twips) as the ratio goes 0 → 65535.
pub(crate) fn define_rect_morph(
    out: &mut SwfOutput,
    id: u16,
    color: Rgb,
    start: Rect,
    end: Rect,
) -> ShowResult<()> {
    let mut start_edges = SwfOutput::new();
    start_edges.write_u8(1);
    start_edges.write_u8(FILL_SOLID);
    write_rgba(&mut start_edges, color, 0xff);
    write_rgba(&mut start_edges, color, 0xff);
    start_edges.write_u8(0);
    write_rect_edges(&mut start_edges, start, true);

    let mut body = SwfOutput::new();
    body.write_u16(id);
    write_rect(&mut body, start);
    write_rect(&mut body, end);
    let offset = u32::try_from(start_edges.pos()).unwrap_or(u32::MAX);
    body.write_u32(offset);
    body.write_bytes(start_edges.as_bytes());
    write_rect_edges(&mut body, end, false);
    out.write_tag(code::DEFINE_MORPH_SHAPE, body.as_bytes())
}

#[cfg(test)]
#[path = "../../tests/unit/swf/tags.rs"]
mod tests;

use kurbo::{Affine, Rect};

use crate::foundation::core::{ColorTransform, Rgb};
use crate::swf::output::{SwfOutput, signed_bits};

/// Round a twip coordinate to the nearest integer, saturating at the `i32` range.
pub(crate) fn twips(v: f64) -> i32 {
    v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

fn fixed_16_16(v: f64) -> i32 {
    twips(v * 65536.0)
}

fn max_bits(values: &[i32]) -> u32 {
    values.iter().map(|&v| signed_bits(v)).max().unwrap_or(1).min(31)
}

/// RECT record: `Nbits` followed by xmin, xmax, ymin, ymax in twips.
pub fn write_rect(out: &mut SwfOutput, rect: Rect) {
    let vals = [twips(rect.x0), twips(rect.x1), twips(rect.y0), twips(rect.y1)];
    let n = max_bits(&vals);
    let mut bits = out.bits();
    bits.write_ub(5, n);
    for v in vals {
        bits.write_sb(n, v);
    }
}

/// MATRIX record for an affine already expressed in twips.
///
/// Scale and rotate/skew terms are 16.16 fixed point; the scale block is skipped when both
/// diagonal terms are 1 and the rotate block when both off-diagonal terms are 0.
pub fn write_matrix(out: &mut SwfOutput, m: &Affine) {
    let [a, b, c, d, e, f] = m.as_coeffs();
    let mut bits = out.bits();

    let has_scale = a != 1.0 || d != 1.0;
    bits.write_flag(has_scale);
    if has_scale {
        let vals = [fixed_16_16(a), fixed_16_16(d)];
        let n = max_bits(&vals);
        bits.write_ub(5, n);
        bits.write_sb(n, vals[0]);
        bits.write_sb(n, vals[1]);
    }

    let has_rotate = b != 0.0 || c != 0.0;
    bits.write_flag(has_rotate);
    if has_rotate {
        let vals = [fixed_16_16(b), fixed_16_16(c)];
        let n = max_bits(&vals);
        bits.write_ub(5, n);
        bits.write_sb(n, vals[0]);
        bits.write_sb(n, vals[1]);
    }

    let vals = [twips(e), twips(f)];
    let n = max_bits(&vals);
    bits.write_ub(5, n);
    bits.write_sb(n, vals[0]);
    bits.write_sb(n, vals[1]);
}

/// CXFORMWITHALPHA record. Multipliers are written as 8.8 fixed point.
pub fn write_cxform_alpha(out: &mut SwfOutput, cx: &ColorTransform) {
    let has_add = cx.has_add();
    let has_mult = cx.has_mult();
    let mult = cx.mult.map(|m| twips(m * 256.0).clamp(-16384, 16383));
    let add = cx.add.map(|a| twips(a).clamp(-16384, 16383));

    let mut all = Vec::with_capacity(8);
    if has_mult {
        all.extend_from_slice(&mult);
    }
    if has_add {
        all.extend_from_slice(&add);
    }
    let n = max_bits(&all).min(15);

    let mut bits = out.bits();
    bits.write_flag(has_add);
    bits.write_flag(has_mult);
    bits.write_ub(4, n);
    if has_mult {
        for v in mult {
            bits.write_sb(n, v);
        }
    }
    if has_add {
        for v in add {
            bits.write_sb(n, v);
        }
    }
}

/// RGB record.
pub fn write_rgb(out: &mut SwfOutput, c: Rgb) {
    out.write_bytes(&[c.r, c.g, c.b]);
}

/// RGBA record.
pub fn write_rgba(out: &mut SwfOutput, c: Rgb, alpha: u8) {
    out.write_bytes(&[c.r, c.g, c.b, alpha]);
}

/// Edge records outlining `rect` as a closed clockwise path, preceded by a style change that
/// moves to the top-left corner and optionally selects fill style 1.
///
/// Writes `NumFillBits`/`NumLineBits` first, then the records and the end record.
pub fn write_rect_edges(out: &mut SwfOutput, rect: Rect, select_fill: bool) {
    let x0 = twips(rect.x0);
    let y0 = twips(rect.y0);
    let w = twips(rect.x1) - x0;
    let h = twips(rect.y1) - y0;

    let mut bits = out.bits();
    // one fill style, no line styles
    bits.write_ub(4, 1);
    bits.write_ub(4, 0);

    // style change: TypeFlag, StateNewStyles, StateLineStyle, StateFillStyle1, StateFillStyle0,
    // StateMoveTo
    bits.write_flag(false);
    bits.write_flag(false);
    bits.write_flag(false);
    bits.write_flag(select_fill);
    bits.write_flag(false);
    bits.write_flag(true);
    let n = max_bits(&[x0, y0]);
    bits.write_ub(5, n);
    bits.write_sb(n, x0);
    bits.write_sb(n, y0);
    if select_fill {
        bits.write_ub(1, 1);
    }

    for (horizontal, delta) in [(true, w), (false, h), (true, -w), (false, -h)] {
        let n = signed_bits(delta).max(2);
        bits.write_flag(true); // edge
        bits.write_flag(true); // straight
        bits.write_ub(4, n - 2);
        bits.write_flag(false); // axis-aligned
        bits.write_flag(!horizontal);
        bits.write_sb(n, delta);
    }

    // end of shape
    bits.write_ub(6, 0);
}

#[cfg(test)]
#[path = "../../tests/unit/swf/records.rs"]
mod tests;

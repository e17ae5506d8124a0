/// Linear interpolation between `a` (`t = 0`) and `b` (`t = 1`).
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Catmull-Rom spline segment between `p2` (`t = 0`) and `p3` (`t = 1`).
///
/// `p1` and `p4` are the outer control points. The endpoints are reproduced exactly.
pub(crate) fn catmull_rom(p1: f64, p2: f64, p3: f64, p4: f64, t: f64) -> f64 {
    if t == 0.0 {
        return p2;
    }
    if t == 1.0 {
        return p3;
    }
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((-p1 + 3.0 * p2 - 3.0 * p3 + p4) * t3
        + (2.0 * p1 - 5.0 * p2 + 4.0 * p3 - p4) * t2
        + (-p1 + p3) * t
        + 2.0 * p2)
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// Format seconds as `m:ss.hh`, truncating each field.
///
/// Minutes are not zero-padded and are not wrapped into hours.
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    let minutes = (secs / 60.0) as u64;
    let whole = secs as u64 - minutes * 60;
    let hundredths = ((secs - (minutes * 60) as f64 - whole as f64) * 100.0) as u64;
    format!("{minutes}:{whole:02}.{hundredths:02}")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

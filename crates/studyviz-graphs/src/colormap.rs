//! Diverging red-yellow-blue color map for sequential bubble coloring

use plotters::style::RGBColor;

/// Control points of the red-yellow-blue diverging map, low to high
const RD_YL_BU: [(u8, u8, u8); 11] = [
    (0xa5, 0x00, 0x26),
    (0xd7, 0x30, 0x27),
    (0xf4, 0x6d, 0x43),
    (0xfd, 0xae, 0x61),
    (0xfe, 0xe0, 0x90),
    (0xff, 0xff, 0xbf),
    (0xe0, 0xf3, 0xf8),
    (0xab, 0xd9, 0xe9),
    (0x74, 0xad, 0xd1),
    (0x45, 0x75, 0xb4),
    (0x31, 0x36, 0x95),
];

/// Map a value in `[0, 1]` onto the red-yellow-blue scale.
///
/// Values outside the unit interval are clamped; NaN maps to the low end.
pub fn rd_yl_bu(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (RD_YL_BU.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(RD_YL_BU.len() - 1);
    let frac = scaled - lower as f64;

    let (r0, g0, b0) = RD_YL_BU[lower];
    let (r1, g1, b1) = RD_YL_BU[upper];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Position of item `index` out of `count` on the unit interval.
///
/// A single item sits at the low end of the scale.
pub fn normalized_index(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    }
}

/// Round to the nearest value representable in 16.16 fixed point.
pub(crate) fn round_fixed_16_16(v: f64) -> f64 {
    (v * 65536.0).round_ties_even() / 65536.0
}

/// Map a gradient ratio in `[0, 1]` to the target's `0..=255` byte ratio.
pub(crate) fn gradient_ratio_u8(ratio: f64) -> u8 {
    (ratio * 255.0).round_ties_even().clamp(0.0, 255.0) as u8
}

/// Degrees to radians, narrowed to the `f32` fields filter records carry.
pub(crate) fn deg_to_rad_f32(deg: f64) -> f32 {
    deg.to_radians() as f32
}

/// Scale an 8-bit straight color channel by alpha (`0..=255`), truncating like the
/// target's lossless bitmap encoder.
pub(crate) fn premultiply_channel(c: u8, a: u8) -> u8 {
    ((u16::from(c) * u16::from(a)) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

//! Byte colors and the gradients used to tint pads and keys.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const FRAME: Rgb = Rgb(64, 64, 64);

    /// Clamp a `[0, 1]` float triple into bytes.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let byte = |f: f64| (f * 255.0).clamp(0.0, 255.0) as u8;
        Rgb(byte(r), byte(g), byte(b))
    }

    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.0, self.1, self.2)
    }
}

/// Fully saturated color for a hue in `[0, 1)`; the wheel wraps.
pub fn hue_to_rgb(h: f64) -> (f64, f64, f64) {
    let h = (h * 6.0).rem_euclid(6.0);
    let a = h - h.floor();
    match h as u8 {
        0 => (1.0, a, 0.0),
        1 => (1.0 - a, 1.0, 0.0),
        2 => (0.0, 1.0, a),
        3 => (0.0, 1.0 - a, 1.0),
        4 => (a, 0.0, 1.0),
        _ => (1.0, 0.0, 1.0 - a),
    }
}

pub fn hsv(h: f64, s: f64, v: f64) -> Rgb {
    let (r, g, b) = hue_to_rgb(h);
    let mix = |c: f64| v * (1.0 - s + s * c);
    Rgb::from_unit(mix(r), mix(g), mix(b))
}

/// Position of `value` within `low..=high` on the hue wheel.
pub fn rainbow_gradient(value: f64, low: f64, high: f64) -> Rgb {
    let span = (high - low).abs();
    let a = if span > 0.0 { (value - low) / span } else { 0.0 };
    let (r, g, b) = hue_to_rgb(a);
    Rgb::from_unit(r, g, b)
}

/// A bright highlight color, stable for a given seed.
///
/// One channel is mid-range, one dark, one bright, in a seed-chosen order.
pub fn held_color(seed: u32) -> Rgb {
    let mut s = seed.wrapping_mul(0x9E37_79B9).rotate_left(13) ^ 0x5bd1_e995;
    let mut next = |lo: u32, hi: u32| {
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        (lo + s % (hi - lo + 1)) as u8
    };
    let mut ch = [next(64, 192), next(0, 128), next(128, 255)];
    let turn = (seed % 3) as usize;
    ch.rotate_left(turn);
    if seed % 2 == 1 {
        ch.swap(0, 1);
    }
    Rgb(ch[0], ch[1], ch[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_wheel_primaries() {
        assert_eq!(hue_to_rgb(0.0), (1.0, 0.0, 0.0));
        assert_eq!(hue_to_rgb(0.25), (0.5, 1.0, 0.0));
        assert_eq!(hue_to_rgb(0.5), (0.0, 1.0, 1.0));
        assert_eq!(hue_to_rgb(1.0), (1.0, 0.0, 0.0));
    }

    #[test]
    fn gradient_endpoints() {
        assert_eq!(rainbow_gradient(48.0, 48.0, 72.0), Rgb(255, 0, 0));
        assert_eq!(rainbow_gradient(5.0, 5.0, 5.0), Rgb(255, 0, 0));
    }

    #[test]
    fn hsv_value_scales_brightness() {
        assert_eq!(hsv(0.0, 1.0, 0.0), Rgb::BLACK);
        assert_eq!(hsv(0.5, 0.0, 1.0), Rgb::WHITE);
    }

    #[test]
    fn held_color_is_stable_and_vivid() {
        assert_eq!(held_color(7), held_color(7));
        for seed in 0..64 {
            let Rgb(r, g, b) = held_color(seed);
            assert!(r.max(g).max(b) >= 128);
        }
    }

    #[test]
    fn css_format() {
        assert_eq!(Rgb(1, 2, 3).css(), "rgb(1,2,3)");
    }
}

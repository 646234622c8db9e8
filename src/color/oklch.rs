//! sRGB to OKLCH conversion and perceptual distance
//!
//! Parsing and the color-space math are `palette`'s; the distance metric and
//! the hue mean on top of it are ours.

use super::Rgb;
use palette::{FromColor, Oklch as PaletteOklch, Srgb};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A color in OKLCH. `h` is in degrees, [0, 360).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Oklch {
    /// Lightness, [0, 1]
    pub l: f64,
    /// Chroma, [0, ~0.4]
    pub c: f64,
    /// Hue angle in degrees
    pub h: f64,
}

/// Parse `#rrggbb` or `#rgb` (leading `#` optional, any case)
pub fn parse_hex(hex: &str) -> Option<Rgb> {
    let trimmed = hex.trim();
    // from_str_radix would accept a sign character
    if !trimmed
        .trim_start_matches('#')
        .chars()
        .all(|c| c.is_ascii_hexdigit())
    {
        return None;
    }
    let rgb = Srgb::<u8>::from_str(trimmed).ok()?;
    Some(Rgb::new(rgb.red, rgb.green, rgb.blue))
}

/// Lowercase `#rrggbb`
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

/// Wrap an angle into [0, 360)
fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Convert an 8-bit sRGB color to OKLCH
pub fn rgb_to_oklch(rgb: Rgb) -> Oklch {
    let srgb: Srgb<f64> = Srgb::new(rgb.r, rgb.g, rgb.b).into_format();
    let lch = PaletteOklch::from_color(srgb);

    // Hue is meaningless for grays
    let h = if lch.chroma < 1e-10 {
        0.0
    } else {
        normalize_degrees(lch.hue.into_positive_degrees())
    };

    Oklch {
        l: lch.l,
        c: lch.chroma,
        h,
    }
}

/// Convert a hex color to OKLCH; `None` for malformed input
pub fn hex_to_oklch(hex: &str) -> Option<Oklch> {
    parse_hex(hex).map(rgb_to_oklch)
}

/// Smallest angle between two hues, in [0, 180]
pub fn hue_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Perceptual distance between two OKLCH colors.
///
/// The hue term is weighted by `min(a.c, b.c) * 1.5`, so hue noise between
/// near-grays contributes almost nothing.
pub fn oklch_distance(a: &Oklch, b: &Oklch) -> f64 {
    let dl = a.l - b.l;
    let dc = a.c - b.c;
    let dh = hue_difference(a.h, b.h) / 180.0;
    let hue_weight = a.c.min(b.c) * 1.5;
    (dl * dl + dc * dc + hue_weight * dh * dh).sqrt()
}

/// Mean of hue angles via unit vectors, normalized to [0, 360)
pub fn circular_mean_hue(hues: &[f64]) -> f64 {
    if hues.is_empty() {
        return 0.0;
    }
    let (sin, cos) = hues.iter().fold((0.0, 0.0), |(s, c), h| {
        let rad = h.to_radians();
        (s + rad.sin(), c + rad.cos())
    });
    normalize_degrees(sin.atan2(cos).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex("#C9A962"), Some(Rgb::new(0xc9, 0xa9, 0x62)));
        assert_eq!(parse_hex("0c0c0e"), Some(Rgb::new(12, 12, 14)));
        assert_eq!(parse_hex("#fa0"), Some(Rgb::new(255, 170, 0)));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#gg0000"), None);
        assert_eq!(parse_hex(""), None);
        assert_eq!(parse_hex("#ffé"), None);
        assert_eq!(parse_hex("#+f+f+f"), None);
        assert_eq!(parse_hex("  #ABC  "), Some(Rgb::new(0xaa, 0xbb, 0xcc)));
    }

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(rgb_to_hex(Rgb::new(0xc9, 0xa9, 0x62)), "#c9a962");
    }

    #[test]
    fn test_white_and_black() {
        let white = hex_to_oklch("#ffffff").unwrap();
        assert!(approx(white.l, 1.0, 1e-3));
        assert!(white.c < 1e-3);

        let black = hex_to_oklch("#000000").unwrap();
        assert!(approx(black.l, 0.0, 1e-9));
        assert_eq!(black.h, 0.0);
    }

    #[test]
    fn test_known_red() {
        // oklch(0.628 0.2577 29.23)
        let red = hex_to_oklch("#ff0000").unwrap();
        assert!(approx(red.l, 0.628, 1e-3));
        assert!(approx(red.c, 0.2577, 1e-3));
        assert!(approx(red.h, 29.23, 0.1));
    }

    #[test]
    fn test_malformed_hex_is_none() {
        assert!(hex_to_oklch("not-a-color").is_none());
    }

    #[test]
    fn test_hue_difference_wraps() {
        assert!(approx(hue_difference(10.0, 350.0), 20.0, 1e-9));
        assert!(approx(hue_difference(0.0, 180.0), 180.0, 1e-9));
        assert!(approx(hue_difference(90.0, 90.0), 0.0, 1e-9));
    }

    #[test]
    fn test_circular_mean_straddles_zero() {
        let mean = circular_mean_hue(&[10.0, 350.0]);
        assert!(mean < 1e-6 || mean > 360.0 - 1e-6, "got {mean}");
    }

    #[test]
    fn test_circular_mean_plain() {
        assert!(approx(circular_mean_hue(&[80.0, 100.0]), 90.0, 1e-9));
        assert!(approx(circular_mean_hue(&[270.0]), 270.0, 1e-9));
        assert_eq!(circular_mean_hue(&[]), 0.0);
    }

    #[test]
    fn test_gray_hue_noise_is_damped() {
        let gray_a = Oklch { l: 0.5, c: 0.001, h: 10.0 };
        let gray_b = Oklch { l: 0.5, c: 0.001, h: 190.0 };
        let red = Oklch { l: 0.5, c: 0.2, h: 10.0 };
        let cyan = Oklch { l: 0.5, c: 0.2, h: 190.0 };
        assert!(oklch_distance(&gray_a, &gray_b) < 0.05);
        assert!(oklch_distance(&red, &cyan) > 0.5);
    }

    fn arb_hex() -> impl Strategy<Value = String> {
        any::<(u8, u8, u8)>().prop_map(|(r, g, b)| rgb_to_hex(Rgb::new(r, g, b)))
    }

    fn arb_oklch() -> impl Strategy<Value = Oklch> {
        (0.0f64..=1.0, 0.0f64..=0.4, 0.0f64..360.0).prop_map(|(l, c, h)| Oklch { l, c, h })
    }

    proptest! {
        #[test]
        fn prop_conversion_is_deterministic(hex in arb_hex()) {
            let a = hex_to_oklch(&hex).unwrap();
            let b = hex_to_oklch(&hex.to_uppercase()).unwrap();
            prop_assert!(approx(a.l, b.l, 1e-9));
            prop_assert!(approx(a.c, b.c, 1e-9));
            prop_assert!(approx(a.h, b.h, 1e-9));
            prop_assert!((0.0..360.0).contains(&a.h));
            prop_assert!(a.l > -1e-9 && a.l < 1.0 + 1e-6);
        }

        #[test]
        fn prop_distance_symmetric_non_negative(a in arb_oklch(), b in arb_oklch()) {
            let ab = oklch_distance(&a, &b);
            let ba = oklch_distance(&b, &a);
            prop_assert!(ab >= 0.0);
            prop_assert!(approx(ab, ba, 1e-12));
            prop_assert_eq!(oklch_distance(&a, &a), 0.0);
        }
    }
}

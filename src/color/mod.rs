//! Color palette derivation
//!
//! Raw color samples from the page go through three pure stages:
//!
//! ```text
//! RawColorSample[] ──▶ oklch (convert) ──▶ cluster (k-means) ──▶ semantic (roles)
//!                                              │                     │
//!                                              ▼                     ▼
//!                                        PaletteEntry[]       SemanticPalette
//! ```

pub mod cluster;
pub mod oklch;
pub mod semantic;

pub use cluster::{cluster_colors, cluster_colors_with, kmeans, KMeans};
pub use oklch::{
    circular_mean_hue, hex_to_oklch, hue_difference, oklch_distance, parse_hex, rgb_to_hex,
    rgb_to_oklch, Oklch,
};
pub use semantic::{classify_semantic_colors, classify_semantic_colors_with, SemanticPalette};

use crate::config::HeuristicConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Usage contexts a color can be observed in
pub mod context {
    /// Background of a button-like element
    pub const BUTTON_BG: &str = "button-bg";
    /// Background of nav/header
    pub const NAV_BG: &str = "nav-bg";
    /// Any other background
    pub const BACKGROUND: &str = "background";
    /// Text color of h1-h6
    pub const HEADING: &str = "heading";
    /// Text color of a button-like element
    pub const BUTTON_TEXT: &str = "button-text";
    /// Text color of an anchor
    pub const LINK: &str = "link";
    /// Text color of paragraphs and list items
    pub const BODY_TEXT: &str = "body-text";
    /// Any other text color
    pub const TEXT: &str = "text";
    /// Visible border color
    pub const BORDER: &str = "border";
    /// Visible outline color
    pub const OUTLINE: &str = "outline";
    /// `<meta name="theme-color">`
    pub const THEME_COLOR: &str = "theme-color";

    /// The full vocabulary
    pub const ALL: &[&str] = &[
        BUTTON_BG,
        NAV_BG,
        BACKGROUND,
        HEADING,
        BUTTON_TEXT,
        LINK,
        BODY_TEXT,
        TEXT,
        BORDER,
        OUTLINE,
        THEME_COLOR,
    ];
}

/// 8-bit sRGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Construct from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One distinct color observed on the page, with weighted frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColorSample {
    /// `#rrggbb`, lowercase
    pub hex: String,
    /// Integer RGB
    pub rgb: Rgb,
    /// Weighted frequency
    pub count: f64,
    /// Contexts the color was seen in
    #[serde(default)]
    pub contexts: BTreeSet<String>,
}

impl RawColorSample {
    /// Build a sample from a hex string; `None` if the hex is malformed
    pub fn new<I, S>(hex: &str, count: f64, contexts: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rgb = parse_hex(hex)?;
        Some(Self {
            hex: rgb_to_hex(rgb),
            rgb,
            count,
            contexts: contexts.into_iter().map(Into::into).collect(),
        })
    }

    /// True if the sample was seen in `ctx`
    pub fn has_context(&self, ctx: &str) -> bool {
        self.contexts.contains(ctx)
    }
}

/// One cluster collapsed to its representative color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Hex of the highest-count member
    pub hex: String,
    /// OKLCH of the representative
    pub oklch: Oklch,
    /// Sum of member counts
    pub count: f64,
    /// Union of member contexts
    pub contexts: BTreeSet<String>,
    /// Number of members
    pub size: usize,
}

impl PaletteEntry {
    /// True if any member was seen in `ctx`
    pub fn has_context(&self, ctx: &str) -> bool {
        self.contexts.contains(ctx)
    }

    /// True if any member was seen in one of `ctxs`
    pub fn has_any_context(&self, ctxs: &[&str]) -> bool {
        ctxs.iter().any(|c| self.contexts.contains(*c))
    }
}

/// Clustered palette plus its semantic roles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Entries sorted descending by count
    pub palette: Vec<PaletteEntry>,
    /// Derived roles
    pub semantic: SemanticPalette,
}

impl ColorPalette {
    /// Cluster and classify raw samples
    pub fn from_samples<R: Rng + ?Sized>(
        samples: &[RawColorSample],
        heuristics: &HeuristicConfig,
        rng: &mut R,
    ) -> Self {
        let palette = cluster_colors_with(samples, heuristics, rng);
        let semantic = classify_semantic_colors_with(&palette, heuristics.accent_min_chroma);
        Self { palette, semantic }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_sample_normalizes_hex() {
        let sample = RawColorSample::new("#C9A962", 3.0, [context::BUTTON_BG]).unwrap();
        assert_eq!(sample.hex, "#c9a962");
        assert_eq!(sample.rgb, Rgb::new(0xc9, 0xa9, 0x62));
        assert!(sample.has_context("button-bg"));
    }

    #[test]
    fn test_raw_sample_rejects_bad_hex() {
        assert!(RawColorSample::new("c9a962zz", 1.0, Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_raw_sample_deserializes_context_list() {
        let sample: RawColorSample = serde_json::from_str(
            r##"{"hex":"#112233","rgb":{"r":17,"g":34,"b":51},"count":2.5,"contexts":["text","border","text"]}"##,
        )
        .unwrap();
        assert_eq!(sample.contexts.len(), 2);
        assert_eq!(sample.count, 2.5);
    }

    #[test]
    fn test_empty_palette() {
        let mut rng = rand::rng();
        let palette = ColorPalette::from_samples(&[], &HeuristicConfig::default(), &mut rng);
        assert!(palette.palette.is_empty());
        assert_eq!(palette.semantic, SemanticPalette::default());
    }
}

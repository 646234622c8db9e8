//! Semantic role assignment
//!
//! Single pass of ordered rules over a count-sorted palette. A role with no
//! qualifying entry stays `None`: "undetermined", never black or white.

use super::{context, PaletteEntry};
use serde::{Deserialize, Serialize};

const TEXT_CONTEXTS: &[&str] = &[context::HEADING, context::BODY_TEXT, context::TEXT];
const BACKGROUND_CONTEXTS: &[&str] = &[context::BACKGROUND, context::NAV_BG];

/// Named color roles, each a hex string when determined
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticPalette {
    /// Page background
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Primary text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Secondary text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_secondary: Option<String>,
    /// Most chromatic color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    /// Second most chromatic color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_light: Option<String>,
    /// Button background, or the accent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Secondary background
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<String>,
    /// Border color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    /// Link color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl SemanticPalette {
    /// True if no role was determined
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Classify with the default accent chroma threshold (0.04)
pub fn classify_semantic_colors(palette: &[PaletteEntry]) -> SemanticPalette {
    classify_semantic_colors_with(palette, 0.04)
}

/// Classify a count-sorted palette; accents need chroma strictly above `min_chroma`
pub fn classify_semantic_colors_with(palette: &[PaletteEntry], min_chroma: f64) -> SemanticPalette {
    if palette.is_empty() {
        return SemanticPalette::default();
    }

    let hex = |e: &PaletteEntry| e.hex.clone();

    let mut by_lightness: Vec<&PaletteEntry> = palette.iter().collect();
    by_lightness.sort_by(|a, b| a.oklch.l.total_cmp(&b.oklch.l));

    let backgrounds: Vec<&PaletteEntry> = palette
        .iter()
        .filter(|e| e.has_any_context(BACKGROUND_CONTEXTS))
        .collect();

    let background = backgrounds
        .first()
        .or_else(|| by_lightness.first())
        .map(|e| hex(e));

    // Second-lightest: index 1 from the light end
    let surface = backgrounds
        .get(1)
        .or_else(|| by_lightness.iter().rev().nth(1))
        .map(|e| hex(e));

    let mut texts = palette.iter().filter(|e| e.has_any_context(TEXT_CONTEXTS));
    let text = texts.next().map(hex);
    let text_secondary = texts.next().map(hex);

    let mut chromatic: Vec<&PaletteEntry> = palette
        .iter()
        .filter(|e| e.oklch.c > min_chroma)
        .collect();
    chromatic.sort_by(|a, b| b.oklch.c.total_cmp(&a.oklch.c));
    let accent = chromatic.first().map(|e| hex(e));
    let accent_light = chromatic.get(1).map(|e| hex(e));

    let primary = palette
        .iter()
        .find(|e| e.has_context(context::BUTTON_BG))
        .map(hex)
        .or_else(|| accent.clone());

    let border = palette
        .iter()
        .find(|e| e.has_context(context::BORDER))
        .map(hex);
    let link = palette
        .iter()
        .find(|e| e.has_context(context::LINK))
        .map(hex);

    SemanticPalette {
        background,
        text,
        text_secondary,
        accent,
        accent_light,
        primary,
        surface,
        border,
        link,
    }
}

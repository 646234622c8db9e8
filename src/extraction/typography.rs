//! Typography sampling
//!
//! The probe reads computed font stack, size and weight from one representative
//! element per role and lists Google Fonts stylesheet links; the profile
//! (primary family per stack, role fonts, sorted sizes and weights) is derived
//! here from those raw samples.

use super::run_probe;
use crate::browser::PageDriver;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Families that never count as a font's primary name
const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-serif",
    "ui-sans-serif",
    "ui-monospace",
    "ui-rounded",
    "emoji",
    "math",
    "fangsong",
    "inherit",
    "initial",
];

const HEADING_ROLES: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// One role's computed font, as read in the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSample {
    /// `h1`..`h6`, `body`, `button`, `nav`, `code`
    pub role: String,
    /// Full computed `font-family` stack
    pub family: String,
    /// Computed size in px
    pub size: f64,
    /// Numeric weight
    pub weight: u32,
}

/// A primary family and where it was seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontUsage {
    /// Primary family name, quotes stripped
    pub family: String,
    /// Roles it was used for
    pub roles: BTreeSet<String>,
    /// Mean size over those roles, px
    pub avg_size: f64,
}

/// Derived typography profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyProfile {
    /// Distinct primary families in first-seen order
    pub fonts: Vec<FontUsage>,
    /// First font used for a heading
    pub font_heading: Option<String>,
    /// First font used for body text
    pub font_body: Option<String>,
    /// First font used for code, or whose name looks monospaced
    pub font_mono: Option<String>,
    /// Sorted unique sizes, px
    pub sizes: Vec<f64>,
    /// Sorted unique weights
    pub weights: Vec<u32>,
    /// Google Fonts stylesheet URLs
    pub google_fonts: Vec<String>,
    /// Per-role samples as read
    pub raw: Vec<FontSample>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypographyProbe {
    #[serde(default)]
    samples: Vec<FontSample>,
    #[serde(default)]
    google_fonts: Vec<String>,
}

const SCRIPT: &str = r#"
(() => {
    const roles = [
        ['h1', 'h1'], ['h2', 'h2'], ['h3', 'h3'], ['h4', 'h4'], ['h5', 'h5'], ['h6', 'h6'],
        ['body', 'main p, article p, p, li, body'],
        ['button', 'button, [role="button"], .btn, a[class*="button"]'],
        ['nav', 'nav a, header a'],
        ['code', 'code, pre, kbd'],
    ];
    const samples = [];
    for (const [role, selector] of roles) {
        const el = document.querySelector(selector);
        if (!el) continue;
        const cs = getComputedStyle(el);
        samples.push({
            role,
            family: cs.fontFamily || '',
            size: parseFloat(cs.fontSize) || 0,
            weight: parseInt(cs.fontWeight, 10) || 400,
        });
    }

    const googleFonts = new Set();
    for (const link of document.querySelectorAll('link[href*="fonts.googleapis.com"], link[href*="fonts.bunny.net"]')) {
        googleFonts.add(link.href);
    }
    for (const sheet of Array.from(document.styleSheets)) {
        let rules;
        try { rules = sheet.cssRules; } catch (e) { continue; }
        for (const rule of Array.from(rules || [])) {
            if (rule.href && rule.href.includes('fonts.googleapis.com')) googleFonts.add(rule.href);
        }
    }

    return { samples, googleFonts: Array.from(googleFonts) };
})()
"#;

/// First non-generic family in a CSS `font-family` stack, unquoted
pub fn primary_family(stack: &str) -> Option<String> {
    stack
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|f| !f.is_empty())
        .find(|f| !GENERIC_FAMILIES.contains(&f.to_ascii_lowercase().as_str()))
        .map(str::to_string)
}

fn looks_monospace(family: &str) -> bool {
    let lower = family.to_ascii_lowercase();
    ["mono", "code", "consol", "courier", "menlo"]
        .iter()
        .any(|k| lower.contains(k))
}

impl TypographyProfile {
    /// Derive a profile from raw per-role samples
    pub fn from_samples(raw: Vec<FontSample>, google_fonts: Vec<String>) -> Self {
        let mut fonts: Vec<FontUsage> = Vec::new();
        let mut size_totals: Vec<(f64, usize)> = Vec::new();

        for sample in &raw {
            let Some(family) = primary_family(&sample.family) else {
                continue;
            };
            let idx = match fonts.iter().position(|f| f.family == family) {
                Some(idx) => idx,
                None => {
                    fonts.push(FontUsage {
                        family,
                        roles: BTreeSet::new(),
                        avg_size: 0.0,
                    });
                    size_totals.push((0.0, 0));
                    fonts.len() - 1
                }
            };
            fonts[idx].roles.insert(sample.role.clone());
            size_totals[idx].0 += sample.size;
            size_totals[idx].1 += 1;
        }

        for (font, (total, n)) in fonts.iter_mut().zip(&size_totals) {
            font.avg_size = ((total / *n as f64) * 10.0).round() / 10.0;
        }

        let role_font = |pred: &dyn Fn(&FontUsage) -> bool| {
            fonts.iter().find(|f| pred(*f)).map(|f| f.family.clone())
        };
        let font_heading =
            role_font(&|f: &FontUsage| HEADING_ROLES.iter().any(|r| f.roles.contains(*r)));
        let font_body = role_font(&|f: &FontUsage| f.roles.contains("body"));
        let font_mono = role_font(&|f: &FontUsage| f.roles.contains("code"))
            .or_else(|| role_font(&|f: &FontUsage| looks_monospace(&f.family)));

        let mut sizes: Vec<f64> = raw.iter().map(|s| s.size).filter(|s| *s > 0.0).collect();
        sizes.sort_by(f64::total_cmp);
        sizes.dedup();

        let weights: Vec<u32> = raw
            .iter()
            .map(|s| s.weight)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut google_fonts = google_fonts;
        google_fonts.sort();
        google_fonts.dedup();

        Self {
            fonts,
            font_heading,
            font_body,
            font_mono,
            sizes,
            weights,
            google_fonts,
            raw,
        }
    }
}

/// Typography sampling functionality
pub struct TypographyExtractor;

impl TypographyExtractor {
    /// Sample per-role fonts and derive the profile
    #[instrument(skip(driver))]
    pub async fn extract<D: PageDriver>(driver: &D) -> Result<TypographyProfile> {
        info!("Sampling typography");
        let probe: TypographyProbe = run_probe(driver, SCRIPT).await?;
        let profile = TypographyProfile::from_samples(probe.samples, probe.google_fonts);
        debug!(
            "Typography: {} fonts, heading={:?}, body={:?}",
            profile.fonts.len(),
            profile.font_heading,
            profile.font_body
        );
        Ok(profile)
    }
}

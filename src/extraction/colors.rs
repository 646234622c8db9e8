//! Raw color sampling
//!
//! Reads background, text, border and outline colors from up to
//! `maxElements` visible elements. Every color string is canonicalized through
//! a canvas 2D context (which serializes any CSS color syntax to `#rrggbb` or
//! `rgba(...)`), so `oklch()`, named colors and `hsl()` all land as integer RGB.
//! Near-transparent colors and pure black/white are dropped before counting.

use super::{run_probe, with_args};
use crate::browser::PageDriver;
use crate::color::RawColorSample;
use crate::config::{ContextWeights, HeuristicConfig};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Weighted color samples as returned by the probe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorSamples {
    /// One entry per distinct color
    #[serde(default)]
    pub colors: Vec<RawColorSample>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ColorProbeArgs<'a> {
    weights: &'a ContextWeights,
    min_alpha: f64,
    limit: usize,
}

const SCRIPT: &str = r#"
(args) => {
    const w = args.weights;
    const canvas = document.createElement('canvas');
    canvas.width = canvas.height = 1;
    const ctx = canvas.getContext('2d', { willReadFrequently: true });
    const cache = new Map();

    const hex2 = (n) => Math.max(0, Math.min(255, Math.round(n))).toString(16).padStart(2, '0');

    const canonical = (value) => {
        if (!value || value === 'none' || value === 'transparent') return null;
        if (cache.has(value)) return cache.get(value);
        let out = null;
        if (ctx) {
            ctx.fillStyle = '#010203';
            ctx.fillStyle = value;
            const s = String(ctx.fillStyle);
            let m;
            if ((m = /^#([0-9a-f]{6})$/i.exec(s))) {
                const n = parseInt(m[1], 16);
                out = { r: (n >> 16) & 255, g: (n >> 8) & 255, b: n & 255, a: 1 };
            } else if ((m = /^rgba?\(([^)]+)\)$/i.exec(s))) {
                const p = m[1].split(/[\s,\/]+/).filter(Boolean).map(Number);
                out = { r: p[0], g: p[1], b: p[2], a: p.length > 3 ? p[3] : 1 };
            } else {
                ctx.clearRect(0, 0, 1, 1);
                ctx.fillRect(0, 0, 1, 1);
                const d = ctx.getImageData(0, 0, 1, 1).data;
                out = { r: d[0], g: d[1], b: d[2], a: d[3] / 255 };
            }
        }
        cache.set(value, out);
        return out;
    };

    const samples = new Map();
    const add = (value, context, weight) => {
        const c = canonical(value);
        if (!c || !(c.a >= args.minAlpha)) return;
        const hex = '#' + hex2(c.r) + hex2(c.g) + hex2(c.b);
        if (hex === '#000000' || hex === '#ffffff') return;
        let s = samples.get(hex);
        if (!s) {
            s = { hex, rgb: { r: Math.round(c.r), g: Math.round(c.g), b: Math.round(c.b) }, count: 0, contexts: new Set() };
            samples.set(hex, s);
        }
        s.count += weight;
        s.contexts.add(context);
    };

    const isButton = (el) =>
        el.tagName === 'BUTTON' ||
        el.getAttribute('role') === 'button' ||
        (el.tagName === 'INPUT' && /^(button|submit|reset)$/i.test(el.type)) ||
        /\b(btn|button)\b/i.test(typeof el.className === 'string' ? el.className : '');

    const hasOwnText = (el) =>
        Array.from(el.childNodes).some((n) => n.nodeType === 3 && n.textContent.trim().length > 0);

    let visited = 0;
    for (const el of document.querySelectorAll('*')) {
        if (visited >= args.limit) break;
        if (/^(SCRIPT|STYLE|NOSCRIPT|META|LINK|TITLE|HEAD|TEMPLATE)$/.test(el.tagName)) continue;
        const rect = el.getBoundingClientRect();
        if (rect.width <= 0 || rect.height <= 0) continue;
        const cs = getComputedStyle(el);
        if (cs.display === 'none' || cs.visibility === 'hidden') continue;
        visited++;

        const button = isButton(el);
        const inNav = !!el.closest('nav, header');

        if (button) add(cs.backgroundColor, 'button-bg', w.buttonBg);
        else if (inNav) add(cs.backgroundColor, 'nav-bg', w.navBg);
        else add(cs.backgroundColor, 'background', w.other);

        if (hasOwnText(el)) {
            const tag = el.tagName;
            if (/^H[1-6]$/.test(tag)) add(cs.color, 'heading', w.heading);
            else if (button) add(cs.color, 'button-text', w.other);
            else if (tag === 'A') add(cs.color, 'link', w.other);
            else if (tag === 'P' || tag === 'LI') add(cs.color, 'body-text', w.other);
            else add(cs.color, 'text', w.other);
        }

        const seenBorders = new Set();
        for (const side of ['Top', 'Right', 'Bottom', 'Left']) {
            if (parseFloat(cs['border' + side + 'Width']) > 0 && cs['border' + side + 'Style'] !== 'none') {
                const color = cs['border' + side + 'Color'];
                if (!seenBorders.has(color)) {
                    seenBorders.add(color);
                    add(color, 'border', w.border);
                }
            }
        }

        if (cs.outlineStyle !== 'none' && parseFloat(cs.outlineWidth) > 0) {
            add(cs.outlineColor, 'outline', w.outline);
        }
    }

    const theme = document.querySelector('meta[name="theme-color"]');
    if (theme && theme.content) add(theme.content.trim(), 'theme-color', w.themeColor);

    return {
        colors: Array.from(samples.values()).map((s) => ({
            hex: s.hex,
            rgb: s.rgb,
            count: s.count,
            contexts: Array.from(s.contexts),
        })),
    };
}
"#;

/// Color sampling functionality
pub struct ColorExtractor;

impl ColorExtractor {
    /// Build the probe script for the given heuristics
    pub fn script(heuristics: &HeuristicConfig) -> Result<String> {
        with_args(
            SCRIPT,
            &ColorProbeArgs {
                weights: &heuristics.weights,
                min_alpha: heuristics.min_alpha,
                limit: heuristics.max_color_elements,
            },
        )
    }

    /// Sample weighted colors from visible elements
    #[instrument(skip(driver, heuristics))]
    pub async fn extract<D: PageDriver>(
        driver: &D,
        heuristics: &HeuristicConfig,
    ) -> Result<ColorSamples> {
        info!("Sampling colors");
        let script = Self::script(heuristics)?;
        let mut samples: ColorSamples = run_probe(driver, &script).await?;

        // Noise filter, enforced again on this side of the wire
        samples.colors.retain(|s| {
            crate::color::parse_hex(&s.hex).is_some()
                && !s.hex.trim().eq_ignore_ascii_case("#000000")
                && !s.hex.trim().eq_ignore_ascii_case("#ffffff")
        });

        debug!("Sampled {} distinct colors", samples.colors.len());
        Ok(samples)
    }
}

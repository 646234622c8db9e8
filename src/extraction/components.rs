//! Component style snapshots
//!
//! For each UI role the first element matching an ordered selector chain is
//! snapshotted. The chains are guesses about common markup conventions and
//! will miss unconventional sites; a role with no match is `None`.

use super::{run_probe, with_args};
use crate::browser::PageDriver;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Ordered selector alternatives per role
pub const COMPONENT_SELECTORS: &[(&str, &[&str])] = &[
    (
        "button",
        &[
            "button:not([aria-hidden])",
            "[role=\"button\"]",
            "[class*=\"btn\"]",
            "[class*=\"button\"]",
            "input[type=\"submit\"]",
        ],
    ),
    (
        "input",
        &[
            "input[type=\"text\"]",
            "input[type=\"email\"]",
            "input[type=\"search\"]",
            "input:not([type])",
            "textarea",
        ],
    ),
    (
        "card",
        &[
            "[class*=\"card\"]",
            "[class*=\"Card\"]",
            "article",
            "[class*=\"tile\"]",
            "[class*=\"panel\"]",
        ],
    ),
    ("nav", &["nav", "header", "[role=\"navigation\"]", "[class*=\"navbar\"]"]),
    ("link", &["main a[href]", "article a[href]", "p a[href]", "a[href]"]),
];

/// Snapshot of the style properties that matter for a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentStyle {
    /// Selector that matched
    pub selector: String,
    /// `background-color`
    pub background_color: String,
    /// `color`
    pub color: String,
    /// `border`
    pub border: String,
    /// `border-radius`
    pub border_radius: String,
    /// `padding`
    pub padding: String,
    /// `font-family`
    pub font_family: String,
    /// `font-size`
    pub font_size: String,
    /// `font-weight`
    pub font_weight: String,
    /// `line-height`
    pub line_height: String,
    /// `box-shadow`
    pub box_shadow: String,
    /// `transition`
    pub transition: String,
}

/// Snapshots per UI role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStyles {
    /// Primary button
    pub button: Option<ComponentStyle>,
    /// Text input
    pub input: Option<ComponentStyle>,
    /// Card-like container
    pub card: Option<ComponentStyle>,
    /// Navigation bar
    pub nav: Option<ComponentStyle>,
    /// Inline link
    pub link: Option<ComponentStyle>,
    /// Height of the nav element, px
    pub nav_height: Option<f64>,
}

impl ComponentStyles {
    /// Number of roles that matched an element
    pub fn matched(&self) -> usize {
        [&self.button, &self.input, &self.card, &self.nav, &self.link]
            .iter()
            .filter(|c| c.is_some())
            .count()
    }
}

const SCRIPT: &str = r#"
(chains) => {
    const snapshot = (el, selector) => {
        const cs = getComputedStyle(el);
        return {
            selector,
            backgroundColor: cs.backgroundColor,
            color: cs.color,
            border: cs.border,
            borderRadius: cs.borderRadius,
            padding: cs.padding,
            fontFamily: cs.fontFamily,
            fontSize: cs.fontSize,
            fontWeight: cs.fontWeight,
            lineHeight: cs.lineHeight,
            boxShadow: cs.boxShadow,
            transition: cs.transition,
        };
    };
    const out = { navHeight: null };
    const found = {};
    for (const [role, selectors] of chains) {
        out[role] = null;
        for (const selector of selectors) {
            let el = null;
            try { el = document.querySelector(selector); } catch (e) { continue; }
            if (el) {
                out[role] = snapshot(el, selector);
                found[role] = el;
                break;
            }
        }
    }
    if (found.nav) {
        const h = found.nav.getBoundingClientRect().height;
        if (h > 0) out.navHeight = Math.round(h);
    }
    return out;
}
"#;

/// Component style sampling functionality
pub struct ComponentExtractor;

impl ComponentExtractor {
    /// Snapshot each role's first matching element
    #[instrument(skip(driver))]
    pub async fn extract<D: PageDriver>(driver: &D) -> Result<ComponentStyles> {
        info!("Sampling component styles");
        let script = with_args(SCRIPT, &COMPONENT_SELECTORS)?;
        let styles: ComponentStyles = run_probe(driver, &script).await?;
        debug!(
            "Matched {} of {} component roles",
            styles.matched(),
            COMPONENT_SELECTORS.len()
        );
        Ok(styles)
    }
}

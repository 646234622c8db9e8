//! Page metadata extraction
//!
//! Title, description, theme color, favicon, Open Graph image and the first
//! few headings, for human context alongside the tokens.

use super::{run_probe, with_args};
use crate::browser::PageDriver;
use crate::config::HeuristicConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

/// A heading as shown on the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Lowercase tag name, `h1`..`h6`
    pub tag: String,
    /// Trimmed text, capped in length
    pub text: String,
}

/// Extracted page metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMeta {
    /// Document title
    pub title: Option<String>,
    /// Meta description
    pub description: Option<String>,
    /// `<meta name="theme-color">`
    pub theme_color: Option<String>,
    /// Favicon URL
    pub favicon: Option<String>,
    /// og:image
    pub og_image: Option<String>,
    /// Leading headings in document order
    pub headings: Vec<Heading>,
}

const SCRIPT: &str = r#"
(args) => {
    const attr = (selector, name) => {
        const el = document.querySelector(selector);
        const v = el && el.getAttribute(name);
        return v && v.trim() ? v.trim() : null;
    };
    const icon = document.querySelector('link[rel="icon"], link[rel="shortcut icon"], link[rel="apple-touch-icon"]');
    const headings = [];
    for (const h of document.querySelectorAll('h1, h2, h3, h4, h5, h6')) {
        if (headings.length >= args.maxHeadings) break;
        const text = (h.textContent || '').replace(/\s+/g, ' ').trim();
        if (!text) continue;
        headings.push({ tag: h.tagName.toLowerCase(), text: text.slice(0, args.headingChars) });
    }
    return {
        title: document.title || null,
        description: attr('meta[name="description"]', 'content') || attr('meta[property="og:description"]', 'content'),
        themeColor: attr('meta[name="theme-color"]', 'content'),
        favicon: icon ? icon.href : null,
        ogImage: attr('meta[property="og:image"]', 'content') || attr('meta[name="og:image"]', 'content'),
        headings,
    };
}
"#;

/// Metadata extraction functionality
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract page metadata
    #[instrument(skip(driver, heuristics))]
    pub async fn extract<D: PageDriver>(
        driver: &D,
        heuristics: &HeuristicConfig,
    ) -> Result<PageMeta> {
        info!("Extracting page metadata");

        let script = with_args(
            SCRIPT,
            &json!({
                "maxHeadings": heuristics.max_headings,
                "headingChars": heuristics.heading_chars,
            }),
        )?;
        let mut meta: PageMeta = run_probe(driver, &script).await?;
        Self::clamp_headings(&mut meta, heuristics);

        debug!(
            "Extracted metadata: title={:?}, {} headings",
            meta.title,
            meta.headings.len()
        );
        Ok(meta)
    }

    /// Enforce the heading count and per-heading character caps
    pub fn clamp_headings(meta: &mut PageMeta, heuristics: &HeuristicConfig) {
        meta.headings.truncate(heuristics.max_headings);
        for heading in &mut meta.headings {
            if heading.text.chars().count() > heuristics.heading_chars {
                heading.text = heading.text.chars().take(heuristics.heading_chars).collect();
            }
        }
    }
}

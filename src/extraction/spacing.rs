//! Spacing sampling
//!
//! Reads padding, margin and gap from structural elements. Only finite values
//! strictly between 0 and `maxPx` are kept.

use super::{run_probe, with_args};
use crate::browser::PageDriver;
use crate::config::HeuristicConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Raw spacing measurements, px
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpacingSamples {
    /// Every kept measurement, duplicates included
    #[serde(default)]
    pub values: Vec<f64>,
}

const SCRIPT: &str = r#"
(args) => {
    const props = [
        'paddingTop', 'paddingRight', 'paddingBottom', 'paddingLeft',
        'marginTop', 'marginRight', 'marginBottom', 'marginLeft',
        'rowGap', 'columnGap',
    ];
    const values = [];
    const els = document.querySelectorAll('section, article, div, nav, header, footer, main');
    const n = Math.min(els.length, args.limit);
    for (let i = 0; i < n; i++) {
        const cs = getComputedStyle(els[i]);
        for (const prop of props) {
            const v = parseFloat(cs[prop]);
            if (Number.isFinite(v) && v > 0 && v < args.maxPx) values.push(v);
        }
    }
    return { values };
}
"#;

/// Spacing sampling functionality
pub struct SpacingExtractor;

impl SpacingExtractor {
    /// Sample spacing values from structural elements
    #[instrument(skip(driver, heuristics))]
    pub async fn extract<D: PageDriver>(
        driver: &D,
        heuristics: &HeuristicConfig,
    ) -> Result<SpacingSamples> {
        info!("Sampling spacing");
        let max_px = heuristics.max_spacing_px;
        let script = with_args(
            SCRIPT,
            &json!({ "limit": heuristics.max_spacing_elements, "maxPx": max_px }),
        )?;
        let mut samples: SpacingSamples = run_probe(driver, &script).await?;
        samples
            .values
            .retain(|v| v.is_finite() && *v > 0.0 && *v < max_px);
        debug!("Sampled {} spacing values", samples.values.len());
        Ok(samples)
    }
}

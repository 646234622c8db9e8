//! Extraction configuration
//!
//! [`ExtractOptions`] carries everything one extraction needs: browser launch
//! settings, navigation tiers, timing, and the [`HeuristicConfig`] constants
//! used by the samplers and the palette pipeline. The heuristics are
//! empirically chosen; they are kept as tunable values, not derived ones.
//! A JSON [`FileConfig`] can override heuristics and timing.

use crate::browser::{BrowserConfig, CaptureOptions, NavigationOptions, ScrollOptions};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sample weight per usage context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextWeights {
    /// `button-bg`
    pub button_bg: f64,
    /// `nav-bg`
    pub nav_bg: f64,
    /// `heading`
    pub heading: f64,
    /// `border`
    pub border: f64,
    /// `outline`
    pub outline: f64,
    /// `theme-color` meta tag
    pub theme_color: f64,
    /// Everything else (background, text, link, button-text, body-text)
    pub other: f64,
}

impl Default for ContextWeights {
    fn default() -> Self {
        Self {
            button_bg: 3.0,
            nav_bg: 2.0,
            heading: 2.0,
            border: 0.5,
            outline: 0.5,
            theme_color: 5.0,
            other: 1.0,
        }
    }
}

/// Tunable constants for sampling, clustering and classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeuristicConfig {
    /// Sample weights per usage context
    pub weights: ContextWeights,
    /// Colors with alpha below this are ignored
    pub min_alpha: f64,
    /// Maximum visible elements read by the color sampler
    pub max_color_elements: usize,
    /// Maximum structural elements read by the spacing sampler
    pub max_spacing_elements: usize,
    /// Spacing values must be strictly below this (px)
    pub max_spacing_px: f64,
    /// Minimum chroma for a color to be called an accent
    pub accent_min_chroma: f64,
    /// Lower bound on k
    pub min_clusters: usize,
    /// Upper bound on k
    pub max_clusters: usize,
    /// Iteration cap for k-means
    pub kmeans_max_iter: usize,
    /// Centroid movement below which k-means stops early
    pub kmeans_epsilon: f64,
    /// Fraction of multiples of 8 above which the grid unit is 8
    pub grid8_threshold: f64,
    /// Headings reported in page metadata
    pub max_headings: usize,
    /// Character cap per heading text
    pub heading_chars: usize,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            weights: ContextWeights::default(),
            min_alpha: 0.15,
            max_color_elements: 600,
            max_spacing_elements: 200,
            max_spacing_px: 600.0,
            accent_min_chroma: 0.04,
            min_clusters: 6,
            max_clusters: 12,
            kmeans_max_iter: 60,
            kmeans_epsilon: 0.001,
            grid8_threshold: 0.45,
            max_headings: 8,
            heading_chars: 80,
        }
    }
}

/// Everything one extraction needs
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Navigation tiers
    pub navigation: NavigationOptions,
    /// Lazy-load scrolling
    pub scroll: ScrollOptions,
    /// Screenshot settings
    pub capture: CaptureOptions,
    /// Pause after load for late async renders (default: 2500)
    pub settle_ms: u64,
    /// Per-click budget for overlay dismissal (default: 1000)
    pub overlay_click_timeout_ms: u64,
    /// Per-probe budget for the extractor fan-out (default: 15000)
    pub probe_timeout_ms: u64,
    /// Capture a viewport screenshot (default: true)
    pub screenshot: bool,
    /// Sampling and palette constants
    pub heuristics: HeuristicConfig,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            navigation: NavigationOptions::default(),
            scroll: ScrollOptions::default(),
            capture: CaptureOptions::default(),
            settle_ms: 2500,
            overlay_click_timeout_ms: 1000,
            probe_timeout_ms: 15000,
            screenshot: true,
            heuristics: HeuristicConfig::default(),
        }
    }
}

/// Slack added on top of the longest navigation tier for CDP requests
pub const REQUEST_TIMEOUT_MARGIN_MS: u64 = 5000;

impl ExtractOptions {
    /// Launch settings with the CDP request timeout raised to cover the
    /// longest navigation tier, so the tier budgets are what bound a load
    pub fn browser_config(&self) -> BrowserConfig {
        let longest_tier = self
            .navigation
            .primary_timeout_ms
            .max(self.navigation.fallback_timeout_ms);
        let mut browser = self.browser.clone();
        browser.request_timeout_ms = browser
            .request_timeout_ms
            .max(longest_tier.saturating_add(REQUEST_TIMEOUT_MARGIN_MS));
        browser
    }
}

/// Timing overrides accepted from a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// Overrides [`ExtractOptions::settle_ms`]
    pub settle_ms: Option<u64>,
    /// Overrides [`ExtractOptions::probe_timeout_ms`]
    pub probe_timeout_ms: Option<u64>,
    /// Overrides [`ExtractOptions::overlay_click_timeout_ms`]
    pub overlay_click_timeout_ms: Option<u64>,
    /// Overrides the network-idle tier timeout
    pub primary_timeout_ms: Option<u64>,
    /// Overrides the DOMContentLoaded tier timeout
    pub fallback_timeout_ms: Option<u64>,
    /// Overrides the scroll distance cap
    pub scroll_max_px: Option<u32>,
}

/// On-disk configuration (JSON)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileConfig {
    /// Heuristic constants
    pub heuristics: HeuristicConfig,
    /// Timing overrides
    pub timing: TimingConfig,
}

impl FileConfig {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Overlay onto `options`
    pub fn apply(self, options: &mut ExtractOptions) {
        options.heuristics = self.heuristics;
        let t = self.timing;
        if let Some(v) = t.settle_ms {
            options.settle_ms = v;
        }
        if let Some(v) = t.probe_timeout_ms {
            options.probe_timeout_ms = v;
        }
        if let Some(v) = t.overlay_click_timeout_ms {
            options.overlay_click_timeout_ms = v;
        }
        if let Some(v) = t.primary_timeout_ms {
            options.navigation.primary_timeout_ms = v;
        }
        if let Some(v) = t.fallback_timeout_ms {
            options.navigation.fallback_timeout_ms = v;
        }
        if let Some(v) = t.scroll_max_px {
            options.scroll.max_px = v;
        }
    }
}

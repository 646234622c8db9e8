//! Extraction orchestration
//!
//! One request runs strictly in this order:
//!
//! ```text
//! validate ─▶ launch ─▶ navigate (idle, then DOMContentLoaded) ─▶ settle
//!    ─▶ dismiss overlays ─▶ auto-scroll ─▶ ┬ css vars   ┐
//!                                         ├ colors     │
//!                                         ├ typography ├─ join ─▶ screenshot ─▶ close
//!                                         ├ spacing    │
//!                                         ├ components │
//!                                         └ metadata   ┘
//! ```
//!
//! Only invalid input and a navigation that fails on both tiers abort the
//! request. Each probe is contained: a failure or timeout yields that probe's
//! default value. The browser is closed on every exit path.

use crate::browser::{
    BrowserController, CaptureOptions, OverlayDismisser, PageCapture, PageDriver, PageNavigator,
    Screenshot, UrlValidator,
};
use crate::color::ColorPalette;
use crate::config::{ExtractOptions, HeuristicConfig};
use crate::error::{Error, ExtractionError, NavigationError, Result};
use crate::extraction::{
    ColorExtractor, ColorSamples, ComponentExtractor, ComponentStyles, CssVarExtractor, CssVars,
    MetadataExtractor, PageMeta, SpacingExtractor, SpacingSamples, TypographyExtractor,
    TypographyProfile,
};
use crate::spacing::{normalize_spacing_with, SpacingScale};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};
use url::Url;

/// A successful extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Always `true`
    pub success: bool,
    /// Final page URL
    pub url: String,
    /// When the extraction finished
    pub extracted_at: DateTime<Utc>,
    /// Wall time in seconds, one decimal
    pub elapsed: f64,
    /// Page metadata
    pub meta: PageMeta,
    /// Custom properties, name → value
    pub css_vars: BTreeMap<String, String>,
    /// Clustered palette and semantic roles
    pub color_palette: ColorPalette,
    /// Typography profile
    pub typography: TypographyProfile,
    /// Inferred spacing scale
    pub spacing_scale: SpacingScale,
    /// Component style snapshots
    pub components: ComponentStyles,
    /// Viewport screenshot, if captured
    pub screenshot: Option<Screenshot>,
}

/// A failed extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Always `false`
    pub success: bool,
    /// Human-readable reason
    pub error: String,
    /// Requested URL
    pub url: String,
}

impl ExtractionFailure {
    /// Build a failure payload
    pub fn new(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            url: url.into(),
        }
    }
}

/// The one response shape callers see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResponse {
    /// `success: true`
    Success(Box<ExtractionResult>),
    /// `success: false`
    Failure(ExtractionFailure),
}

impl ExtractionResponse {
    /// True for a successful extraction
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResponse::Success(_))
    }

    /// The URL this response is about
    pub fn url(&self) -> &str {
        match self {
            ExtractionResponse::Success(r) => &r.url,
            ExtractionResponse::Failure(f) => &f.url,
        }
    }
}

/// Raw outputs of the six probes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeOutputs {
    /// Metadata probe
    pub meta: PageMeta,
    /// CSS variable probe
    pub css_vars: CssVars,
    /// Color probe
    pub colors: ColorSamples,
    /// Typography probe
    pub typography: TypographyProfile,
    /// Spacing probe
    pub spacing: SpacingSamples,
    /// Component probe
    pub components: ComponentStyles,
}

impl ExtractionResult {
    /// Derive palette and spacing scale from probe outputs and assemble the result
    pub fn assemble(
        url: impl Into<String>,
        outputs: ProbeOutputs,
        screenshot: Option<Screenshot>,
        elapsed: Duration,
        heuristics: &HeuristicConfig,
    ) -> Self {
        let color_palette =
            ColorPalette::from_samples(&outputs.colors.colors, heuristics, &mut rand::rng());
        let spacing_scale = normalize_spacing_with(&outputs.spacing.values, heuristics.grid8_threshold);

        Self {
            success: true,
            url: url.into(),
            extracted_at: Utc::now(),
            elapsed: (elapsed.as_secs_f64() * 10.0).round() / 10.0,
            meta: outputs.meta,
            css_vars: outputs.css_vars.vars,
            color_palette,
            typography: outputs.typography,
            spacing_scale,
            components: outputs.components,
            screenshot,
        }
    }
}

/// Reject missing and malformed URLs before any browser work
pub fn validate_url(url: &str) -> Result<Url> {
    if url.trim().is_empty() {
        return Err(Error::invalid_input("url is required"));
    }
    UrlValidator::validate(url).map_err(|e| NavigationError::InvalidUrl(e).into())
}

/// Run `fut` under a time budget; any failure becomes `T::default()`
pub async fn contained<T, F>(probe: &'static str, timeout_ms: u64, fut: F) -> T
where
    T: Default,
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            warn!("Probe '{}' failed, using default: {}", probe, e);
            T::default()
        }
        Err(_) => {
            warn!(
                "{}; using default",
                ExtractionError::Timeout {
                    probe,
                    ms: timeout_ms
                }
            );
            T::default()
        }
    }
}

/// Design-system extraction over a real browser or any [`PageDriver`]
#[derive(Debug, Clone, Default)]
pub struct DesignExtractor {
    options: ExtractOptions,
}

impl DesignExtractor {
    /// Create an extractor with the given options
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// The options in effect
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract a design system from `url`, launching and tearing down a browser
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> ExtractionResponse {
        let started = Instant::now();
        match self.try_extract(url, started).await {
            Ok(result) => ExtractionResponse::Success(Box::new(result)),
            Err(e) => {
                error!("Extraction failed for {}: {}", url, e);
                ExtractionResponse::Failure(e.into_failure(url))
            }
        }
    }

    async fn try_extract(&self, url: &str, started: Instant) -> Result<ExtractionResult> {
        let target = validate_url(url)?;

        let controller = BrowserController::launch(self.options.browser_config()).await?;
        let outcome = match controller.new_page().await {
            Ok(page) => self.run(&page, target.as_str(), started).await,
            Err(e) => Err(e),
        };

        if let Err(e) = controller.close().await {
            warn!("Browser teardown failed: {}", e);
        }
        outcome
    }

    /// Extract from an already-open page
    pub async fn extract_with_driver<D: PageDriver>(
        &self,
        driver: &D,
        url: &str,
    ) -> Result<ExtractionResult> {
        let started = Instant::now();
        let target = validate_url(url)?;
        self.run(driver, target.as_str(), started).await
    }

    async fn run<D: PageDriver>(
        &self,
        driver: &D,
        url: &str,
        started: Instant,
    ) -> Result<ExtractionResult> {
        let opts = &self.options;

        let tier = PageNavigator::load(driver, url, &opts.navigation).await?;
        info!("Page loaded via {:?} tier", tier);

        if opts.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(opts.settle_ms)).await;
        }

        let dismissed = OverlayDismisser::dismiss_all(driver, opts.overlay_click_timeout_ms).await;
        if dismissed > 0 {
            info!("Dismissed {} overlays", dismissed);
        }

        if let Err(e) = PageNavigator::auto_scroll(driver, &opts.scroll).await {
            warn!("Auto-scroll failed: {}", e);
        }

        let outputs = self.probe_all(driver).await;

        let screenshot = if opts.screenshot {
            self.capture(driver, &opts.capture).await
        } else {
            None
        };

        let final_url = self.final_url(driver, url).await;
        Ok(ExtractionResult::assemble(
            final_url,
            outputs,
            screenshot,
            started.elapsed(),
            &opts.heuristics,
        ))
    }

    /// Run all six probes concurrently, each contained
    pub async fn probe_all<D: PageDriver>(&self, driver: &D) -> ProbeOutputs {
        let ms = self.options.probe_timeout_ms;
        let heuristics = &self.options.heuristics;

        let (meta, css_vars, colors, typography, spacing, components) = tokio::join!(
            contained("metadata", ms, MetadataExtractor::extract(driver, heuristics)),
            contained("css-vars", ms, CssVarExtractor::extract(driver)),
            contained("colors", ms, ColorExtractor::extract(driver, heuristics)),
            contained("typography", ms, TypographyExtractor::extract(driver)),
            contained("spacing", ms, SpacingExtractor::extract(driver, heuristics)),
            contained("components", ms, ComponentExtractor::extract(driver)),
        );

        ProbeOutputs {
            meta,
            css_vars,
            colors,
            typography,
            spacing,
            components,
        }
    }

    async fn capture<D: PageDriver>(&self, driver: &D, options: &CaptureOptions) -> Option<Screenshot> {
        if let Err(e) = PageNavigator::scroll_to_top(driver).await {
            warn!("Scroll reset before screenshot failed: {}", e);
        }
        match PageCapture::viewport_screenshot(driver, options).await {
            Ok(shot) => Some(shot),
            Err(e) => {
                warn!("Screenshot skipped: {}", e);
                None
            }
        }
    }

    async fn final_url<D: PageDriver>(&self, driver: &D, requested: &str) -> String {
        match driver.evaluate("location.href").await {
            Ok(serde_json::Value::String(href)) if !href.is_empty() && href != "about:blank" => href,
            _ => requested.to_string(),
        }
    }
}

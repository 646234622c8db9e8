//! Page navigation functionality
//!
//! Navigation is two-tiered: first wait for network idle, and if that fails
//! (single-page apps that poll forever never go idle) navigate again and only
//! wait for DOMContentLoaded. After loading, the page is scrolled through in
//! fixed steps so lazy-loaded sections render before sampling.

use crate::browser::PageDriver;
use crate::error::{Error, NavigationError, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Quiet period (no finished resource loads) that counts as network idle
pub const NETWORK_IDLE_WINDOW_MS: u64 = 500;

/// Condition to wait for after navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Wait until load event fires
    Load,
    /// Wait until DOMContentLoaded event fires
    DomContentLoaded,
    /// Wait until load, then until no resource finishes for the idle window
    NetworkIdle,
}

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Primary wait condition (default: network idle)
    pub primary: WaitUntil,
    /// Primary tier timeout in milliseconds (default: 45000)
    pub primary_timeout_ms: u64,
    /// Fallback wait condition (default: DOMContentLoaded)
    pub fallback: WaitUntil,
    /// Fallback tier timeout in milliseconds (default: 30000)
    pub fallback_timeout_ms: u64,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            primary: WaitUntil::NetworkIdle,
            primary_timeout_ms: 45000,
            fallback: WaitUntil::DomContentLoaded,
            fallback_timeout_ms: 30000,
        }
    }
}

/// Which tier brought the page up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Primary wait condition was met
    Primary,
    /// Primary tier failed; fallback wait condition was met
    Fallback,
}

/// Options for lazy-load scrolling
#[derive(Debug, Clone)]
pub struct ScrollOptions {
    /// Pixels per step (default: 400)
    pub step_px: u32,
    /// Pause between steps in milliseconds (default: 80)
    pub pacing_ms: u64,
    /// Upper bound on total scroll distance (default: 15000)
    pub max_px: u32,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            step_px: 400,
            pacing_ms: 80,
            max_px: 15000,
        }
    }
}

/// URL validation utilities
pub struct UrlValidator;

impl UrlValidator {
    /// Validate a URL for navigation
    pub fn validate(url: &str) -> std::result::Result<Url, String> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err("URL cannot be empty".to_string());
        }

        if trimmed.len() > 2048 {
            return Err("URL exceeds maximum length of 2048 characters".to_string());
        }

        let parsed = Url::parse(trimmed).map_err(|e| format!("{}: {}", e, trimmed))?;
        match parsed.scheme() {
            "http" | "https" | "file" => Ok(parsed),
            other => Err(format!(
                "URL must use http, https, or file (got {}): {}",
                other, trimmed
            )),
        }
    }

    /// Check if URL points to localhost
    pub fn is_localhost(url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .map(|host| matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]" | "0.0.0.0"))
            .unwrap_or(false)
    }
}

/// Navigation, settling and scrolling over any [`PageDriver`]
pub struct PageNavigator;

impl PageNavigator {
    /// Load `url`, falling back to the weaker wait condition once
    #[instrument(skip(driver, opts))]
    pub async fn load<D: PageDriver>(
        driver: &D,
        url: &str,
        opts: &NavigationOptions,
    ) -> Result<NavigationOutcome> {
        let start = Instant::now();
        info!("Navigating to: {}", url);

        let primary = match Self::navigate_tier(driver, url, opts.primary, opts.primary_timeout_ms)
            .await
        {
            Ok(()) => {
                debug!("Primary tier ready in {}ms", start.elapsed().as_millis());
                return Ok(NavigationOutcome::Primary);
            }
            Err(e) => e,
        };

        warn!(
            "{:?} wait failed ({}); retrying with {:?}",
            opts.primary, primary, opts.fallback
        );

        match Self::navigate_tier(driver, url, opts.fallback, opts.fallback_timeout_ms).await {
            Ok(()) => {
                info!(
                    "Fallback tier ready in {}ms",
                    start.elapsed().as_millis()
                );
                Ok(NavigationOutcome::Fallback)
            }
            Err(fallback) => Err(NavigationError::AllTiersFailed {
                primary: primary.to_string(),
                fallback: fallback.to_string(),
            }
            .into()),
        }
    }

    async fn navigate_tier<D: PageDriver>(
        driver: &D,
        url: &str,
        wait_until: WaitUntil,
        timeout_ms: u64,
    ) -> Result<()> {
        tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            driver.navigate(url, wait_until),
        )
        .await
        .map_err(|_| Error::from(NavigationError::Timeout(timeout_ms)))?
    }

    /// Scroll through the page to trigger lazy loading, then return to the top.
    ///
    /// The document height is re-read after every step, so sections appended
    /// while scrolling are reached too, up to `max_px`.
    #[instrument(skip(driver, opts))]
    pub async fn auto_scroll<D: PageDriver>(driver: &D, opts: &ScrollOptions) -> Result<u32> {
        let step = opts.step_px.max(1);
        let mut height = Self::scroll_height(driver).await?;
        let mut position = 0u32;

        while position < height.min(opts.max_px) {
            position = (position + step).min(height.min(opts.max_px));
            driver
                .evaluate(&format!("window.scrollTo(0, {}); true", position))
                .await?;
            if opts.pacing_ms > 0 {
                tokio::time::sleep(Duration::from_millis(opts.pacing_ms)).await;
            }
            height = Self::scroll_height(driver).await?;
        }

        Self::scroll_to_top(driver).await?;
        debug!("Scrolled {}px of {}px", position, height);
        Ok(position)
    }

    async fn scroll_height<D: PageDriver>(driver: &D) -> Result<u32> {
        Ok(driver
            .evaluate(
                "Math.max(document.body ? document.body.scrollHeight : 0, \
                 document.documentElement ? document.documentElement.scrollHeight : 0)",
            )
            .await?
            .as_f64()
            .unwrap_or(0.0)
            .max(0.0) as u32)
    }

    /// Reset scroll position to the top of the document
    pub async fn scroll_to_top<D: PageDriver>(driver: &D) -> Result<()> {
        driver.evaluate("window.scrollTo(0, 0); true").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::CaptureOptions;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// A page that grows by `grow_px` once scrolling nears its bottom
    struct GrowingPage {
        height: Mutex<u32>,
        grow_px: u32,
        viewport: u32,
        grown: Mutex<bool>,
        deepest: Mutex<u32>,
    }

    impl GrowingPage {
        fn new(height: u32, grow_px: u32) -> Self {
            Self {
                height: Mutex::new(height),
                grow_px,
                viewport: 800,
                grown: Mutex::new(false),
                deepest: Mutex::new(0),
            }
        }
    }

    impl PageDriver for GrowingPage {
        async fn evaluate(&self, script: &str) -> Result<Value> {
            if script.contains("scrollHeight") {
                return Ok(json!(*self.height.lock().unwrap()));
            }
            if let Some(rest) = script.strip_prefix("window.scrollTo(0, ") {
                let y: u32 = rest.split(')').next().unwrap().trim().parse().unwrap();
                let mut deepest = self.deepest.lock().unwrap();
                *deepest = (*deepest).max(y);
                let mut height = self.height.lock().unwrap();
                let mut grown = self.grown.lock().unwrap();
                if !*grown && y + self.viewport >= *height {
                    *height += self.grow_px;
                    *grown = true;
                }
            }
            Ok(json!(true))
        }

        async fn navigate(&self, _url: &str, _wait_until: WaitUntil) -> Result<()> {
            Ok(())
        }

        async fn click(&self, _selector: &str) -> Result<()> {
            Ok(())
        }

        async fn screenshot(&self, _options: &CaptureOptions) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn no_pacing() -> ScrollOptions {
        ScrollOptions {
            pacing_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_auto_scroll_follows_appended_sections() {
        let page = GrowingPage::new(2000, 1200);
        let scrolled = PageNavigator::auto_scroll(&page, &no_pacing()).await.unwrap();

        assert_eq!(*page.height.lock().unwrap(), 3200);
        assert_eq!(scrolled, 3200);
        assert_eq!(*page.deepest.lock().unwrap(), 3200);
    }

    #[tokio::test]
    async fn test_auto_scroll_respects_cap() {
        let page = GrowingPage::new(40_000, 0);
        let scrolled = PageNavigator::auto_scroll(&page, &no_pacing()).await.unwrap();
        assert_eq!(scrolled, 15000);
        assert_eq!(*page.deepest.lock().unwrap(), 15000);
    }

    #[tokio::test]
    async fn test_auto_scroll_empty_document() {
        let page = GrowingPage::new(0, 0);
        let scrolled = PageNavigator::auto_scroll(&page, &no_pacing()).await.unwrap();
        assert_eq!(scrolled, 0);
    }

    #[test]
    fn test_navigation_options_default() {
        let opts = NavigationOptions::default();
        assert_eq!(opts.primary, WaitUntil::NetworkIdle);
        assert_eq!(opts.primary_timeout_ms, 45000);
        assert_eq!(opts.fallback, WaitUntil::DomContentLoaded);
        assert_eq!(opts.fallback_timeout_ms, 30000);
    }

    #[test]
    fn test_scroll_options_default() {
        let opts = ScrollOptions::default();
        assert_eq!(opts.step_px, 400);
        assert_eq!(opts.pacing_ms, 80);
        assert_eq!(opts.max_px, 15000);
    }

    #[test]
    fn test_url_validation_valid() {
        assert!(UrlValidator::validate("http://example.com").is_ok());
        assert!(UrlValidator::validate("https://example.com?foo=bar#x").is_ok());
        assert!(UrlValidator::validate("file:///tmp/page.html").is_ok());
        assert!(UrlValidator::validate("  https://example.com  ").is_ok());
    }

    #[test]
    fn test_url_validation_empty() {
        let result = UrlValidator::validate("   ");
        assert!(result.unwrap_err().contains("empty"));
    }

    #[test]
    fn test_url_validation_no_scheme() {
        assert!(UrlValidator::validate("example.com").is_err());
    }

    #[test]
    fn test_url_validation_invalid_scheme() {
        let err = UrlValidator::validate("ftp://example.com").unwrap_err();
        assert!(err.contains("ftp"));
    }

    #[test]
    fn test_url_validation_too_long() {
        let long_url = format!("https://example.com/{}", "a".repeat(3000));
        assert!(UrlValidator::validate(&long_url)
            .unwrap_err()
            .contains("maximum length"));
    }

    #[test]
    fn test_localhost_check() {
        assert!(UrlValidator::is_localhost("http://127.0.0.1:8080"));
        assert!(UrlValidator::is_localhost("http://LOCALHOST:3000"));
        assert!(UrlValidator::is_localhost("http://[::1]:8080"));
        assert!(!UrlValidator::is_localhost("https://example.com/localhost/api"));
    }
}

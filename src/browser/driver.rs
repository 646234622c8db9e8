//! The browser capability seen by the rest of the crate
//!
//! Extractors, navigation and capture never touch chromiumoxide directly; they
//! drive a [`PageDriver`]. The CDP implementation lives on [`PageHandle`], and
//! tests substitute scripted fakes.

use crate::browser::capture::CaptureOptions;
use crate::browser::controller::PageHandle;
use crate::browser::navigation::{WaitUntil, NETWORK_IDLE_WINDOW_MS};
use crate::error::{CaptureError, Error, ExtractionError, NavigationError, Result};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, NavigateParams, Viewport as ClipRect,
};
use chromiumoxide::page::ScreenshotParams;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, instrument};

/// Minimal page capability: evaluate, navigate, click, screenshot.
///
/// Scripts passed to [`PageDriver::evaluate`] must be read-only expressions
/// that produce a JSON-serializable value (promises are awaited).
pub trait PageDriver: Sync {
    /// Evaluate a script in the page and return its JSON result
    fn evaluate(&self, script: &str) -> impl Future<Output = Result<Value>> + Send;

    /// Navigate to `url` and wait for `wait_until`. Unbounded; callers apply timeouts.
    fn navigate(&self, url: &str, wait_until: WaitUntil)
        -> impl Future<Output = Result<()>> + Send;

    /// Click the first element matching `selector`
    fn click(&self, selector: &str) -> impl Future<Output = Result<()>> + Send;

    /// Capture a raster screenshot according to `options`
    fn screenshot(&self, options: &CaptureOptions)
        -> impl Future<Output = Result<Vec<u8>>> + Send;
}

impl PageDriver for PageHandle {
    async fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ExtractionError::JsExecutionFailed(e.to_string()))?;

        result
            .into_value::<Value>()
            .map_err(|e| ExtractionError::InvalidResult(e.to_string()).into())
    }

    #[instrument(skip(self))]
    async fn navigate(&self, url: &str, wait_until: WaitUntil) -> Result<()> {
        match wait_until {
            WaitUntil::Load | WaitUntil::NetworkIdle => {
                self.page
                    .goto(url)
                    .await
                    .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;
            }
            WaitUntil::DomContentLoaded => {
                // Page.navigate returns once the new document commits, without
                // waiting for the load event.
                let response = self
                    .page
                    .execute(NavigateParams::new(url))
                    .await
                    .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;
                if let Some(error_text) = response.result.error_text.clone() {
                    return Err(NavigationError::LoadFailed(error_text).into());
                }
            }
        }

        self.page
            .evaluate(wait_script(wait_until).as_str())
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        let final_url = self
            .page
            .url()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .unwrap_or_else(|| url.to_string());
        debug!("Navigation settled ({:?}): {}", wait_until, final_url);
        self.set_url(final_url).await;

        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        Ok(())
    }

    async fn screenshot(&self, options: &CaptureOptions) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(options.quality as i64)
            .clip(ClipRect {
                x: 0.0,
                y: 0.0,
                width: options.width as f64,
                height: options.height as f64,
                scale: 1.0,
            })
            .build();

        self.page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()).into())
    }
}

/// In-page readiness probe for a wait condition
fn wait_script(wait_until: WaitUntil) -> String {
    match wait_until {
        WaitUntil::Load => r#"
            new Promise(resolve => {
                if (document.readyState === 'complete') {
                    resolve(true);
                } else {
                    window.addEventListener('load', () => resolve(true));
                }
            })
        "#
        .to_string(),
        WaitUntil::DomContentLoaded => r#"
            new Promise(resolve => {
                if (document.readyState !== 'loading') {
                    resolve(true);
                } else {
                    document.addEventListener('DOMContentLoaded', () => resolve(true));
                }
            })
        "#
        .to_string(),
        // Idle = no resource finished loading for the idle window after `load`.
        WaitUntil::NetworkIdle => format!(
            r#"
            new Promise(resolve => {{
                const idleMs = {idle};
                let lastActivity = Date.now();
                try {{
                    new PerformanceObserver(() => {{ lastActivity = Date.now(); }})
                        .observe({{ type: 'resource', buffered: false }});
                }} catch (e) {{}}
                const watch = () => {{
                    lastActivity = Date.now();
                    const tick = () => {{
                        if (Date.now() - lastActivity >= idleMs) {{
                            resolve(true);
                        }} else {{
                            setTimeout(tick, 100);
                        }}
                    }};
                    tick();
                }};
                if (document.readyState === 'complete') {{
                    watch();
                }} else {{
                    window.addEventListener('load', watch);
                }}
            }})
        "#,
            idle = NETWORK_IDLE_WINDOW_MS
        ),
    }
}

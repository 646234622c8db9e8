//! Viewport screenshot capture
//!
//! The screenshot is supplementary: callers treat any failure here as "no
//! screenshot" rather than a failed extraction.

use crate::browser::PageDriver;
use crate::error::{CaptureError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Options for viewport capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOptions {
    /// JPEG quality (0-100)
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Clip width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Clip height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Capture timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_quality() -> u8 {
    85
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    800
}

fn default_timeout_ms() -> u64 {
    15000
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            width: default_width(),
            height: default_height(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CaptureOptions {
    /// JPEG capture clipped to the given viewport
    pub fn viewport(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

/// An encoded screenshot as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type of `data`
    pub mime_type: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Screenshot {
    /// Wrap raw JPEG bytes
    pub fn from_jpeg(bytes: &[u8], width: u32, height: u32) -> Self {
        Self {
            data: BASE64.encode(bytes),
            mime_type: "image/jpeg".to_string(),
            width,
            height,
        }
    }

    /// Size of the decoded image in bytes
    pub fn decoded_len(&self) -> usize {
        BASE64.decode(&self.data).map(|b| b.len()).unwrap_or(0)
    }
}

/// Page capture functionality
pub struct PageCapture;

impl PageCapture {
    /// Capture the top viewport as JPEG. Expects the page already scrolled to top.
    #[instrument(skip(driver))]
    pub async fn viewport_screenshot<D: PageDriver>(
        driver: &D,
        options: &CaptureOptions,
    ) -> Result<Screenshot> {
        info!("Capturing screenshot");

        let data = tokio::time::timeout(
            Duration::from_millis(options.timeout_ms),
            driver.screenshot(options),
        )
        .await
        .map_err(|_| CaptureError::Timeout(options.timeout_ms))??;

        if data.is_empty() {
            return Err(CaptureError::ScreenshotFailed("empty image".to_string()).into());
        }

        debug!("Screenshot captured: {} bytes", data.len());
        Ok(Screenshot::from_jpeg(&data, options.width, options.height))
    }
}

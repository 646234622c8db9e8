//! Pipeline tests over a scripted page
//!
//! `ScriptedPage` implements `PageDriver` without a browser: each probe script
//! is recognized by a marker it contains and answered with canned JSON, and
//! navigation/screenshot behavior is configurable per test.

use design_extract::browser::{CaptureOptions, PageDriver, WaitUntil, OVERLAY_SELECTORS};
use design_extract::error::{Error, ExtractionError, NavigationError};
use design_extract::{DesignExtractor, ExtractOptions, ExtractionResponse};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct ScriptedPage {
    idle_never_settles: bool,
    dom_content_loaded_fails: bool,
    failing_probes: HashSet<&'static str>,
    hanging_probes: HashSet<&'static str>,
    screenshot_fails: bool,
    clickable: Option<&'static str>,
    navigations: Mutex<Vec<WaitUntil>>,
    clicks: Mutex<Vec<String>>,
    screenshots: Mutex<usize>,
}

const PROBES: &[(&str, &str)] = &[
    ("css-vars", "declared"),
    ("colors", "canonical"),
    ("typography", "googleFonts"),
    ("spacing", "rowGap"),
    ("components", "navHeight"),
    ("metadata", "headingChars"),
];

fn probe_for(script: &str) -> Option<&'static str> {
    PROBES
        .iter()
        .find(|(_, marker)| script.contains(marker))
        .map(|(name, _)| *name)
}

fn canned(probe: &str) -> Value {
    match probe {
        "css-vars" => json!({ "vars": { "--brand": "#c9a962", "--radius": "8px" } }),
        "colors" => json!({
            "colors": [
                { "hex": "#0c0c0e", "rgb": { "r": 12, "g": 12, "b": 14 }, "count": 40, "contexts": ["background"] },
                { "hex": "#fafafa", "rgb": { "r": 250, "g": 250, "b": 250 }, "count": 25, "contexts": ["body-text", "heading"] },
                { "hex": "#c9a962", "rgb": { "r": 201, "g": 169, "b": 98 }, "count": 9, "contexts": ["button-bg"] },
                { "hex": "#27272a", "rgb": { "r": 39, "g": 39, "b": 42 }, "count": 2.5, "contexts": ["border"] }
            ]
        }),
        "typography" => json!({
            "samples": [
                { "role": "h1", "family": "\"Playfair Display\", serif", "size": 48, "weight": 700 },
                { "role": "body", "family": "Inter, sans-serif", "size": 16, "weight": 400 }
            ],
            "googleFonts": ["https://fonts.googleapis.com/css2?family=Inter"]
        }),
        "spacing" => json!({ "values": [8, 16, 24, 32, 48, 64, 12] }),
        "components" => json!({
            "button": { "selector": "button:not([aria-hidden])", "backgroundColor": "rgb(201, 169, 98)", "borderRadius": "6px" },
            "nav": { "selector": "nav" },
            "navHeight": 72
        }),
        "metadata" => json!({
            "title": "Aurum",
            "description": "Quiet luxury",
            "themeColor": "#0c0c0e",
            "headings": [{ "tag": "h1", "text": "Crafted in gold" }]
        }),
        _ => Value::Null,
    }
}

impl PageDriver for ScriptedPage {
    async fn evaluate(&self, script: &str) -> design_extract::Result<Value> {
        if let Some(probe) = probe_for(script) {
            if self.hanging_probes.contains(probe) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.failing_probes.contains(probe) {
                return Err(ExtractionError::JsExecutionFailed(format!("{probe} exploded")).into());
            }
            return Ok(canned(probe));
        }
        if script.contains("location.href") {
            return Ok(json!("https://aurum.test/"));
        }
        if script.contains("scrollHeight") {
            return Ok(json!(1800));
        }
        Ok(json!(true))
    }

    async fn navigate(&self, _url: &str, wait_until: WaitUntil) -> design_extract::Result<()> {
        self.navigations.lock().unwrap().push(wait_until);
        match wait_until {
            WaitUntil::NetworkIdle if self.idle_never_settles => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }
            WaitUntil::DomContentLoaded if self.dom_content_loaded_fails => {
                Err(NavigationError::LoadFailed("net::ERR_CONNECTION_RESET".to_string()).into())
            }
            _ => Ok(()),
        }
    }

    async fn click(&self, selector: &str) -> design_extract::Result<()> {
        self.clicks.lock().unwrap().push(selector.to_string());
        if self.clickable == Some(selector) {
            Ok(())
        } else {
            Err(Error::cdp("no element"))
        }
    }

    async fn screenshot(&self, _options: &CaptureOptions) -> design_extract::Result<Vec<u8>> {
        *self.screenshots.lock().unwrap() += 1;
        if self.screenshot_fails {
            Err(Error::cdp("target closed"))
        } else {
            Ok(vec![0xff, 0xd8, 0xff, 0xe0])
        }
    }
}

fn fast_options() -> ExtractOptions {
    let mut options = ExtractOptions {
        settle_ms: 0,
        overlay_click_timeout_ms: 50,
        probe_timeout_ms: 300,
        ..Default::default()
    };
    options.navigation.primary_timeout_ms = 150;
    options.navigation.fallback_timeout_ms = 150;
    options.scroll.pacing_ms = 0;
    options
}

#[tokio::test]
async fn test_full_extraction() {
    let page = ScriptedPage::default();
    let result = DesignExtractor::new(fast_options())
        .extract_with_driver(&page, "https://aurum.test")
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.url, "https://aurum.test/");
    assert_eq!(result.css_vars.get("--brand").map(String::as_str), Some("#c9a962"));
    assert_eq!(result.meta.title.as_deref(), Some("Aurum"));

    let semantic = &result.color_palette.semantic;
    assert_eq!(semantic.background.as_deref(), Some("#0c0c0e"));
    assert_eq!(semantic.text.as_deref(), Some("#fafafa"));
    assert_eq!(semantic.primary.as_deref(), Some("#c9a962"));
    assert_eq!(semantic.border.as_deref(), Some("#27272a"));
    assert_eq!(result.color_palette.palette[0].hex, "#0c0c0e");

    assert_eq!(result.typography.font_heading.as_deref(), Some("Playfair Display"));
    assert_eq!(result.typography.font_body.as_deref(), Some("Inter"));
    assert_eq!(result.spacing_scale.unit, 8);
    assert_eq!(result.components.nav_height, Some(72.0));

    let shot = result.screenshot.expect("screenshot captured");
    assert_eq!(shot.mime_type, "image/jpeg");
    assert_eq!((shot.width, shot.height), (1280, 800));

    assert_eq!(*page.navigations.lock().unwrap(), vec![WaitUntil::NetworkIdle]);
}

#[tokio::test]
async fn test_falls_back_when_network_never_idles() {
    let page = ScriptedPage {
        idle_never_settles: true,
        ..Default::default()
    };
    let result = DesignExtractor::new(fast_options())
        .extract_with_driver(&page, "https://polling.test")
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(
        *page.navigations.lock().unwrap(),
        vec![WaitUntil::NetworkIdle, WaitUntil::DomContentLoaded]
    );
}

#[tokio::test]
async fn test_both_tiers_failing_is_fatal() {
    let page = ScriptedPage {
        idle_never_settles: true,
        dom_content_loaded_fails: true,
        ..Default::default()
    };
    let err = DesignExtractor::new(fast_options())
        .extract_with_driver(&page, "https://down.test")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Navigation(NavigationError::AllTiersFailed { .. })
    ));
    assert!(!err.is_client_error());
    let failure = err.into_failure("https://down.test");
    assert!(!failure.success);
    assert!(failure.error.contains("ERR_CONNECTION_RESET"));
    assert_eq!(*page.screenshots.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_failing_probes_are_contained() {
    let page = ScriptedPage {
        failing_probes: ["colors", "css-vars"].into_iter().collect(),
        hanging_probes: ["typography"].into_iter().collect(),
        ..Default::default()
    };
    let result = DesignExtractor::new(fast_options())
        .extract_with_driver(&page, "https://flaky.test")
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.css_vars.is_empty());
    assert!(result.color_palette.palette.is_empty());
    assert!(result.color_palette.semantic.is_empty());
    assert!(result.typography.fonts.is_empty());
    // The rest still came through
    assert_eq!(result.meta.title.as_deref(), Some("Aurum"));
    assert_eq!(result.spacing_scale.unit, 8);
    assert!(result.components.button.is_some());
}

#[tokio::test]
async fn test_screenshot_failure_is_null() {
    let page = ScriptedPage {
        screenshot_fails: true,
        ..Default::default()
    };
    let result = DesignExtractor::new(fast_options())
        .extract_with_driver(&page, "https://aurum.test")
        .await
        .unwrap();

    assert!(result.screenshot.is_none());
    assert_eq!(*page.screenshots.lock().unwrap(), 1);
    let json = serde_json::to_value(&result).unwrap();
    assert!(json["screenshot"].is_null());
}

#[tokio::test]
async fn test_screenshot_can_be_disabled() {
    let page = ScriptedPage::default();
    let options = ExtractOptions {
        screenshot: false,
        ..fast_options()
    };
    let result = DesignExtractor::new(options)
        .extract_with_driver(&page, "https://aurum.test")
        .await
        .unwrap();

    assert!(result.screenshot.is_none());
    assert_eq!(*page.screenshots.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_overlay_selectors_all_tried() {
    let page = ScriptedPage {
        clickable: Some(OVERLAY_SELECTORS[0].0),
        ..Default::default()
    };
    DesignExtractor::new(fast_options())
        .extract_with_driver(&page, "https://consent.test")
        .await
        .unwrap();

    let clicks = page.clicks.lock().unwrap();
    assert_eq!(clicks.len(), OVERLAY_SELECTORS.len());
    assert_eq!(clicks[0], OVERLAY_SELECTORS[0].0);
}

#[tokio::test]
async fn test_invalid_url_rejected_before_navigation() {
    let page = ScriptedPage::default();
    let extractor = DesignExtractor::new(fast_options());

    let err = extractor.extract_with_driver(&page, "").await.unwrap_err();
    assert!(err.is_client_error());

    let err = extractor
        .extract_with_driver(&page, "ftp://files.test")
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    assert!(page.navigations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_extract_reports_missing_url_as_failure() {
    let response = DesignExtractor::new(fast_options()).extract("   ").await;
    match response {
        ExtractionResponse::Failure(failure) => {
            assert!(!failure.success);
            assert!(failure.error.contains("url is required"));
        }
        ExtractionResponse::Success(_) => panic!("expected failure"),
    }
}

//! Browser module tests
//!
//! These tests verify the browser configuration, capture, and navigation types.
//! Note: Full browser integration tests require a running Chrome/Chromium
//! instance and live in `fixture_page_tests.rs`.

use design_extract::browser::{
    BrowserConfig, CaptureOptions, NavigationOptions, Screenshot, ScrollOptions, UrlValidator,
    WaitUntil, DEFAULT_USER_AGENT, OVERLAY_SELECTORS,
};

#[test]
fn test_browser_config_default() {
    let config = BrowserConfig::default();
    assert!(config.headless);
    assert_eq!(config.width, 1280);
    assert_eq!(config.height, 800);
    assert!(config.sandbox);
    assert!(config.ignore_tls_errors);
    assert_eq!(config.launch_timeout_ms, 30000);
    assert_eq!(config.request_timeout_ms, 30000);
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    assert!(config.chrome_path.is_none());
    assert!(config.extra_args.is_empty());
}

#[test]
fn test_browser_config_builder() {
    let config = BrowserConfig::builder()
        .headless(false)
        .viewport(1440, 900)
        .sandbox(false)
        .user_agent("TestBot/1.0")
        .ignore_tls_errors(false)
        .launch_timeout_ms(60000)
        .chrome_path("/usr/bin/chromium")
        .arg("--disable-gpu")
        .build();

    assert!(!config.headless);
    assert_eq!((config.width, config.height), (1440, 900));
    assert!(!config.sandbox);
    assert_eq!(config.user_agent, "TestBot/1.0");
    assert!(!config.ignore_tls_errors);
    assert_eq!(config.launch_timeout_ms, 60000);
    assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
    assert_eq!(config.extra_args, vec!["--disable-gpu".to_string()]);
}

#[test]
fn test_chrome_args_reflect_config() {
    let args = BrowserConfig::default().chrome_args();
    assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
    assert!(args.contains(&"--window-size=1280,800".to_string()));
    assert!(args.contains(&"--ignore-certificate-errors".to_string()));
    assert!(!args.contains(&"--no-sandbox".to_string()));

    let strict = BrowserConfig::builder()
        .ignore_tls_errors(false)
        .sandbox(false)
        .build()
        .chrome_args();
    assert!(!strict.contains(&"--ignore-certificate-errors".to_string()));
    assert!(strict.contains(&"--no-sandbox".to_string()));
}

#[test]
fn test_capture_options_default() {
    let opts = CaptureOptions::default();
    assert_eq!(opts.quality, 85);
    assert_eq!((opts.width, opts.height), (1280, 800));
    assert_eq!(opts.timeout_ms, 15000);
}

#[test]
fn test_capture_options_partial_json() {
    let opts: CaptureOptions = serde_json::from_str(r#"{"quality": 60}"#).unwrap();
    assert_eq!(opts.quality, 60);
    assert_eq!(opts.width, 1280);
}

#[test]
fn test_screenshot_wire_shape() {
    let shot = Screenshot::from_jpeg(&[0xff, 0xd8, 0xff], 1280, 800);
    let json = serde_json::to_value(&shot).unwrap();
    assert_eq!(json["mimeType"], "image/jpeg");
    assert_eq!(json["width"], 1280);
    assert_eq!(json["height"], 800);
    assert_eq!(json["data"], "/9j/");
}

#[test]
fn test_navigation_tiers() {
    let opts = NavigationOptions::default();
    assert_eq!(opts.primary, WaitUntil::NetworkIdle);
    assert_eq!(opts.fallback, WaitUntil::DomContentLoaded);
    assert!(opts.primary_timeout_ms > opts.fallback_timeout_ms);
}

#[test]
fn test_scroll_defaults() {
    let opts = ScrollOptions::default();
    assert_eq!((opts.step_px, opts.pacing_ms, opts.max_px), (400, 80, 15000));
}

#[test]
fn test_url_validator() {
    assert!(UrlValidator::validate("https://example.com/pricing").is_ok());
    assert!(UrlValidator::validate("").is_err());
    assert!(UrlValidator::validate("mailto:someone@example.com").is_err());
}

#[test]
fn test_overlay_selectors_are_nonempty() {
    assert!(!OVERLAY_SELECTORS.is_empty());
    assert!(OVERLAY_SELECTORS.iter().all(|(sel, _)| !sel.trim().is_empty()));
}

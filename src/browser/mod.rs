//! Browser automation module
//!
//! This module provides browser control through ChromiumOxide: lifecycle
//! management, two-tier navigation, overlay dismissal, lazy-load scrolling and
//! viewport capture. Everything above this module talks to the page through
//! the [`PageDriver`] trait only.

pub mod capture;
pub mod controller;
pub mod driver;
pub mod navigation;
pub mod overlays;

pub use capture::{CaptureOptions, PageCapture, Screenshot};
pub use controller::{BrowserConfig, BrowserController, PageHandle, DEFAULT_USER_AGENT};
pub use driver::PageDriver;
pub use navigation::{
    NavigationOptions, NavigationOutcome, PageNavigator, ScrollOptions, UrlValidator, WaitUntil,
};
pub use overlays::{OverlayDismisser, OverlayIntent, OVERLAY_SELECTORS};

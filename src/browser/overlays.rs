//! Best-effort dismissal of cookie banners and newsletter modals
//!
//! This is a heuristic, not a contract: the selector list covers common
//! consent-manager and modal markup, and arbitrary sites may match none of it.
//! Every click is time-boxed and every failure is ignored.

use crate::browser::PageDriver;
use std::time::Duration;
use tracing::{debug, instrument};

/// What a selector is expected to do when clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayIntent {
    /// Accept a cookie/consent banner
    AcceptCookies,
    /// Close a modal or newsletter popup
    CloseModal,
}

/// Ordered (selector, intent) pairs tried on every page
pub const OVERLAY_SELECTORS: &[(&str, OverlayIntent)] = &[
    ("#onetrust-accept-btn-handler", OverlayIntent::AcceptCookies),
    ("#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll", OverlayIntent::AcceptCookies),
    ("[id*='cookie'] button[class*='accept']", OverlayIntent::AcceptCookies),
    ("[class*='cookie'] button[class*='accept']", OverlayIntent::AcceptCookies),
    ("button[aria-label*='Accept']", OverlayIntent::AcceptCookies),
    ("button[id*='accept']", OverlayIntent::AcceptCookies),
    ("[class*='consent'] button", OverlayIntent::AcceptCookies),
    ("[aria-label='Close']", OverlayIntent::CloseModal),
    ("[aria-label='close']", OverlayIntent::CloseModal),
    ("[class*='modal'] [class*='close']", OverlayIntent::CloseModal),
    ("[class*='popup'] [class*='close']", OverlayIntent::CloseModal),
    ("[class*='newsletter'] [class*='close']", OverlayIntent::CloseModal),
];

/// Clicks through [`OVERLAY_SELECTORS`]
pub struct OverlayDismisser;

impl OverlayDismisser {
    /// Try every selector in order; returns how many clicks landed
    #[instrument(skip(driver))]
    pub async fn dismiss_all<D: PageDriver>(driver: &D, click_timeout_ms: u64) -> usize {
        let mut dismissed = 0;
        for (selector, intent) in OVERLAY_SELECTORS {
            if Self::try_click(driver, selector, click_timeout_ms).await {
                debug!("Dismissed overlay via {} ({:?})", selector, intent);
                dismissed += 1;
            }
        }
        dismissed
    }

    async fn try_click<D: PageDriver>(driver: &D, selector: &str, timeout_ms: u64) -> bool {
        matches!(
            tokio::time::timeout(Duration::from_millis(timeout_ms), driver.click(selector)).await,
            Ok(Ok(()))
        )
    }
}

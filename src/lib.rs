//! design-extract - Design-system extraction from live websites
//!
//! Renders a URL in headless Chromium, samples computed styles through
//! in-page probes, and derives a compact, semantically labelled token set:
//! CSS variables, an OKLCH-clustered color palette with roles, typography,
//! a spacing scale and component styles, plus a viewport screenshot.
//!
//! # Architecture
//!
//! ```text
//! URL ──▶ BrowserController (CDP) ──▶ PageNavigator (idle ▸ DOMContentLoaded)
//!                                          │
//!                                          ▼
//!                    ┌──── six probes via PageDriver::evaluate ────┐
//!                    │ css vars · colors · typography · spacing ·  │
//!                    │ components · metadata                       │
//!                    └───────┬───────────────────────┬─────────────┘
//!                            ▼                       ▼
//!              oklch ▸ k-means ▸ semantic      spacing normalizer
//!                            │                       │
//!                            └──────▶ ExtractionResult ◀──── screenshot
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use design_extract::{DesignExtractor, ExtractOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let extractor = DesignExtractor::new(ExtractOptions::default());
//!     let response = extractor.extract("https://example.com").await;
//!     println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! }
//! ```
//!
//! The color and spacing stages are pure functions and usable on their own:
//!
//! ```rust
//! use design_extract::color::{hex_to_oklch, oklch_distance};
//! use design_extract::spacing::normalize_spacing;
//!
//! let gold = hex_to_oklch("#c9a962").unwrap();
//! assert_eq!(oklch_distance(&gold, &gold), 0.0);
//! assert_eq!(normalize_spacing(&[8.0, 16.0, 24.0]).unit, 8);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod color;
pub mod config;
pub mod error;
pub mod extraction;
pub mod mcp;
pub mod pipeline;
pub mod spacing;

// Re-exports for convenience
pub use browser::{BrowserConfig, BrowserController, PageDriver};
pub use color::{ColorPalette, PaletteEntry, RawColorSample, SemanticPalette};
pub use config::{ExtractOptions, FileConfig, HeuristicConfig};
pub use error::{Error, Result};
pub use mcp::McpServer;
pub use pipeline::{DesignExtractor, ExtractionFailure, ExtractionResponse, ExtractionResult};
pub use spacing::SpacingScale;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

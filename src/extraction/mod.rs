//! In-page signal extractors
//!
//! Each probe is a read-only script evaluated through [`PageDriver::evaluate`];
//! its JSON result is decoded with serde. Probes never mutate the page, so they
//! can run concurrently against the same handle.

pub mod colors;
pub mod components;
pub mod css_vars;
pub mod metadata;
pub mod spacing;
pub mod typography;

pub use colors::{ColorExtractor, ColorSamples};
pub use components::{ComponentExtractor, ComponentStyle, ComponentStyles, COMPONENT_SELECTORS};
pub use css_vars::{CssVarExtractor, CssVars};
pub use metadata::{Heading, MetadataExtractor, PageMeta};
pub use spacing::{SpacingExtractor, SpacingSamples};
pub use typography::{FontSample, FontUsage, TypographyExtractor, TypographyProfile};

use crate::browser::PageDriver;
use crate::error::{ExtractionError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Wrap a JS function expression so it is invoked with `args` as its only argument
pub(crate) fn with_args<A: Serialize>(function: &str, args: &A) -> Result<String> {
    let json = serde_json::to_string(args)?;
    Ok(format!("({})({})", function.trim(), json))
}

/// Evaluate `script` and decode its result into `T`
pub(crate) async fn run_probe<D, T>(driver: &D, script: &str) -> Result<T>
where
    D: PageDriver,
    T: DeserializeOwned,
{
    let value = driver.evaluate(script).await?;
    serde_json::from_value(value).map_err(|e| ExtractionError::InvalidResult(e.to_string()).into())
}

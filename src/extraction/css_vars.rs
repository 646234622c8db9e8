//! CSS custom property harvesting
//!
//! Walks every readable stylesheet (nested `@media`/`@supports` included) for
//! rules scoped to the root or a theme, collects their `--*` declarations, then
//! re-resolves each name against the computed style of `<html>` so the value
//! reflects the cascade's final state. Cross-origin sheets throw on
//! `cssRules` access and are skipped.

use super::run_probe;
use crate::browser::PageDriver;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Harvested custom properties, name → value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssVars {
    /// `--name` → resolved value
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}

impl CssVars {
    /// Look up a property, with or without the leading `--`
    pub fn get(&self, name: &str) -> Option<&str> {
        let key = if name.starts_with("--") {
            name.to_string()
        } else {
            format!("--{}", name)
        };
        self.vars.get(&key).map(String::as_str)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True if nothing was harvested
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

const SCRIPT: &str = r#"
(() => {
    const scoped = /(^|[\s,]):root\b|(^|[\s,])html\b|(^|[\s,])body\b|\[data-theme|\.dark\b|\.light\b/;
    const declared = {};

    const visit = (rules) => {
        for (const rule of Array.from(rules || [])) {
            if (rule.cssRules && !rule.selectorText) {
                visit(rule.cssRules);
                continue;
            }
            if (!rule.selectorText || !rule.style || !scoped.test(rule.selectorText)) continue;
            for (let i = 0; i < rule.style.length; i++) {
                const name = rule.style[i];
                if (name.startsWith('--')) {
                    declared[name] = rule.style.getPropertyValue(name).trim();
                }
            }
        }
    };

    for (const sheet of Array.from(document.styleSheets)) {
        let rules;
        try {
            rules = sheet.cssRules;
        } catch (e) {
            continue;
        }
        visit(rules);
    }

    const computed = getComputedStyle(document.documentElement);
    const vars = {};
    for (const name of Object.keys(declared)) {
        const live = computed.getPropertyValue(name).trim();
        const value = live || declared[name];
        if (value) vars[name] = value;
    }
    return { vars };
})()
"#;

/// CSS variable extraction functionality
pub struct CssVarExtractor;

impl CssVarExtractor {
    /// Harvest root/theme-scoped custom properties
    #[instrument(skip(driver))]
    pub async fn extract<D: PageDriver>(driver: &D) -> Result<CssVars> {
        info!("Harvesting CSS custom properties");
        let vars: CssVars = run_probe(driver, SCRIPT).await?;
        debug!("Found {} custom properties", vars.len());
        Ok(vars)
    }
}

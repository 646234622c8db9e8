//! Spacing grid inference
//!
//! Picks a 4px or 8px base unit from sampled padding/margin/gap values and
//! emits the fixed step table scaled by that unit.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Step labels, in order; the pixel value is `step * unit`
pub const SCALE_STEPS: &[(&str, f64)] = &[
    ("0", 0.0),
    ("0.5", 0.5),
    ("1", 1.0),
    ("2", 2.0),
    ("3", 3.0),
    ("4", 4.0),
    ("5", 5.0),
    ("6", 6.0),
    ("8", 8.0),
    ("10", 10.0),
    ("12", 12.0),
    ("16", 16.0),
    ("20", 20.0),
    ("24", 24.0),
    ("32", 32.0),
];

/// Default fraction of multiples of 8 above which the unit is 8
pub const GRID8_THRESHOLD: f64 = 0.45;

/// Ordered label → pixel-string table. Serializes as a JSON object in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleSteps(pub Vec<(String, String)>);

impl ScaleSteps {
    /// Pixel string for a step label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no steps
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ScaleSteps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScaleSteps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StepsVisitor;

        impl<'de> Visitor<'de> for StepsVisitor {
            type Value = ScaleSteps;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of step label to pixel string")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut steps = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    steps.push((k, v));
                }
                Ok(ScaleSteps(steps))
            }
        }

        deserializer.deserialize_map(StepsVisitor)
    }
}

/// Inferred spacing system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingScale {
    /// 4 or 8
    pub unit: u32,
    /// Step table for `unit`
    pub scale: ScaleSteps,
}

impl Default for SpacingScale {
    fn default() -> Self {
        Self {
            unit: 4,
            scale: default_scale(4),
        }
    }
}

/// Step table for a unit, e.g. `"2" → "16px"` for unit 8
pub fn default_scale(unit: u32) -> ScaleSteps {
    ScaleSteps(
        SCALE_STEPS
            .iter()
            .map(|(label, step)| (label.to_string(), format!("{}px", step * unit as f64)))
            .collect(),
    )
}

/// Infer the grid unit with the default threshold
pub fn normalize_spacing(values: &[f64]) -> SpacingScale {
    normalize_spacing_with(values, GRID8_THRESHOLD)
}

/// Unit is 8 when more than `threshold` of all values are exact multiples of 8,
/// otherwise 4 (including when there are no values).
pub fn normalize_spacing_with(values: &[f64], threshold: f64) -> SpacingScale {
    if values.is_empty() {
        return SpacingScale::default();
    }

    let mod8 = values.iter().filter(|v| *v % 8.0 == 0.0).count();
    let mod4 = values.iter().filter(|v| *v % 4.0 == 0.0).count();
    tracing::debug!(
        "Spacing: {} values, {} multiples of 4, {} multiples of 8",
        values.len(),
        mod4,
        mod8
    );

    let unit = if mod8 as f64 / values.len() as f64 > threshold {
        8
    } else {
        4
    };

    SpacingScale {
        unit,
        scale: default_scale(unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiples_of_eight() {
        let scale = normalize_spacing(&[8.0, 16.0, 24.0, 32.0, 40.0]);
        assert_eq!(scale.unit, 8);
        assert_eq!(scale.scale.get("2"), Some("16px"));
        assert_eq!(scale.scale.get("0.5"), Some("4px"));
    }

    #[test]
    fn test_no_clean_multiples() {
        assert_eq!(normalize_spacing(&[5.0, 7.0, 13.0]).unit, 4);
    }

    #[test]
    fn test_empty_defaults_to_four() {
        let scale = normalize_spacing(&[]);
        assert_eq!(scale.unit, 4);
        assert_eq!(scale.scale.get("32"), Some("128px"));
    }

    #[test]
    fn test_threshold_is_strict() {
        // 9 of 20 is exactly 0.45, which does not exceed the threshold
        let mut values = vec![8.0; 9];
        values.extend(std::iter::repeat(4.0).take(11));
        assert_eq!(normalize_spacing(&values).unit, 4);
        values[9] = 16.0;
        assert_eq!(normalize_spacing(&values).unit, 8);
    }

    #[test]
    fn test_scale_labels_and_order() {
        let scale = default_scale(4);
        assert_eq!(scale.len(), 15);
        let labels: Vec<&str> = scale.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(labels.first(), Some(&"0"));
        assert_eq!(labels.last(), Some(&"32"));
        assert_eq!(scale.get("0"), Some("0px"));
        assert_eq!(scale.get("0.5"), Some("2px"));
        assert_eq!(scale.get("5"), Some("20px"));
    }

    #[test]
    fn test_serializes_in_step_order() {
        let json = serde_json::to_string(&normalize_spacing(&[8.0])).unwrap();
        assert!(json.starts_with(r#"{"unit":8,"scale":{"0":"0px","0.5":"4px","1":"8px","2":"16px""#));

        let back: SpacingScale = serde_json::from_str(&json).unwrap();
        assert_eq!(back, normalize_spacing(&[8.0]));
    }
}

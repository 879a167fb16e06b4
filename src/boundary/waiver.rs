//! Per-feature waivers that silence accepted conflicts.

use hashbrown::HashMap;
use tracing::debug;

use crate::config::BorderlessConfig;
use crate::models::Feature;

/// Suppression flags for one feature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaiverSet {
    /// `waive_overlap`: areal overlap is accepted
    pub overlap: bool,
    /// `waive_double`: multi-piece seams are accepted
    pub double: bool,
    /// `waive_point`: point contact is accepted
    pub point: bool,
    /// Exempt from every boundary check
    pub borderless: bool,
}

impl WaiverSet {
    pub fn from_feature(feature: &Feature, rule: &BorderlessConfig) -> Self {
        Self {
            overlap: feature.has_property("waive_overlap"),
            double: feature.has_property("waive_double"),
            point: feature.has_property("waive_point"),
            borderless: feature.has_property("borderless") || is_borderless_category(feature, rule),
        }
    }
}

/// Indigenous, tribal and similar jurisdictions do not hold exclusive
/// borders against their neighbors.
fn is_borderless_category(feature: &Feature, rule: &BorderlessConfig) -> bool {
    let matches = |value: Option<&str>, list: &[String]| {
        value.is_some_and(|v| list.iter().any(|entry| entry.eq_ignore_ascii_case(v.trim())))
    };

    matches(feature.property_str("entity1name"), &rule.entity_names)
        || matches(feature.property_str("entity1type"), &rule.entity_types)
        || matches(feature.property_str("entity2type"), &rule.entity_types)
}

/// Memoized waiver flags keyed by feature id
pub struct WaiverRegistry {
    rule: BorderlessConfig,
    flags: HashMap<String, WaiverSet>,
}

impl WaiverRegistry {
    pub fn new(rule: BorderlessConfig) -> Self {
        Self {
            rule,
            flags: HashMap::new(),
        }
    }

    /// Compute the flags for a feature on first encounter
    pub fn register(&mut self, feature: &Feature) -> WaiverSet {
        if let Some(set) = self.flags.get(&feature.id) {
            return *set;
        }
        let set = WaiverSet::from_feature(feature, &self.rule);
        if set.borderless {
            debug!("{} is borderless, skipping its boundary checks", feature.id);
        }
        self.flags.insert(feature.id.clone(), set);
        set
    }

    pub fn get(&self, id: &str) -> Option<WaiverSet> {
        self.flags.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeometryDescriptor, GeometryKind};

    fn feature(id: &str) -> Feature {
        Feature::new(
            id,
            "1800",
            "1900",
            GeometryDescriptor::copy_of(GeometryKind::Polygon, "other"),
        )
    }

    #[test]
    fn test_flags_follow_key_presence() {
        let f = feature("a")
            .with_property("waive_overlap", 1)
            .with_property("waive_point", serde_json::Value::Null);
        let set = WaiverSet::from_feature(&f, &BorderlessConfig::default());
        assert!(set.overlap);
        assert!(set.point);
        assert!(!set.double);
        assert!(!set.borderless);
    }

    #[test]
    fn test_explicit_borderless() {
        let f = feature("a").with_property("borderless", 1);
        assert!(WaiverSet::from_feature(&f, &BorderlessConfig::default()).borderless);
    }

    #[test]
    fn test_derived_borderless_categories() {
        let rule = BorderlessConfig::default();

        let tribe = feature("cherokee")
            .with_property("entity1name", "Indigenous")
            .with_property("entity2type", "tribe");
        assert!(WaiverSet::from_feature(&tribe, &rule).borderless);

        let pueblo = feature("taos").with_property("entity1type", "Pueblo");
        assert!(WaiverSet::from_feature(&pueblo, &rule).borderless);

        let state = feature("ohio")
            .with_property("entity1type", "nation")
            .with_property("entity1name", "United States")
            .with_property("entity2type", "state");
        assert!(!WaiverSet::from_feature(&state, &rule).borderless);
    }

    #[test]
    fn test_registry_computes_once() {
        let mut registry = WaiverRegistry::new(BorderlessConfig::default());
        let first = feature("a").with_property("waive_double", 1);
        assert!(registry.register(&first).double);

        // Same id again keeps the flags from the first encounter
        let second = feature("a");
        assert!(registry.register(&second).double);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").map(|s| s.double), Some(true));
        assert!(registry.get("b").is_none());
    }
}

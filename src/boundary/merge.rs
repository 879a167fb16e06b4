//! Per-date merge check.
//!
//! All regions valid on a given date should tile together into a valid
//! whole. Unions are built for diagnosis only and never fed back.

use geo::{BooleanOps, MultiPolygon, Validation};
use tracing::{info, warn};

use super::geometry::GeometryResolver;
use super::wkt;
use crate::dates::{normalize, TimeRange};
use crate::error::CheckResult;
use crate::models::Feature;

/// Union of every region valid on one date
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub date: String,
    /// Ids merged, in input order
    pub members: Vec<String>,
    pub merged: MultiPolygon<f64>,
    pub valid: bool,
}

pub struct MergeChecker<'f> {
    features: Vec<(&'f Feature, TimeRange)>,
    resolver: GeometryResolver,
}

impl<'f> MergeChecker<'f> {
    /// Resolve every areal feature up front, in input order
    pub fn new(features: &'f [Feature]) -> CheckResult<Self> {
        let mut resolver = GeometryResolver::new();
        let mut areal = Vec::new();
        for feature in features.iter().filter(|f| f.geometry.kind.is_areal()) {
            let range = TimeRange::of_feature(feature)?;
            resolver.resolve(feature)?;
            areal.push((feature, range));
        }
        info!("Resolved {} areal features for merging", areal.len());
        Ok(Self {
            features: areal,
            resolver,
        })
    }

    /// Distinct start dates, in order of first appearance
    pub fn start_dates(&self) -> Vec<String> {
        let mut seen = hashbrown::HashSet::new();
        self.features
            .iter()
            .map(|(f, _)| f.start_date.clone())
            .filter(|d| seen.insert(d.clone()))
            .collect()
    }

    /// Merge the regions valid on `date`
    pub fn check_date(&self, date: &str) -> CheckResult<MergeOutcome> {
        let at = normalize(date, true)?;
        info!("checking {}", date);

        let mut merged = MultiPolygon::new(Vec::new());
        let mut members = Vec::new();
        for (feature, range) in &self.features {
            if !range.contains(at) {
                continue;
            }
            info!(
                "for {}: merging id {} with dates {} -> {}",
                date, feature.id, feature.start_date, feature.end_date
            );
            if let Some(shape) = self.resolver.get(&feature.id) {
                merged = merged.union(&shape.to_multi_polygon());
                members.push(feature.id.clone());
            }
        }

        let valid = merged.is_valid();
        if !valid {
            warn!("merger for date {} is not valid", date);
            warn!("  merged: {}", wkt::multi_polygon(&merged));
        }

        Ok(MergeOutcome {
            date: date.to_string(),
            members,
            merged,
            valid,
        })
    }

    /// Merge once per distinct start date
    pub fn check_all(&self) -> CheckResult<Vec<MergeOutcome>> {
        self.start_dates()
            .iter()
            .map(|date| self.check_date(date))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeometryDescriptor;
    use geo::{polygon, Area, Polygon};

    fn square(x: f64, y: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ]
    }

    fn region(id: &str, start: &str, end: &str, x: f64) -> Feature {
        Feature::new(id, start, end, GeometryDescriptor::polygon(square(x, 0.0)))
    }

    #[test]
    fn test_merges_regions_valid_on_date() {
        let features = vec![
            region("a", "1800", "1850", 0.0),
            region("b", "1820", "1900", 1.0),
            region("c", "1860", "1900", 2.0),
        ];
        let checker = MergeChecker::new(&features).unwrap();

        let outcome = checker.check_date("1830").unwrap();
        assert_eq!(outcome.members, vec!["a".to_string(), "b".to_string()]);
        assert!(outcome.valid);
        assert!((outcome.merged.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_check_all_uses_distinct_start_dates() {
        let features = vec![
            region("a", "1800", "1850", 0.0),
            region("b", "1800", "1900", 1.0),
            region("c", "1860", "1900", 2.0),
        ];
        let checker = MergeChecker::new(&features).unwrap();
        assert_eq!(checker.start_dates(), vec!["1800".to_string(), "1860".to_string()]);

        let outcomes = checker.check_all().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].members, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_date_with_no_regions_is_empty() {
        let features = vec![region("a", "1800", "1850", 0.0)];
        let checker = MergeChecker::new(&features).unwrap();
        let outcome = checker.check_date("1700").unwrap();
        assert!(outcome.members.is_empty());
        assert!(outcome.merged.0.is_empty());
    }

    #[test]
    fn test_bad_date_is_error() {
        let features = vec![region("a", "1800", "1850", 0.0)];
        let checker = MergeChecker::new(&features).unwrap();
        assert!(checker.check_date("whenever").is_err());
    }
}

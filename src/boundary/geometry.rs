use geo::{BooleanOps, Geometry, MultiPolygon, Polygon, Validation};
use hashbrown::HashMap;
use tracing::{error, warn};

use super::wkt;
use crate::error::{CheckError, CheckResult};
use crate::models::{Feature, GeometrySource};

/// Resolved areal geometry of a feature
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Shape {
    /// View as a multipolygon, for operations that take one geometry type
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            Shape::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
            Shape::MultiPolygon(mp) => mp.clone(),
        }
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Shape::Polygon(p) => std::slice::from_ref(p),
            Shape::MultiPolygon(mp) => &mp.0,
        }
    }

    /// Structural validity problems (self-intersecting rings and the like)
    pub fn validation_messages(&self) -> Vec<String> {
        match self {
            Shape::Polygon(p) => p
                .validation_errors()
                .into_iter()
                .map(|e| e.to_string())
                .collect(),
            Shape::MultiPolygon(mp) => mp
                .validation_errors()
                .into_iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    /// Overlay the shape onto nothing, which rebuilds its rings without
    /// self-intersections. Diagnostic only.
    pub fn repaired(&self) -> MultiPolygon<f64> {
        self.to_multi_polygon().union(&MultiPolygon::new(Vec::new()))
    }

    pub fn to_wkt(&self) -> String {
        match self {
            Shape::Polygon(p) => wkt::polygon(p),
            Shape::MultiPolygon(mp) => wkt::multi_polygon(mp),
        }
    }
}

/// Builds and caches the concrete geometry of each areal feature.
///
/// Coordinate copies only see features resolved before them, so callers must
/// resolve in input order.
#[derive(Default)]
pub struct GeometryResolver {
    cache: HashMap<String, Shape>,
    invalid: Vec<String>,
}

impl GeometryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a feature's geometry, building it on first use
    pub fn resolve(&mut self, feature: &Feature) -> CheckResult<&Shape> {
        if !self.cache.contains_key(feature.id.as_str()) {
            let shape = self.build(feature).inspect_err(|e| error!("{}", e))?;
            self.check_validity(&feature.id, &shape);
            self.cache.insert(feature.id.clone(), shape);
        }
        Ok(&self.cache[feature.id.as_str()])
    }

    /// Previously resolved geometry, if any
    pub fn get(&self, id: &str) -> Option<&Shape> {
        self.cache.get(id)
    }

    /// Ids whose geometry failed the validity check, in resolution order
    pub fn invalid_ids(&self) -> &[String] {
        &self.invalid
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn build(&self, feature: &Feature) -> CheckResult<Shape> {
        match &feature.geometry.source {
            GeometrySource::Embedded(geometry) => match geometry {
                Geometry::Polygon(p) => Ok(Shape::Polygon(p.clone())),
                Geometry::MultiPolygon(mp) => Ok(Shape::MultiPolygon(mp.clone())),
                Geometry::Rect(r) => Ok(Shape::Polygon(r.to_polygon())),
                Geometry::Triangle(t) => Ok(Shape::Polygon(t.to_polygon())),
                Geometry::Point(_)
                | Geometry::Line(_)
                | Geometry::LineString(_)
                | Geometry::MultiPoint(_)
                | Geometry::MultiLineString(_)
                | Geometry::GeometryCollection(_) => Err(CheckError::NotAreal {
                    id: feature.id.clone(),
                    kind: feature.geometry.kind.to_string(),
                }),
            },
            GeometrySource::CopyOf(reference) => {
                self.copied(&feature.id, reference).map(Shape::clone)
            }
            GeometrySource::CopiesOf(references) => {
                let mut polygons = Vec::new();
                for reference in references {
                    polygons.extend_from_slice(self.copied(&feature.id, reference)?.polygons());
                }
                Ok(Shape::MultiPolygon(MultiPolygon::new(polygons)))
            }
        }
    }

    fn copied(&self, id: &str, reference: &str) -> CheckResult<&Shape> {
        self.cache
            .get(reference)
            .ok_or_else(|| CheckError::OutOfOrderCopy {
                id: id.to_string(),
                reference: reference.to_string(),
            })
    }

    fn check_validity(&mut self, id: &str, shape: &Shape) {
        let problems = shape.validation_messages();
        if problems.is_empty() {
            return;
        }
        warn!("{} is not valid: {}", id, problems.join("; "));
        warn!("  repaired: {}", wkt::multi_polygon(&shape.repaired()));
        self.invalid.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeometryDescriptor, GeometryKind};
    use geo::{polygon, Area, LineString};

    fn square(x: f64, y: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ]
    }

    fn feature(id: &str, descriptor: GeometryDescriptor) -> Feature {
        Feature::new(id, "1800", "1900", descriptor)
    }

    #[test]
    fn test_embedded_polygon_is_cached() {
        let mut resolver = GeometryResolver::new();
        let f = feature("a", GeometryDescriptor::polygon(square(0.0, 0.0)));

        let shape = resolver.resolve(&f).unwrap().clone();
        assert_eq!(shape, Shape::Polygon(square(0.0, 0.0)));
        assert_eq!(resolver.len(), 1);

        resolver.resolve(&f).unwrap();
        assert_eq!(resolver.len(), 1);
        assert!(resolver.invalid_ids().is_empty());
    }

    #[test]
    fn test_coordinate_copy_reuses_resolved_geometry() {
        let mut resolver = GeometryResolver::new();
        let base = feature("a", GeometryDescriptor::polygon(square(0.0, 0.0)));
        let copy = feature("b", GeometryDescriptor::copy_of(GeometryKind::Polygon, "a"));

        resolver.resolve(&base).unwrap();
        let shape = resolver.resolve(&copy).unwrap();
        assert_eq!(shape, &Shape::Polygon(square(0.0, 0.0)));
    }

    #[test]
    fn test_coordinate_copy_out_of_order_fails() {
        let mut resolver = GeometryResolver::new();
        let copy = feature("b", GeometryDescriptor::copy_of(GeometryKind::Polygon, "a"));

        let err = resolver.resolve(&copy).unwrap_err();
        assert!(matches!(err, CheckError::OutOfOrderCopy { .. }));
        assert!(resolver.get("b").is_none());
    }

    #[test]
    fn test_coordinate_copies_flatten_polygons() {
        let mut resolver = GeometryResolver::new();
        let single = feature("a", GeometryDescriptor::polygon(square(0.0, 0.0)));
        let multi = feature(
            "b",
            GeometryDescriptor::multi_polygon(MultiPolygon::new(vec![
                square(5.0, 0.0),
                square(7.0, 0.0),
            ])),
        );
        let combined = feature(
            "c",
            GeometryDescriptor::copies_of(GeometryKind::MultiPolygon, ["a", "b"]),
        );

        resolver.resolve(&single).unwrap();
        resolver.resolve(&multi).unwrap();
        let shape = resolver.resolve(&combined).unwrap();

        assert_eq!(
            shape,
            &Shape::MultiPolygon(MultiPolygon::new(vec![
                square(0.0, 0.0),
                square(5.0, 0.0),
                square(7.0, 0.0),
            ]))
        );
    }

    #[test]
    fn test_non_areal_geometry_is_rejected() {
        let mut resolver = GeometryResolver::new();
        let line = feature(
            "river",
            GeometryDescriptor::embedded(
                GeometryKind::LineString,
                LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]),
            ),
        );
        assert!(matches!(
            resolver.resolve(&line),
            Err(CheckError::NotAreal { .. })
        ));
    }

    #[test]
    fn test_invalid_geometry_is_kept_and_recorded() {
        // Bow-tie: the ring crosses itself at (1, 1)
        let bow_tie = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
        ];
        let mut resolver = GeometryResolver::new();
        let f = feature("bow", GeometryDescriptor::polygon(bow_tie.clone()));

        let shape = resolver.resolve(&f).unwrap();
        assert_eq!(shape, &Shape::Polygon(bow_tie));
        assert_eq!(resolver.invalid_ids(), &["bow".to_string()]);
    }

    #[test]
    fn test_repair_preserves_area_of_valid_shape() {
        let shape = Shape::Polygon(square(0.0, 0.0));
        assert!(shape.validation_messages().is_empty());
        assert!((shape.repaired().unsigned_area() - 1.0).abs() < 1e-9);
    }
}

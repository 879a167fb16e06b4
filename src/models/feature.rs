//! Feature records as supplied by the loader.

use geo_types::{Geometry, MultiPolygon, Polygon};
use serde_json::{Map, Value};

/// GeoJSON geometry type tag of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// Parse a GeoJSON `type` value
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(GeometryKind::Point),
            "MultiPoint" => Some(GeometryKind::MultiPoint),
            "LineString" => Some(GeometryKind::LineString),
            "MultiLineString" => Some(GeometryKind::MultiLineString),
            "Polygon" => Some(GeometryKind::Polygon),
            "MultiPolygon" => Some(GeometryKind::MultiPolygon),
            _ => None,
        }
    }

    /// Only areal features take part in boundary checks
    pub fn is_areal(&self) -> bool {
        matches!(self, GeometryKind::Polygon | GeometryKind::MultiPolygon)
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "Point"),
            GeometryKind::MultiPoint => write!(f, "MultiPoint"),
            GeometryKind::LineString => write!(f, "LineString"),
            GeometryKind::MultiLineString => write!(f, "MultiLineString"),
            GeometryKind::Polygon => write!(f, "Polygon"),
            GeometryKind::MultiPolygon => write!(f, "MultiPolygon"),
        }
    }
}

/// Where a feature's coordinates come from
#[derive(Debug, Clone, PartialEq)]
pub enum GeometrySource {
    /// Coordinates embedded on the feature itself
    Embedded(Geometry<f64>),
    /// Reuse another feature's resolved coordinates verbatim
    CopyOf(String),
    /// Concatenate the polygons of several other features
    CopiesOf(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDescriptor {
    pub kind: GeometryKind,
    pub source: GeometrySource,
}

impl GeometryDescriptor {
    pub fn embedded(kind: GeometryKind, geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            kind,
            source: GeometrySource::Embedded(geometry.into()),
        }
    }

    pub fn polygon(polygon: Polygon<f64>) -> Self {
        Self::embedded(GeometryKind::Polygon, polygon)
    }

    pub fn multi_polygon(multi: MultiPolygon<f64>) -> Self {
        Self::embedded(GeometryKind::MultiPolygon, multi)
    }

    pub fn copy_of(kind: GeometryKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            source: GeometrySource::CopyOf(id.into()),
        }
    }

    pub fn copies_of<I, S>(kind: GeometryKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            source: GeometrySource::CopiesOf(ids.into_iter().map(Into::into).collect()),
        }
    }
}

/// A boundary feature: id, validity range, geometry and free-form properties.
///
/// Features are immutable once loaded.
#[derive(Debug, Clone)]
pub struct Feature {
    pub id: String,
    /// Raw `startdatestr`
    pub start_date: String,
    /// Raw `enddatestr`
    pub end_date: String,
    pub geometry: GeometryDescriptor,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(
        id: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        geometry: GeometryDescriptor,
    ) -> Self {
        Self {
            id: id.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            geometry,
            properties: Map::new(),
        }
    }

    /// Builder-style property setter, mostly for tests
    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// String value of a property, if present and a string
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

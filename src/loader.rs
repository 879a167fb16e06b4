//! Reads boundary documents into feature records.
//!
//! Documents are GeoJSON feature collections, usually wrapped as a script
//! assignment (`dataRegion = { ... };`) so a browser can load them directly.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use geo_types::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::{CheckError, CheckResult};
use crate::models::{Feature, GeometryDescriptor, GeometryKind, GeometrySource};

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*(\w+)\s*=\s*(.*?);\s*$").expect("static regex"));

#[derive(Debug, Deserialize)]
struct RawCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    id: Value,
    geometry: RawGeometry,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Option<Value>,
    #[serde(default)]
    coordinate_copy: Option<String>,
    #[serde(default)]
    coordinate_copies: Option<Vec<String>>,
}

/// Load features from a file
pub fn load_features<P: AsRef<Path>>(path: P) -> CheckResult<Vec<Feature>> {
    let path = path.as_ref();
    info!("Loading features from {}", path.display());
    let text = fs::read_to_string(path)?;
    let features = parse_document(&text)?;
    info!("Loaded {} features", features.len());
    Ok(features)
}

/// Parse a document, with or without the variable-assignment wrapper
pub fn parse_document(text: &str) -> CheckResult<Vec<Feature>> {
    let body = match ASSIGNMENT.captures(text) {
        Some(caps) => caps.get(2).map_or("", |m| m.as_str()),
        None => text,
    };

    let collection: RawCollection = serde_json::from_str(body)?;
    collection
        .features
        .into_iter()
        .map(convert_feature)
        .collect()
}

fn convert_feature(raw: RawFeature) -> CheckResult<Feature> {
    let id = match raw.id {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => {
            return Err(CheckError::document(format!(
                "feature id must be a string or number, got {}",
                other
            )))
        }
    };

    let kind = GeometryKind::from_type_name(&raw.geometry.kind).ok_or_else(|| {
        CheckError::document(format!(
            "feature {} has unsupported geometry type {}",
            id, raw.geometry.kind
        ))
    })?;

    let source = if let Some(reference) = raw.geometry.coordinate_copy {
        GeometrySource::CopyOf(reference)
    } else if let Some(references) = raw.geometry.coordinate_copies {
        GeometrySource::CopiesOf(references)
    } else {
        let coordinates = raw.geometry.coordinates.ok_or_else(|| CheckError::Coordinates {
            id: id.clone(),
            reason: "no coordinates".to_string(),
        })?;
        GeometrySource::Embedded(parse_geometry(&id, kind, coordinates)?)
    };

    let date = |key: &str| -> CheckResult<String> {
        raw.properties
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CheckError::MissingProperty {
                id: id.clone(),
                key: key.to_string(),
            })
    };
    let start_date = date("startdatestr")?;
    let end_date = date("enddatestr")?;

    Ok(Feature {
        id,
        start_date,
        end_date,
        geometry: GeometryDescriptor { kind, source },
        properties: raw.properties,
    })
}

type Position = Vec<f64>;

fn parse_geometry(id: &str, kind: GeometryKind, coordinates: Value) -> CheckResult<Geometry<f64>> {
    let bad = |e: serde_json::Error| CheckError::Coordinates {
        id: id.to_string(),
        reason: e.to_string(),
    };

    let geometry = match kind {
        GeometryKind::Point => {
            let p: Position = serde_json::from_value(coordinates).map_err(bad)?;
            Geometry::Point(Point::from(coord(id, &p)?))
        }
        GeometryKind::MultiPoint => {
            let ps: Vec<Position> = serde_json::from_value(coordinates).map_err(bad)?;
            let points = ps
                .iter()
                .map(|p| coord(id, p).map(Point::from))
                .collect::<CheckResult<Vec<_>>>()?;
            Geometry::MultiPoint(MultiPoint::new(points))
        }
        GeometryKind::LineString => {
            let ps: Vec<Position> = serde_json::from_value(coordinates).map_err(bad)?;
            Geometry::LineString(line(id, &ps)?)
        }
        GeometryKind::MultiLineString => {
            let lines: Vec<Vec<Position>> = serde_json::from_value(coordinates).map_err(bad)?;
            let lines = lines
                .iter()
                .map(|ps| line(id, ps))
                .collect::<CheckResult<Vec<_>>>()?;
            Geometry::MultiLineString(MultiLineString::new(lines))
        }
        GeometryKind::Polygon => {
            let rings: Vec<Vec<Position>> = serde_json::from_value(coordinates).map_err(bad)?;
            Geometry::Polygon(polygon(id, &rings)?)
        }
        GeometryKind::MultiPolygon => {
            let polys: Vec<Vec<Vec<Position>>> =
                serde_json::from_value(coordinates).map_err(bad)?;
            let polys = polys
                .iter()
                .map(|rings| polygon(id, rings))
                .collect::<CheckResult<Vec<_>>>()?;
            Geometry::MultiPolygon(MultiPolygon::new(polys))
        }
    };

    Ok(geometry)
}

fn coord(id: &str, position: &[f64]) -> CheckResult<Coord<f64>> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(CheckError::Coordinates {
            id: id.to_string(),
            reason: format!("position needs two ordinates, got {}", position.len()),
        }),
    }
}

fn line(id: &str, positions: &[Position]) -> CheckResult<LineString<f64>> {
    positions
        .iter()
        .map(|p| coord(id, p))
        .collect::<CheckResult<Vec<_>>>()
        .map(LineString::new)
}

fn polygon(id: &str, rings: &[Vec<Position>]) -> CheckResult<Polygon<f64>> {
    let mut rings = rings
        .iter()
        .map(|ring| line(id, ring))
        .collect::<CheckResult<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next().ok_or_else(|| CheckError::Coordinates {
        id: id.to_string(),
        reason: "polygon has no rings".to_string(),
    })?;
    Ok(Polygon::new(exterior, rings.collect()))
}

/// GeoJSON geometry object for a multipolygon
pub fn multipolygon_to_geojson(multi: &MultiPolygon<f64>) -> Value {
    fn ring(ls: &LineString<f64>) -> Value {
        ls.coords().map(|c| json!([c.x, c.y])).collect()
    }

    let polygons: Vec<Value> = multi
        .iter()
        .map(|p| {
            std::iter::once(p.exterior())
                .chain(p.interiors())
                .map(ring)
                .collect()
        })
        .collect();

    json!({
        "type": "MultiPolygon",
        "coordinates": polygons,
    })
}

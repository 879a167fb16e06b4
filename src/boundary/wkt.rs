//! WKT rendering for diagnostics.

use std::fmt::Write;

use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

fn push_coords(out: &mut String, coords: impl Iterator<Item = Coord<f64>>) {
    out.push('(');
    for (i, c) in coords.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{} {}", c.x, c.y);
    }
    out.push(')');
}

fn push_polygon_body(out: &mut String, polygon: &Polygon<f64>) {
    out.push('(');
    push_coords(out, polygon.exterior().coords().copied());
    for ring in polygon.interiors() {
        out.push_str(", ");
        push_coords(out, ring.coords().copied());
    }
    out.push(')');
}

pub fn point(p: &Point<f64>) -> String {
    format!("POINT ({} {})", p.x(), p.y())
}

pub fn multi_point(mp: &MultiPoint<f64>) -> String {
    let mut out = String::from("MULTIPOINT ");
    push_coords(&mut out, mp.iter().map(|p| p.0));
    out
}

pub fn line_string(ls: &LineString<f64>) -> String {
    let mut out = String::from("LINESTRING ");
    push_coords(&mut out, ls.coords().copied());
    out
}

pub fn multi_line_string(mls: &MultiLineString<f64>) -> String {
    let mut out = String::from("MULTILINESTRING (");
    for (i, ls) in mls.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push_coords(&mut out, ls.coords().copied());
    }
    out.push(')');
    out
}

pub fn polygon(p: &Polygon<f64>) -> String {
    let mut out = String::from("POLYGON ");
    push_polygon_body(&mut out, p);
    out
}

pub fn multi_polygon(mp: &MultiPolygon<f64>) -> String {
    if mp.0.is_empty() {
        return "MULTIPOLYGON EMPTY".to_string();
    }
    let mut out = String::from("MULTIPOLYGON (");
    for (i, p) in mp.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push_polygon_body(&mut out, p);
    }
    out.push(')');
    out
}

//! Extraction of the boundary contact between two touching shapes.
//!
//! When two shapes meet without overlapping, their intersection lives on
//! the rings: shared stretches of border and isolated touch points. Ring
//! segments of one shape are indexed in an R-tree and probed with the
//! other's segments; collinear overlaps become line pieces, which are then
//! merged into maximal chains.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Intersects, Line, LineString, MultiLineString, MultiPoint, MultiPolygon, Point};
use hashbrown::HashMap;
use rstar::{RTree, RTreeObject, AABB};
use std::cmp::Ordering;

use super::geometry::Shape;
use super::wkt;

/// Intersection of two shapes, by geometric kind
#[derive(Debug, Clone, PartialEq)]
pub enum Contact {
    /// Nothing found along the rings
    Empty,
    Point(Point<f64>),
    MultiPoint(MultiPoint<f64>),
    /// One connected shared border
    Line(LineString<f64>),
    /// Several border stretches that do not chain into one
    MultiLine(MultiLineString<f64>),
    /// Two-dimensional intersection
    Areal(MultiPolygon<f64>),
    /// Border stretches plus isolated touch points
    Mixed {
        lines: MultiLineString<f64>,
        points: MultiPoint<f64>,
    },
}

impl Contact {
    /// Geometry type name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Contact::Empty => "GeometryCollection",
            Contact::Point(_) => "Point",
            Contact::MultiPoint(_) => "MultiPoint",
            Contact::Line(_) => "LineString",
            Contact::MultiLine(_) => "MultiLineString",
            Contact::Areal(_) => "MultiPolygon",
            Contact::Mixed { .. } => "GeometryCollection",
        }
    }

    pub fn to_wkt(&self) -> String {
        match self {
            Contact::Empty => "GEOMETRYCOLLECTION EMPTY".to_string(),
            Contact::Point(p) => wkt::point(p),
            Contact::MultiPoint(mp) => wkt::multi_point(mp),
            Contact::Line(ls) => wkt::line_string(ls),
            Contact::MultiLine(mls) => wkt::multi_line_string(mls),
            Contact::Areal(mp) => wkt::multi_polygon(mp),
            Contact::Mixed { lines, points } => format!(
                "GEOMETRYCOLLECTION ({}, {})",
                wkt::multi_line_string(lines),
                wkt::multi_point(points)
            ),
        }
    }
}

/// Ring segment wrapper for R-tree indexing
struct IndexedSegment {
    line: Line<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedSegment {
    fn new(line: Line<f64>) -> Self {
        Self {
            envelope: segment_envelope(&line),
            line,
        }
    }
}

fn segment_envelope(line: &Line<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([line.start.x, line.start.y], [line.end.x, line.end.y])
}

/// Exact coordinate identity, with -0.0 folded into 0.0
type CoordKey = (u64, u64);

fn key(c: Coord<f64>) -> CoordKey {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

fn cmp_coord(a: &Coord<f64>, b: &Coord<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

fn ring_segments(shape: &Shape) -> Vec<Line<f64>> {
    shape
        .polygons()
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .flat_map(|ring| ring.lines())
        .filter(|l| l.start != l.end)
        .collect()
}

/// Compute where the rings of `a` and `b` meet
pub fn boundary_contact(a: &Shape, b: &Shape) -> Contact {
    let index = RTree::bulk_load(
        ring_segments(b)
            .into_iter()
            .map(IndexedSegment::new)
            .collect(),
    );

    let mut pieces: Vec<Line<f64>> = Vec::new();
    let mut touches: Vec<Coord<f64>> = Vec::new();

    for segment in ring_segments(a) {
        for candidate in index.locate_in_envelope_intersecting(&segment_envelope(&segment)) {
            match line_intersection(segment, candidate.line) {
                Some(LineIntersection::Collinear { intersection }) => {
                    if intersection.start == intersection.end {
                        touches.push(intersection.start);
                    } else {
                        pieces.push(oriented(intersection));
                    }
                }
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    touches.push(intersection)
                }
                None => {}
            }
        }
    }

    pieces.sort_by(|p, q| cmp_coord(&p.start, &q.start).then(cmp_coord(&p.end, &q.end)));
    pieces.dedup();

    let mut chains = merge_pieces(&pieces);

    let mut seen = hashbrown::HashSet::new();
    let mut isolated: Vec<Point<f64>> = touches
        .into_iter()
        .filter(|c| seen.insert(key(*c)))
        .map(Point::from)
        .filter(|p| !chains.iter().any(|chain| p.intersects(chain)))
        .collect();

    match (chains.len(), isolated.len()) {
        (0, 0) => Contact::Empty,
        (0, 1) => Contact::Point(isolated.remove(0)),
        (0, _) => Contact::MultiPoint(MultiPoint::new(isolated)),
        (1, 0) => Contact::Line(chains.remove(0)),
        (_, 0) => Contact::MultiLine(MultiLineString::new(chains)),
        _ => Contact::Mixed {
            lines: MultiLineString::new(chains),
            points: MultiPoint::new(isolated),
        },
    }
}

fn oriented(line: Line<f64>) -> Line<f64> {
    if cmp_coord(&line.start, &line.end) == Ordering::Greater {
        Line::new(line.end, line.start)
    } else {
        line
    }
}

/// Chain pieces through every node where exactly two pieces meet
fn merge_pieces(pieces: &[Line<f64>]) -> Vec<LineString<f64>> {
    let mut incident: HashMap<CoordKey, Vec<usize>> = HashMap::new();
    for (i, piece) in pieces.iter().enumerate() {
        incident.entry(key(piece.start)).or_default().push(i);
        incident.entry(key(piece.end)).or_default().push(i);
    }

    let degree = |c: Coord<f64>| incident.get(&key(c)).map_or(0, Vec::len);
    let mut used = vec![false; pieces.len()];
    let mut chains = Vec::new();

    // Open chains start at a dead end or a junction
    for i in 0..pieces.len() {
        if used[i] {
            continue;
        }
        let piece = pieces[i];
        let from = if degree(piece.start) != 2 {
            piece.start
        } else if degree(piece.end) != 2 {
            piece.end
        } else {
            continue;
        };
        chains.push(walk_chain(pieces, &incident, &mut used, i, from));
    }

    // Whatever is left forms closed loops
    for i in 0..pieces.len() {
        if !used[i] {
            chains.push(walk_chain(pieces, &incident, &mut used, i, pieces[i].start));
        }
    }

    chains
}

fn walk_chain(
    pieces: &[Line<f64>],
    incident: &HashMap<CoordKey, Vec<usize>>,
    used: &mut [bool],
    first: usize,
    from: Coord<f64>,
) -> LineString<f64> {
    let mut coords = vec![from];
    let mut current = first;
    let mut at = from;

    loop {
        used[current] = true;
        let piece = pieces[current];
        at = if key(piece.start) == key(at) {
            piece.end
        } else {
            piece.start
        };
        coords.push(at);

        let node = match incident.get(&key(at)) {
            Some(node) if node.len() == 2 => node,
            _ => break,
        };
        match node.iter().find(|&&next| !used[next]) {
            Some(&next) => current = next,
            None => break,
        }
    }

    LineString::new(coords)
}

/// Endpoints of a line collection under the mod-2 rule: an endpoint shared
/// by an even number of open lines is interior. Closed lines contribute
/// nothing.
pub fn line_boundary(lines: &MultiLineString<f64>) -> Vec<Coord<f64>> {
    let mut order: Vec<Coord<f64>> = Vec::new();
    let mut counts: HashMap<CoordKey, usize> = HashMap::new();

    for line in lines.iter() {
        if line.0.len() < 2 || line.is_closed() {
            continue;
        }
        for end in [line.0[0], line.0[line.0.len() - 1]] {
            let count = counts.entry(key(end)).or_insert(0);
            if *count == 0 {
                order.push(end);
            }
            *count += 1;
        }
    }

    order
        .into_iter()
        .filter(|c| counts.get(&key(*c)).is_some_and(|n| n % 2 == 1))
        .collect()
}

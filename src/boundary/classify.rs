//! Pairwise classification of boundary contact.
//!
//! Two regions that are valid at the same time should meet along at most
//! one connected border. Anything else is reported unless a waiver on one of
//! the two features accepts it.

use geo::{Area, BooleanOps, Intersects, MultiPolygon};
use tracing::{debug, warn};

use super::contact::{boundary_contact, line_boundary, Contact};
use super::geometry::Shape;
use super::waiver::WaiverSet;
use crate::dates::TimelineValue;
use crate::models::ConflictResult;

/// One side of a comparison
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub id: &'a str,
    /// Raw start date, echoed in diagnostics
    pub start_date: &'a str,
    pub start: TimelineValue,
    pub shape: &'a Shape,
    pub waivers: WaiverSet,
}

/// A reported conflict
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub result: ConflictResult,
    pub first: String,
    pub second: String,
    /// Earlier of the two start dates
    pub since: String,
    pub kind: &'static str,
    pub rendering: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} between {} and {} (from {}): intersection is {}: {}",
            self.result, self.first, self.second, self.since, self.kind, self.rendering
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub result: ConflictResult,
    pub finding: Option<Finding>,
}

impl Verdict {
    fn quiet(result: ConflictResult) -> Self {
        Self {
            result,
            finding: None,
        }
    }
}

/// Combined waivers of both participants
#[derive(Debug, Clone, Copy)]
struct PairWaivers {
    overlap: bool,
    double: bool,
    point: bool,
}

impl PairWaivers {
    fn of(a: &WaiverSet, b: &WaiverSet) -> Self {
        Self {
            overlap: a.overlap || b.overlap,
            double: a.double || b.double,
            point: a.point || b.point,
        }
    }

    /// Fallback for intersections with no dedicated rule
    fn seam_unless_double(&self) -> ConflictResult {
        if self.double {
            ConflictResult::Clean
        } else {
            ConflictResult::Seam
        }
    }
}

pub struct Classifier {
    area_epsilon: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Classifier {
    pub fn new(area_epsilon: f64) -> Self {
        Self { area_epsilon }
    }

    /// Compare two features that share part of their time ranges
    pub fn compare(&self, a: &Subject<'_>, b: &Subject<'_>) -> Verdict {
        if a.waivers.borderless || b.waivers.borderless {
            return Verdict::quiet(ConflictResult::None);
        }

        let shape_a = a.shape.to_multi_polygon();
        let shape_b = b.shape.to_multi_polygon();
        if !shape_a.intersects(&shape_b) {
            return Verdict::quiet(ConflictResult::None);
        }

        let waivers = PairWaivers::of(&a.waivers, &b.waivers);
        let overlay = shape_a.intersection(&shape_b);

        let (result, contact) = if overlay.unsigned_area() > self.area_epsilon {
            let result = if waivers.overlap {
                ConflictResult::Clean
            } else {
                ConflictResult::Overlap
            };
            (result, Contact::Areal(overlay))
        } else {
            let contact = touching_contact(overlay, a.shape, b.shape);
            (judge_contact(&contact, &waivers), contact)
        };

        debug!("{} vs {}: {} ({})", a.id, b.id, result, contact.kind_name());

        if !result.is_conflict() {
            return Verdict::quiet(result);
        }

        let since = if a.start <= b.start {
            a.start_date
        } else {
            b.start_date
        };
        let finding = Finding {
            result,
            first: a.id.to_string(),
            second: b.id.to_string(),
            since: since.to_string(),
            kind: contact.kind_name(),
            rendering: contact.to_wkt(),
        };
        warn!("{}", finding);

        Verdict {
            result,
            finding: Some(finding),
        }
    }
}

/// Contact of two shapes whose overlay has no meaningful area. A non-empty
/// overlay here is a sliver within the area tolerance.
fn touching_contact(mut overlay: MultiPolygon<f64>, a: &Shape, b: &Shape) -> Contact {
    overlay.0.retain(|p| p.unsigned_area() > 0.0);
    if overlay.0.is_empty() {
        boundary_contact(a, b)
    } else {
        Contact::Areal(overlay)
    }
}

/// Rules for contact without areal overlap
fn judge_contact(contact: &Contact, waivers: &PairWaivers) -> ConflictResult {
    match contact {
        // Intersects reported contact that the rings do not show
        Contact::Empty => ConflictResult::Clean,
        Contact::Point(_) | Contact::MultiPoint(_) => {
            if waivers.point {
                ConflictResult::Clean
            } else {
                ConflictResult::Point
            }
        }
        Contact::Line(_) => ConflictResult::Clean,
        Contact::MultiLine(lines) => match line_boundary(lines).len() {
            // One seam split by numerical noise, or a fully shared ring
            0 | 2 => ConflictResult::Clean,
            _ => waivers.seam_unless_double(),
        },
        Contact::Areal(_) => {
            if waivers.overlap {
                ConflictResult::Clean
            } else {
                waivers.seam_unless_double()
            }
        }
        Contact::Mixed { .. } => waivers.seam_unless_double(),
    }
}

//! Pair enumeration and conflict tallying.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info};

use super::classify::{Classifier, Finding, Subject};
use super::geometry::GeometryResolver;
use super::waiver::WaiverRegistry;
use crate::config::CheckConfig;
use crate::dates::TimeRange;
use crate::error::CheckResult;
use crate::models::{ConflictResult, Feature, PairKey};

/// Caches shared by the resolver, waiver registry and pair loop
pub struct CheckContext {
    resolver: GeometryResolver,
    waivers: WaiverRegistry,
    ranges: HashMap<String, TimeRange>,
    evaluated: HashSet<PairKey>,
}

impl CheckContext {
    pub fn new(config: &CheckConfig) -> Self {
        Self {
            resolver: GeometryResolver::new(),
            waivers: WaiverRegistry::new(config.borderless.clone()),
            ranges: HashMap::new(),
            evaluated: HashSet::new(),
        }
    }

    /// Resolve everything about a feature the first time it is referenced
    fn touch(&mut self, feature: &Feature) -> CheckResult<()> {
        if !self.ranges.contains_key(feature.id.as_str()) {
            let range = TimeRange::of_feature(feature)?;
            self.ranges.insert(feature.id.clone(), range);
        }
        self.resolver.resolve(feature)?;
        self.waivers.register(feature);
        Ok(())
    }

    fn subject<'a>(&'a self, feature: &'a Feature) -> Option<Subject<'a>> {
        Some(Subject {
            id: &feature.id,
            start_date: &feature.start_date,
            start: self.ranges.get(feature.id.as_str())?.start,
            shape: self.resolver.get(&feature.id)?,
            waivers: self.waivers.get(&feature.id)?,
        })
    }
}

/// Running totals of a check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    /// Pairs with any contact
    pub checked: usize,
    pub overlaps: usize,
    pub seams: usize,
    pub points: usize,
}

impl Tally {
    pub fn record(&mut self, result: ConflictResult) {
        if result.is_checked() {
            self.checked += 1;
        }
        match result {
            ConflictResult::Overlap => self.overlaps += 1,
            ConflictResult::Seam => self.seams += 1,
            ConflictResult::Point => self.points += 1,
            ConflictResult::None | ConflictResult::Clean => {}
        }
    }
}

/// Outcome of a full check run
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub tally: Tally,
    pub findings: Vec<Finding>,
    pub invalid_geometries: Vec<String>,
    /// Distinct pairs whose time ranges overlapped
    pub pairs_compared: usize,
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "completed checking {} boundaries, with {} overlaps, {} seams and {} points",
            self.tally.checked, self.tally.overlaps, self.tally.seams, self.tally.points
        )
    }
}

/// Checks every pair of concurrently valid areal features exactly once
pub struct BoundaryChecker<'f> {
    /// Areal features in input order
    features: Vec<&'f Feature>,
    classifier: Classifier,
    context: CheckContext,
    tally: Tally,
    findings: Vec<Finding>,
    pairs_compared: usize,
}

impl<'f> BoundaryChecker<'f> {
    pub fn new(features: &'f [Feature], config: &CheckConfig) -> Self {
        let areal: Vec<&Feature> = features
            .iter()
            .filter(|f| f.geometry.kind.is_areal())
            .collect();

        info!(
            "Checking {} areal features ({} skipped as non-areal)",
            areal.len(),
            features.len() - areal.len()
        );

        Self {
            features: areal,
            classifier: Classifier::new(config.area_epsilon),
            context: CheckContext::new(config),
            tally: Tally::default(),
            findings: Vec::new(),
            pairs_compared: 0,
        }
    }

    /// Number of areal features taking part
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Walk all pairs. Any resolution failure aborts the run.
    pub fn run(mut self) -> CheckResult<CheckReport> {
        let n = self.features.len();
        for i in 0..n {
            self.context.touch(self.features[i])?;
            for j in (i + 1)..n {
                self.evaluate_pair(i, j)?;
            }
        }
        Ok(self.into_report())
    }

    /// Evaluate the pair at positions `i` and `j` of the areal feature list.
    ///
    /// Returns `None` if the pair was already evaluated, pairs a feature with
    /// itself, or the time ranges do not overlap.
    pub fn evaluate_pair(&mut self, i: usize, j: usize) -> CheckResult<Option<ConflictResult>> {
        let (a, b) = (self.features[i], self.features[j]);
        if a.id == b.id {
            return Ok(None);
        }

        self.context.touch(a)?;
        self.context.touch(b)?;

        if !self.context.evaluated.insert(PairKey::new(&a.id, &b.id)) {
            return Ok(None);
        }

        let range_a = self.context.ranges[a.id.as_str()];
        let range_b = self.context.ranges[b.id.as_str()];
        if !range_a.overlaps(&range_b) {
            debug!("{} and {} never coexist", a.id, b.id);
            return Ok(None);
        }

        // Canonical order keeps diagnostics independent of iteration order
        let (first, second) = if a.id <= b.id { (a, b) } else { (b, a) };
        let (Some(subject_a), Some(subject_b)) =
            (self.context.subject(first), self.context.subject(second))
        else {
            return Ok(None);
        };

        let verdict = self.classifier.compare(&subject_a, &subject_b);
        self.pairs_compared += 1;
        self.tally.record(verdict.result);
        if let Some(finding) = verdict.finding {
            self.findings.push(finding);
        }

        Ok(Some(verdict.result))
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn into_report(self) -> CheckReport {
        info!(
            "Compared {} concurrent pairs across {} features",
            self.pairs_compared,
            self.context.resolver.len()
        );
        CheckReport {
            tally: self.tally,
            findings: self.findings,
            invalid_geometries: self.context.resolver.invalid_ids().to_vec(),
            pairs_compared: self.pairs_compared,
        }
    }
}

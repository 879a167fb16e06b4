//! Outcome types for pairwise boundary comparisons.

/// Outcome of comparing two boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictResult {
    /// Not compared: borderless participant, or no spatial contact
    None,
    /// Contact that is expected or explicitly waived
    Clean,
    /// Interiors overlap with positive area
    Overlap,
    /// Boundary contact made of several disjoint pieces
    Seam,
    /// Isolated point contact
    Point,
}

impl ConflictResult {
    /// Whether the pair counts towards the checked total
    pub fn is_checked(&self) -> bool {
        !matches!(self, ConflictResult::None)
    }

    /// Whether this result is a reportable conflict
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ConflictResult::Overlap | ConflictResult::Seam | ConflictResult::Point
        )
    }
}

impl std::fmt::Display for ConflictResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictResult::None => write!(f, "none"),
            ConflictResult::Clean => write!(f, "clean"),
            ConflictResult::Overlap => write!(f, "overlap"),
            ConflictResult::Seam => write!(f, "seam"),
            ConflictResult::Point => write!(f, "point"),
        }
    }
}

/// Unordered pair of feature ids, stored with the ids sorted
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        let ab = PairKey::new("alsace", "baden");
        let ba = PairKey::new("baden", "alsace");
        assert_eq!(ab, ba);
        assert_eq!(ab.low(), "alsace");
        assert_eq!(ab.high(), "baden");
        assert_eq!(ab.to_string(), "alsace:baden");
    }

    #[test]
    fn test_result_flags() {
        assert!(!ConflictResult::None.is_checked());
        assert!(ConflictResult::Clean.is_checked());
        assert!(!ConflictResult::Clean.is_conflict());
        assert!(ConflictResult::Seam.is_conflict());
    }
}

use crate::shared::constants::DEFAULT_OVERLAP_THRESHOLD;
use crate::shared::rectangle::Rectangle;

/// Collapses detections of the same physical object reported by several
/// detectors into one rectangle each.
///
/// Candidates are visited largest-first; a candidate is kept only if its
/// overlap ratio with every already-kept rectangle is below the threshold.
/// Equal areas keep their input order, so earlier detectors win ties.
#[derive(Clone, Debug)]
pub struct OverlapDeduplicator {
    overlap_threshold: f64,
}

impl OverlapDeduplicator {
    pub fn new(overlap_threshold: f64) -> Self {
        Self { overlap_threshold }
    }

    pub fn overlap_threshold(&self) -> f64 {
        self.overlap_threshold
    }

    pub fn is_duplicate(&self, a: &Rectangle, b: &Rectangle) -> bool {
        a.overlap_ratio(b) >= self.overlap_threshold
    }

    /// Merges general, left and right eye detections (in that order) and
    /// returns one rectangle per distinct eye.
    pub fn deduplicate_eyes(
        &self,
        general: &[Rectangle],
        left: &[Rectangle],
        right: &[Rectangle],
    ) -> Vec<Rectangle> {
        let candidates: Vec<Rectangle> = general
            .iter()
            .chain(left)
            .chain(right)
            .copied()
            .collect();
        self.deduplicate(&candidates)
    }

    /// Greedy largest-first deduplication. Output is in acceptance order.
    ///
    /// Zero-area candidates are dropped: they cannot suppress anything and
    /// do not describe an object.
    pub fn deduplicate(&self, candidates: &[Rectangle]) -> Vec<Rectangle> {
        let mut ordered: Vec<&Rectangle> = candidates
            .iter()
            .filter(|r| r.is_well_formed())
            .collect();
        // sort_by is stable: equal areas stay in input order
        ordered.sort_by(|a, b| b.area().total_cmp(&a.area()));

        let mut kept: Vec<Rectangle> = Vec::with_capacity(ordered.len());
        for candidate in ordered {
            let duplicate = kept.iter().any(|k| self.is_duplicate(candidate, k));
            if !duplicate {
                kept.push(*candidate);
            }
        }
        kept
    }
}

impl Default for OverlapDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAP_THRESHOLD)
    }
}

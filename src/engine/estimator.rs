//! Triplet-consensus frame reconstruction.
//!
//! The estimator draws random anchor triplets from a frame's active
//! slots, validates each candidate against the distances recorded at
//! placement time, and solves the planar resection twice (first with
//! center-relative offsets, then with front-relative offsets) to
//! recover the frame's center and front-reference points.
//!
//! Sampling is a bounded iterative loop over a caller-supplied generator,
//! so a reconstruction is deterministic under a seeded rng and the
//! attempt count is exact: a call either succeeds early or performs
//! precisely `retry_budget` attempts.

use log::{debug, warn};
use rand::Rng;

use super::consistency::ConsistencyChecker;
use super::group::AnchorGroup;
use crate::config::HubConfig;
use crate::core::math::{locate_reference, pair_distances};
use crate::core::types::Vec3;
use crate::io::record::FrameRecord;

/// A successful reconstruction: the recovered reference points plus the
/// drift-check sample taken from the accepted triplet's first anchor.
#[derive(Debug, Clone, Copy)]
pub struct FrameFix {
    /// Reconstructed center position.
    pub center: Vec3,
    /// Reconstructed front-reference position.
    pub front: Vec3,
    /// Slot index cached for drift detection.
    pub check_slot: usize,
    /// That slot's live position at acceptance time.
    pub check_position: Vec3,
}

/// Outcome of one reconstruction call.
#[derive(Debug, Clone, Copy)]
pub struct EstimateResult {
    /// The accepted fix, if any triplet passed.
    pub fix: Option<FrameFix>,
    /// Triplet attempts consumed.
    pub attempts: u32,
}

/// Reconstructs a frame pose from anchor triplets.
#[derive(Debug, Clone)]
pub struct FrameEstimator {
    checker: ConsistencyChecker,
    retry_budget: u32,
}

impl FrameEstimator {
    /// Create an estimator from the engine configuration.
    pub fn new(config: &HubConfig) -> Self {
        Self {
            checker: ConsistencyChecker::new(config.distance_tolerance),
            retry_budget: config.retry_budget,
        }
    }

    /// Attempt to reconstruct the frame's center and front points.
    ///
    /// Every attempt (repeated indices, a rejected distance check, or a
    /// degenerate solve) consumes budget. An empty active list or a
    /// record that does not match the group's slot count aborts without
    /// consuming any.
    pub fn estimate(
        &self,
        group: &AnchorGroup,
        record: &FrameRecord,
        rng: &mut impl Rng,
    ) -> EstimateResult {
        let active = group.active_indices();
        if active.is_empty() {
            return EstimateResult {
                fix: None,
                attempts: 0,
            };
        }
        if !record.matches(group.len()) {
            warn!(
                "frame record has {} offsets but the group has {} slots; skipping",
                record.center_offsets.len(),
                group.len()
            );
            return EstimateResult {
                fix: None,
                attempts: 0,
            };
        }

        for attempt in 1..=self.retry_budget {
            let p1 = active[rng.random_range(0..active.len())];
            let p2 = active[rng.random_range(0..active.len())];
            let p3 = active[rng.random_range(0..active.len())];
            if p1 == p2 || p2 == p3 || p3 == p1 {
                continue;
            }

            let live = [
                group.position(p1).unwrap_or_default(),
                group.position(p2).unwrap_or_default(),
                group.position(p3).unwrap_or_default(),
            ];
            let recorded = [
                record.center_offsets[p1],
                record.center_offsets[p2],
                record.center_offsets[p3],
            ];

            if !self
                .checker
                .accepts(&pair_distances(&recorded), &pair_distances(&live))
            {
                continue;
            }

            let Some(center) = locate_reference(&recorded, &live) else {
                continue;
            };
            let front_recorded = [
                record.front_offsets[p1],
                record.front_offsets[p2],
                record.front_offsets[p3],
            ];
            let Some(front) = locate_reference(&front_recorded, &live) else {
                continue;
            };

            debug!(
                "triplet ({p1},{p2},{p3}) accepted on attempt {attempt}/{}",
                self.retry_budget
            );
            return EstimateResult {
                fix: Some(FrameFix {
                    center,
                    front,
                    check_slot: p1,
                    check_position: live[0],
                }),
                attempts: attempt,
            };
        }

        debug!(
            "no consistent triplet in {} attempts ({} anchors active)",
            self.retry_budget,
            active.len()
        );
        EstimateResult {
            fix: None,
            attempts: self.retry_budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Quat;
    use approx::assert_relative_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Group + record for a frame whose center sat at `center` facing +Z
    /// (so the front reference is one meter further along +Z).
    fn frame_fixture(center: Vec3, anchors: &[Vec3]) -> (AnchorGroup, FrameRecord) {
        let front = center + Vec3::new(0.0, 0.0, 1.0);
        let mut group = AnchorGroup::new("zone", anchors.len());
        let mut record = FrameRecord::with_anchor_count(anchors.len());
        record.root_rotation = Quat::identity();
        {
            let mut store = crate::store::MemoryStore::new();
            group.begin_load(&mut store);
        }
        for (i, &p) in anchors.iter().enumerate() {
            group.on_loaded(i, true, p);
            record.center_offsets[i] = p - center;
            record.front_offsets[i] = p - front;
        }
        (group, record)
    }

    fn well_spread_anchors() -> Vec<Vec3> {
        vec![
            Vec3::new(1.3, 0.0, 0.8),
            Vec3::new(-0.9, 0.0, 1.7),
            Vec3::new(0.4, 0.0, -1.2),
            Vec3::new(-1.6, 0.0, -0.6),
            Vec3::new(2.1, 0.0, -0.3),
        ]
    }

    #[test]
    fn test_exact_reconstruction() {
        let center = Vec3::new(0.7, 0.0, -0.2);
        let (group, record) = frame_fixture(center, &well_spread_anchors());
        let estimator = FrameEstimator::new(&HubConfig::default());
        let mut rng = SmallRng::seed_from_u64(7);

        let result = estimator.estimate(&group, &record, &mut rng);
        let fix = result.fix.expect("noiseless anchors must reconstruct");
        assert_relative_eq!(fix.center.x, center.x, epsilon = 1e-3);
        assert_relative_eq!(fix.center.z, center.z, epsilon = 1e-3);
        assert_relative_eq!(fix.front.x, center.x, epsilon = 1e-3);
        assert_relative_eq!(fix.front.z, center.z + 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_check_sample_comes_from_first_index() {
        let (group, record) = frame_fixture(Vec3::zero(), &well_spread_anchors());
        let estimator = FrameEstimator::new(&HubConfig::default());
        let mut rng = SmallRng::seed_from_u64(3);

        let fix = estimator.estimate(&group, &record, &mut rng).fix.unwrap();
        assert_eq!(
            group.position(fix.check_slot).unwrap(),
            fix.check_position
        );
    }

    #[test]
    fn test_rejected_triplets_exhaust_budget_exactly() {
        let anchors = well_spread_anchors();
        let (mut group, record) = frame_fixture(Vec3::zero(), &anchors);
        // Shrink the field: every measured distance falls below its
        // recorded value, so the one-sided check rejects every triplet.
        for (i, &p) in anchors.iter().enumerate() {
            group.update_position(i, p * 0.5);
        }
        let config = HubConfig::default().with_retry_budget(25);
        let estimator = FrameEstimator::new(&config);
        let mut rng = SmallRng::seed_from_u64(11);

        let result = estimator.estimate(&group, &record, &mut rng);
        assert!(result.fix.is_none());
        assert_eq!(result.attempts, 25);
    }

    #[test]
    fn test_contracted_anchors_still_accepted() {
        // Anchors that moved closer together pass the one-sided check and
        // reconstruct (to a now-wrong but accepted pose).
        let anchors = well_spread_anchors();
        let (mut group, record) = frame_fixture(Vec3::zero(), &anchors);
        for (i, &p) in anchors.iter().enumerate() {
            group.update_position(i, p * 2.0);
        }
        let estimator = FrameEstimator::new(&HubConfig::default());
        let mut rng = SmallRng::seed_from_u64(5);
        assert!(estimator.estimate(&group, &record, &mut rng).fix.is_some());
    }

    #[test]
    fn test_empty_active_list_aborts() {
        let mut store = crate::store::MemoryStore::new();
        let mut group = AnchorGroup::new("zone", 5);
        group.begin_load(&mut store);
        let record = FrameRecord::with_anchor_count(5);
        let estimator = FrameEstimator::new(&HubConfig::default());
        let mut rng = SmallRng::seed_from_u64(1);

        let result = estimator.estimate(&group, &record, &mut rng);
        assert!(result.fix.is_none());
        assert_eq!(result.attempts, 0);
    }

    #[test]
    fn test_record_length_mismatch_aborts() {
        let (group, _) = frame_fixture(Vec3::zero(), &well_spread_anchors());
        let record = FrameRecord::with_anchor_count(3);
        let estimator = FrameEstimator::new(&HubConfig::default());
        let mut rng = SmallRng::seed_from_u64(1);

        let result = estimator.estimate(&group, &record, &mut rng);
        assert!(result.fix.is_none());
        assert_eq!(result.attempts, 0);
    }

    #[test]
    fn test_two_active_anchors_burn_full_budget() {
        // With two active anchors every triplet repeats an index, so the
        // call fails after exactly the budget.
        let anchors = vec![Vec3::new(1.0, 0.0, 0.5), Vec3::new(-1.0, 0.0, 0.7)];
        let (group, record) = frame_fixture(Vec3::zero(), &anchors);
        let config = HubConfig::default().with_retry_budget(10);
        let estimator = FrameEstimator::new(&config);
        let mut rng = SmallRng::seed_from_u64(2);

        let result = estimator.estimate(&group, &record, &mut rng);
        assert!(result.fix.is_none());
        assert_eq!(result.attempts, 10);
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let (group, record) = frame_fixture(Vec3::new(0.3, 0.0, 0.9), &well_spread_anchors());
        let estimator = FrameEstimator::new(&HubConfig::default());

        let a = estimator.estimate(&group, &record, &mut SmallRng::seed_from_u64(42));
        let b = estimator.estimate(&group, &record, &mut SmallRng::seed_from_u64(42));
        assert_eq!(a.attempts, b.attempts);
        let (fa, fb) = (a.fix.unwrap(), b.fix.unwrap());
        assert_eq!(fa.check_slot, fb.check_slot);
        assert_eq!(fa.center, fb.center);
    }
}

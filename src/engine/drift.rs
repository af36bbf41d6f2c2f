//! Periodic drift detection and correction.
//!
//! Each tick the monitor measures every resolved frame's cached check
//! anchor against its position at the last accepted reconstruction, and
//! accumulates a wall-clock revalidation timer. Either signal (drift on
//! any one frame, or timer expiry) triggers a reconstruction pass over
//! every resolved frame. A drift-triggered pass does not reset the
//! timer; only expiry does.

use log::{debug, info};
use rand::Rng;

use super::estimator::FrameEstimator;
use super::frame::Frame;
use crate::config::HubConfig;

/// What one monitor tick observed and did.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftReport {
    /// A resolved frame's check anchor moved beyond the epsilon.
    pub drift_detected: bool,
    /// The revalidation timer expired this tick.
    pub timer_expired: bool,
    /// Frames successfully re-reconstructed.
    pub refreshed: usize,
    /// Frames whose reconstruction pass failed (previous pose kept).
    pub failed: usize,
}

impl DriftReport {
    /// Whether this tick triggered a reconstruction pass.
    #[inline]
    pub fn reset_triggered(&self) -> bool {
        self.drift_detected || self.timer_expired
    }
}

/// Re-validates resolved frames on drift or on a timer.
#[derive(Debug, Clone)]
pub struct DriftMonitor {
    epsilon: f32,
    period: f32,
    elapsed: f32,
}

impl DriftMonitor {
    /// Create a monitor from the engine configuration.
    pub fn new(config: &HubConfig) -> Self {
        Self {
            epsilon: config.drift_epsilon,
            period: config.revalidate_period,
            elapsed: 0.0,
        }
    }

    /// Seconds accumulated toward the next timed revalidation.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Run one monitor tick over `frames`.
    pub fn tick(
        &mut self,
        dt: f32,
        frames: &mut [Frame],
        estimator: &FrameEstimator,
        rng: &mut impl Rng,
    ) -> DriftReport {
        let mut report = DriftReport::default();

        for frame in frames.iter() {
            if frame.is_resolved() && !frame.drift_ok(self.epsilon) {
                debug!("frame '{}' drifted past {} m", frame.name(), self.epsilon);
                report.drift_detected = true;
                break;
            }
        }

        if self.elapsed > self.period {
            report.timer_expired = true;
            self.elapsed = 0.0;
        } else {
            self.elapsed += dt;
        }

        if report.reset_triggered() {
            for frame in frames.iter_mut().filter(|f| f.is_resolved()) {
                if frame.try_resolve(estimator, rng) {
                    report.refreshed += 1;
                } else {
                    report.failed += 1;
                }
            }
            info!(
                "revalidation pass (drift: {}, timer: {}): {} refreshed, {} kept previous pose",
                report.drift_detected, report.timer_expired, report.refreshed, report.failed
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Pose3, Quat, Vec3};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// A resolved frame whose anchors exactly match its record.
    fn resolved_frame(config: &HubConfig) -> Frame {
        let mut frame = Frame::new("zone", 4);
        let anchors = [
            Vec3::new(1.3, 0.0, 0.8),
            Vec3::new(-0.9, 0.0, 1.7),
            Vec3::new(0.4, 0.0, -1.2),
            Vec3::new(-1.6, 0.0, -0.6),
        ];
        frame.apply_placement(
            Pose3::new(Vec3::zero(), Quat::identity()),
            Vec3::new(0.0, 0.0, 1.0),
            &anchors,
        );
        let record = frame.capture_record();

        let mut store = crate::store::MemoryStore::new();
        let mut fresh = Frame::new("zone", 4);
        fresh.begin_restore(record, &mut store);
        let estimator = FrameEstimator::new(config);
        let mut rng = SmallRng::seed_from_u64(21);
        for (i, &p) in anchors.iter().enumerate() {
            fresh.handle_load_event(i, true, p, 0.7, &estimator, &mut rng);
        }
        assert!(fresh.is_resolved());
        fresh
    }

    #[test]
    fn test_quiet_tick_does_nothing() {
        let config = HubConfig::default();
        let mut frames = vec![resolved_frame(&config)];
        let mut monitor = DriftMonitor::new(&config);
        let estimator = FrameEstimator::new(&config);
        let mut rng = SmallRng::seed_from_u64(0);

        let report = monitor.tick(0.1, &mut frames, &estimator, &mut rng);
        assert!(!report.reset_triggered());
        assert_eq!(report.refreshed, 0);
    }

    #[test]
    fn test_timer_expires_once_then_resets() {
        let config = HubConfig::default().with_revalidate_period(1.0);
        let mut frames = vec![resolved_frame(&config)];
        let mut monitor = DriftMonitor::new(&config);
        let estimator = FrameEstimator::new(&config);
        let mut rng = SmallRng::seed_from_u64(1);

        let mut expiries = 0;
        for _ in 0..25 {
            let report = monitor.tick(0.1, &mut frames, &estimator, &mut rng);
            if report.timer_expired {
                expiries += 1;
                assert_eq!(report.refreshed, 1);
                assert!(monitor.elapsed() < 0.2);
            }
        }
        // 25 ticks of 0.1 s against a 1.0 s period: two expiries, each
        // starting the accumulation over from zero.
        assert_eq!(expiries, 2);
    }

    #[test]
    fn test_drift_triggers_refresh_on_all_resolved() {
        let config = HubConfig::default();
        let mut frames = vec![resolved_frame(&config), resolved_frame(&config)];
        let mut monitor = DriftMonitor::new(&config);
        let estimator = FrameEstimator::new(&config);
        let mut rng = SmallRng::seed_from_u64(2);

        // Shift one frame's anchors rigidly: its check anchor moves, but
        // pairwise distances are intact, so revalidation succeeds.
        let shift = Vec3::new(0.5, 0.0, 0.0);
        let anchors: Vec<Vec3> = frames[0].group().slots().iter().map(|s| s.position).collect();
        for (i, &p) in anchors.iter().enumerate() {
            frames[0].update_anchor(i, p + shift);
        }

        let report = monitor.tick(0.1, &mut frames, &estimator, &mut rng);
        assert!(report.drift_detected);
        assert!(!report.timer_expired);
        // Both resolved frames are refreshed, drifted or not.
        assert_eq!(report.refreshed, 2);

        // The drifted frame's center followed the rigid shift.
        let center = frames[0].center().position;
        assert!((center.x - shift.x).abs() < 1e-3);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_pose() {
        let config = HubConfig::default().with_retry_budget(8);
        let mut frames = vec![resolved_frame(&config)];
        let mut monitor = DriftMonitor::new(&config);
        let estimator = FrameEstimator::new(&config);
        let mut rng = SmallRng::seed_from_u64(3);

        let pose_before = frames[0].center();

        // Shrink the anchor field: every pairwise distance contracts, so
        // every triplet is rejected by the one-sided check.
        let anchors: Vec<Vec3> = frames[0].group().slots().iter().map(|s| s.position).collect();
        for (i, &p) in anchors.iter().enumerate() {
            frames[0].update_anchor(i, p * 0.5);
        }

        let report = monitor.tick(0.1, &mut frames, &estimator, &mut rng);
        assert!(report.drift_detected);
        assert_eq!(report.failed, 1);
        assert!(frames[0].is_resolved());
        assert_eq!(frames[0].center(), pose_before);
    }

    #[test]
    fn test_unresolved_frames_ignored() {
        let config = HubConfig::default().with_revalidate_period(0.05);
        let mut frames = vec![Frame::new("idle", 4)];
        let mut monitor = DriftMonitor::new(&config);
        let estimator = FrameEstimator::new(&config);
        let mut rng = SmallRng::seed_from_u64(4);

        for _ in 0..5 {
            let report = monitor.tick(0.1, &mut frames, &estimator, &mut rng);
            assert_eq!(report.refreshed + report.failed, 0);
        }
    }
}

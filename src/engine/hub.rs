//! Hub engine: per-tick orchestration of frames, drift, and selection.
//!
//! The hub owns one [`Frame`] per logical tracking region and runs the
//! whole consensus cycle: it drains anchor completion events into the
//! frames, lets the drift monitor re-validate resolved frames, and picks
//! the frame nearest the viewer to serve the authoritative root
//! transform.
//!
//! Placement is a session: the host enters it when markers (or another
//! outer pose source) are being observed, feeds one observed pose per
//! frame, and the session finalizes automatically once every frame has
//! been seen: the shared root is pinned to frame 0's center, records
//! are captured and persisted, and a fresh restore cycle begins.

use std::path::PathBuf;

use crossbeam_channel::Receiver;
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::drift::{DriftMonitor, DriftReport};
use super::estimator::FrameEstimator;
use super::frame::Frame;
use super::placer::FramePlacer;
use super::selector::select_nearest;
use crate::config::HubConfig;
use crate::core::types::{Pose3, Vec3};
use crate::error::Result;
use crate::io::record::{load_records, save_records, RecordSet};
use crate::store::{AnchorEvent, AnchorStore};

/// Progress of the current placement session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementProgress {
    /// Frames placed so far this session.
    pub placed: usize,
    /// Total frames.
    pub total: usize,
    /// Whether this observation finished the session.
    pub finished: bool,
}

/// The frame consensus engine.
pub struct HubEngine {
    config: HubConfig,
    frames: Vec<Frame>,
    estimator: FrameEstimator,
    placer: FramePlacer,
    monitor: DriftMonitor,
    events: Receiver<AnchorEvent>,
    rng: SmallRng,
    placing: bool,
    placed: Vec<bool>,
    record_path: Option<PathBuf>,
    output: Option<Pose3>,
}

impl HubEngine {
    /// Create an engine with one frame per name.
    pub fn new(
        names: &[&str],
        config: HubConfig,
        store: &mut dyn AnchorStore,
    ) -> Result<Self> {
        config.validate()?;
        if names.is_empty() {
            return Err(crate::error::SthiraError::Config(
                "engine needs at least one frame".to_string(),
            ));
        }
        let frames = names
            .iter()
            .map(|name| Frame::new(*name, config.anchor_count))
            .collect::<Vec<_>>();
        let placed = vec![false; frames.len()];
        Ok(Self {
            estimator: FrameEstimator::new(&config),
            placer: FramePlacer::new(&config),
            monitor: DriftMonitor::new(&config),
            events: store.subscribe(),
            rng: SmallRng::from_os_rng(),
            frames,
            placed,
            config,
            placing: false,
            record_path: None,
            output: None,
        })
    }

    /// Persist records to `path` when placement sessions finalize.
    pub fn with_record_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_path = Some(path.into());
        self
    }

    /// Seed the engine's sampling rng (deterministic tests).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Engine configuration.
    #[inline]
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// All frames.
    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Mutable access to one frame (host tracking updates).
    #[inline]
    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    /// Whether a placement session is active.
    #[inline]
    pub fn is_placing(&self) -> bool {
        self.placing
    }

    /// Last selected root transform.
    #[inline]
    pub fn output(&self) -> Option<Pose3> {
        self.output
    }

    /// Begin restore cycles from an already loaded record set.
    pub fn restore(&mut self, store: &mut dyn AnchorStore, set: &RecordSet) {
        if set.frames.len() != self.frames.len() {
            warn!(
                "record set has {} frames, engine has {}; restoring the overlap",
                set.frames.len(),
                self.frames.len()
            );
        }
        for (frame, record) in self.frames.iter_mut().zip(&set.frames) {
            frame.begin_restore(record.clone(), store);
        }
    }

    /// Load records from `path` and begin restore cycles.
    ///
    /// Returns `false` when no usable records exist (first run); the
    /// host should enter a placement session instead.
    pub fn restore_from_path(
        &mut self,
        store: &mut dyn AnchorStore,
        path: impl Into<PathBuf>,
    ) -> Result<bool> {
        let path = path.into();
        let loaded = load_records(&path)?;
        self.record_path = Some(path);
        match loaded {
            Some(set) => {
                self.restore(store, &set);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enter a placement session, or finalize the active one.
    ///
    /// Returns `true` when a new session started. Calling again while a
    /// session is active finalizes it early, mirroring a toggle control.
    pub fn begin_placement(&mut self, store: &mut dyn AnchorStore) -> Result<bool> {
        if !self.placing {
            self.placing = true;
            self.placed.fill(false);
            info!("placement session started ({} frames)", self.frames.len());
            Ok(true)
        } else {
            self.finalize_placement(store)?;
            Ok(false)
        }
    }

    /// Feed an observed pose for frame `index` during a placement session.
    ///
    /// Places the frame's anchors around the pose and, once every frame
    /// has been observed, finalizes the session. Ignored outside a
    /// session.
    pub fn observe_target(
        &mut self,
        index: usize,
        pose: Pose3,
        store: &mut dyn AnchorStore,
    ) -> Result<PlacementProgress> {
        let total = self.frames.len();
        if !self.placing {
            debug!("observed target {index} outside a placement session; ignored");
            return Ok(PlacementProgress {
                placed: 0,
                total,
                finished: false,
            });
        }
        if let Some(frame) = self.frames.get_mut(index) {
            self.placer.place(frame, pose, store, &mut self.rng);
            self.placed[index] = true;
        }
        let placed = self.placed.iter().filter(|&&p| p).count();
        let finished = placed == total;
        if finished {
            self.finalize_placement(store)?;
        }
        Ok(PlacementProgress {
            placed,
            total,
            finished,
        })
    }

    /// Finalize the active placement session early.
    pub fn finish_placement(&mut self, store: &mut dyn AnchorStore) -> Result<()> {
        if self.placing {
            self.finalize_placement(store)?;
        }
        Ok(())
    }

    /// Pin the shared root, capture and persist records, and restart the
    /// restore cycle.
    fn finalize_placement(&mut self, store: &mut dyn AnchorStore) -> Result<()> {
        let root = self.frames[0].center();
        for frame in &mut self.frames {
            frame.set_root_world(root);
        }
        let set = RecordSet {
            frames: self.frames.iter().map(|f| f.capture_record()).collect(),
        };
        if let Some(path) = &self.record_path {
            save_records(path, &set)?;
        }
        self.placing = false;
        info!("placement session finalized; restoring frames from fresh records");
        self.restore(store, &set);
        Ok(())
    }

    /// Drain pending anchor events into the frames.
    pub fn pump_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                AnchorEvent::Loaded {
                    id,
                    success,
                    position,
                } => {
                    let Some(frame) = self.frames.iter_mut().find(|f| f.name() == id.frame)
                    else {
                        debug!("load event for unknown frame '{}'", id.frame);
                        continue;
                    };
                    frame.handle_load_event(
                        id.slot,
                        success,
                        position,
                        self.config.activation_ratio,
                        &self.estimator,
                        &mut self.rng,
                    );
                }
                AnchorEvent::Saved { id, success } => {
                    if !success {
                        warn!("anchor {} failed to persist", id);
                    }
                }
            }
        }
    }

    /// Run one engine tick.
    ///
    /// Drains events and, outside placement sessions, runs the drift
    /// monitor and re-selects the output frame nearest `viewer`. The
    /// output transform is held unchanged while no frame is resolved.
    pub fn tick(&mut self, dt: f32, viewer: Vec3) -> Option<Pose3> {
        self.tick_with_report(dt, viewer).0
    }

    /// Run one engine tick and also report what the drift monitor did.
    pub fn tick_with_report(&mut self, dt: f32, viewer: Vec3) -> (Option<Pose3>, DriftReport) {
        self.pump_events();
        let mut report = DriftReport::default();
        if !self.placing {
            report = self
                .monitor
                .tick(dt, &mut self.frames, &self.estimator, &mut self.rng);
            if let Some(index) = select_nearest(&self.frames, viewer) {
                self.output = Some(self.frames[index].root_world());
            }
        }
        (self.output, report)
    }
}

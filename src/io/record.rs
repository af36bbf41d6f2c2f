//! Frame-record persistence.
//!
//! A [`FrameRecord`] is the durable description of one frame: the root
//! pose local to the frame's center, and every anchor's offset relative
//! to the center and front references at placement time. A [`RecordSet`]
//! bundles one record per hub frame, in frame order, and round-trips
//! through a JSON file.
//!
//! Stored floats are sanitized in both directions: non-finite position
//! components coerce to 0.0 and a non-finite rotation coerces to
//! identity, on save and again on load. Rotations are normalized on
//! read. A missing or unparseable file is "no record": the caller
//! proceeds with the placement flow rather than reconstruction.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::types::{Quat, Vec3};
use crate::error::Result;

/// Persisted state of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Root pose position, local to the frame's center.
    #[serde(default)]
    pub root_position: Vec3,
    /// Root pose orientation, local to the frame's center. Defaults to
    /// identity when the stored record predates the field.
    #[serde(default)]
    pub root_rotation: Quat,
    /// Anchor positions relative to the center pose.
    pub center_offsets: Vec<Vec3>,
    /// Anchor positions relative to the front reference point.
    pub front_offsets: Vec<Vec3>,
}

impl FrameRecord {
    /// An empty record sized for `count` anchors.
    pub fn with_anchor_count(count: usize) -> Self {
        Self {
            root_position: Vec3::zero(),
            root_rotation: Quat::identity(),
            center_offsets: vec![Vec3::zero(); count],
            front_offsets: vec![Vec3::zero(); count],
        }
    }

    /// True when both offset tables match the frame's anchor count.
    pub fn matches(&self, anchor_count: usize) -> bool {
        self.center_offsets.len() == anchor_count && self.front_offsets.len() == anchor_count
    }

    /// Coerce non-finite components to their defaults and normalize the
    /// rotation.
    pub fn sanitize(&mut self) {
        sanitize_vec(&mut self.root_position);
        if !self.root_rotation.is_finite() {
            self.root_rotation = Quat::identity();
        }
        self.root_rotation = self.root_rotation.normalize();
        for v in self
            .center_offsets
            .iter_mut()
            .chain(self.front_offsets.iter_mut())
        {
            sanitize_vec(v);
        }
    }
}

fn sanitize_vec(v: &mut Vec3) {
    if !v.x.is_finite() {
        v.x = 0.0;
    }
    if !v.y.is_finite() {
        v.y = 0.0;
    }
    if !v.z.is_finite() {
        v.z = 0.0;
    }
}

/// One record per hub frame, in frame order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordSet {
    /// Frame records.
    pub frames: Vec<FrameRecord>,
}

impl RecordSet {
    /// Sanitize every contained record.
    pub fn sanitize(&mut self) {
        for record in &mut self.frames {
            record.sanitize();
        }
    }
}

/// Load a record set from `path`.
///
/// Returns `Ok(None)` when the file is absent or fails to parse; both
/// are the first-run case, not errors.
pub fn load_records(path: &Path) -> Result<Option<RecordSet>> {
    if !path.exists() {
        info!("no frame record at {}; first run", path.display());
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    match serde_json::from_str::<RecordSet>(&data) {
        Ok(mut set) => {
            set.sanitize();
            info!(
                "loaded {} frame records from {}",
                set.frames.len(),
                path.display()
            );
            Ok(Some(set))
        }
        Err(e) => {
            warn!(
                "frame record at {} failed to parse ({e}); treating as first run",
                path.display()
            );
            Ok(None)
        }
    }
}

/// Save a record set to `path`, sanitizing a copy first.
pub fn save_records(path: &Path, set: &RecordSet) -> Result<()> {
    let mut clean = set.clone();
    clean.sanitize();
    let data = serde_json::to_string_pretty(&clean)?;
    fs::write(path, data)?;
    info!(
        "saved {} frame records to {}",
        clean.frames.len(),
        path.display()
    );
    Ok(())
}

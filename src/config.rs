//! Engine configuration.
//!
//! Every tunable of the consensus engine lives in [`HubConfig`] so tests
//! and hosts can vary them per instance; nothing is a global constant.
//! All fields carry serde defaults, so a partial config file fills in the
//! rest.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SthiraError};

/// Configuration for the hub engine and its frames.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HubConfig {
    /// Number of anchor slots per frame.
    ///
    /// Fixed at frame construction; never changes afterwards.
    ///
    /// Default: 10
    #[serde(default = "default_anchor_count")]
    pub anchor_count: usize,

    /// Fraction of a frame's anchors that must reload successfully before
    /// reconstruction is attempted. The comparison is strict:
    /// `active > count * ratio`.
    ///
    /// Default: 0.9
    #[serde(default = "default_activation_ratio")]
    pub activation_ratio: f32,

    /// Tolerance for the recorded-vs-measured distance check (meters).
    ///
    /// Default: 0.001
    #[serde(default = "default_distance_tolerance")]
    pub distance_tolerance: f32,

    /// Triplet attempts per reconstruction call.
    ///
    /// Default: 50
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    /// Half-width of the square anchors are scattered over at placement
    /// time (meters).
    ///
    /// Default: 3.0
    #[serde(default = "default_anchor_spread")]
    pub anchor_spread: f32,

    /// Distance an anchor may move from its last validated position
    /// before the frame is considered drifted (meters).
    ///
    /// Default: 0.01
    #[serde(default = "default_drift_epsilon")]
    pub drift_epsilon: f32,

    /// Period of the unconditional revalidation timer (seconds).
    ///
    /// Default: 10.0
    #[serde(default = "default_revalidate_period")]
    pub revalidate_period: f32,
}

fn default_anchor_count() -> usize {
    10
}
fn default_activation_ratio() -> f32 {
    0.9
}
fn default_distance_tolerance() -> f32 {
    0.001
}
fn default_retry_budget() -> u32 {
    50
}
fn default_anchor_spread() -> f32 {
    3.0
}
fn default_drift_epsilon() -> f32 {
    0.01
}
fn default_revalidate_period() -> f32 {
    10.0
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            anchor_count: 10,
            activation_ratio: 0.9,
            distance_tolerance: 0.001,
            retry_budget: 50,
            anchor_spread: 3.0,
            drift_epsilon: 0.01,
            revalidate_period: 10.0,
        }
    }
}

impl HubConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the per-frame anchor count.
    pub fn with_anchor_count(mut self, count: usize) -> Self {
        self.anchor_count = count;
        self
    }

    /// Builder-style setter for the activation ratio.
    pub fn with_activation_ratio(mut self, ratio: f32) -> Self {
        self.activation_ratio = ratio;
        self
    }

    /// Builder-style setter for the distance tolerance.
    pub fn with_distance_tolerance(mut self, meters: f32) -> Self {
        self.distance_tolerance = meters;
        self
    }

    /// Builder-style setter for the retry budget.
    pub fn with_retry_budget(mut self, attempts: u32) -> Self {
        self.retry_budget = attempts;
        self
    }

    /// Builder-style setter for the anchor scatter half-width.
    pub fn with_anchor_spread(mut self, meters: f32) -> Self {
        self.anchor_spread = meters;
        self
    }

    /// Builder-style setter for the drift epsilon.
    pub fn with_drift_epsilon(mut self, meters: f32) -> Self {
        self.drift_epsilon = meters;
        self
    }

    /// Builder-style setter for the revalidation period.
    pub fn with_revalidate_period(mut self, seconds: f32) -> Self {
        self.revalidate_period = seconds;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.anchor_count < 3 {
            return Err(SthiraError::Config(format!(
                "anchor_count must be at least 3, got {}",
                self.anchor_count
            )));
        }
        if !(self.activation_ratio > 0.0 && self.activation_ratio <= 1.0) {
            return Err(SthiraError::Config(format!(
                "activation_ratio must be in (0, 1], got {}",
                self.activation_ratio
            )));
        }
        if !(self.distance_tolerance > 0.0) {
            return Err(SthiraError::Config(format!(
                "distance_tolerance must be positive, got {}",
                self.distance_tolerance
            )));
        }
        if self.retry_budget == 0 {
            return Err(SthiraError::Config(
                "retry_budget must be at least 1".to_string(),
            ));
        }
        if !(self.anchor_spread > 0.0) {
            return Err(SthiraError::Config(format!(
                "anchor_spread must be positive, got {}",
                self.anchor_spread
            )));
        }
        if !(self.drift_epsilon > 0.0) {
            return Err(SthiraError::Config(format!(
                "drift_epsilon must be positive, got {}",
                self.drift_epsilon
            )));
        }
        if !(self.revalidate_period > 0.0) {
            return Err(SthiraError::Config(format!(
                "revalidate_period must be positive, got {}",
                self.revalidate_period
            )));
        }
        Ok(())
    }
}

//! Maps the tracked hand point to a player driving force.
//!
//! The raw input is a normalized `(x, y)` in `[0,1]x[0,1]` from the external
//! hand tracker. It is mapped to pixel space, exponentially smoothed, offset
//! from the screen center with a per-axis dead zone, then scaled and clamped.
//! The result is a proportional controller: force grows linearly with
//! displacement from center past the dead zone and saturates at `max_force`.

use serde::{Deserialize, Serialize};

/// Tuning parameters for the control mapper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Exponential smoothing factor per update, applied per axis.
    pub smoothing: f32,
    /// Half-width of the centered band where displacement reads as zero, in
    /// pixels.
    pub dead_zone: f32,
    /// Force at full displacement (screen edge), before clamping.
    pub force_scale: f32,
    /// Per-axis saturation bound.
    pub max_force: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.2,
            dead_zone: 10.0,
            force_scale: 250.0,
            max_force: 400.0,
        }
    }
}

/// Converts tracked points into force vectors, one call per frame.
#[derive(Debug, Clone, Copy)]
pub struct ControlMapper {
    config: ControlConfig,
    screen: [f32; 2],
    /// Smoothed cursor position in pixels, persisted across frames.
    smoothed: [f32; 2],
}

impl ControlMapper {
    /// Creates a mapper for the given tracker image size, with the cursor
    /// starting at the screen center.
    pub fn new(screen: [f32; 2]) -> Self {
        Self::with_config(screen, ControlConfig::default())
    }

    pub fn with_config(screen: [f32; 2], config: ControlConfig) -> Self {
        Self {
            config,
            screen,
            smoothed: [screen[0] / 2.0, screen[1] / 2.0],
        }
    }

    /// Current smoothed cursor position, for debug visualization.
    pub fn smoothed(&self) -> [f32; 2] {
        self.smoothed
    }

    /// Maps a raw point to a force vector.
    ///
    /// With no point this frame, returns zero force and leaves the smoothed
    /// state untouched.
    pub fn update(&mut self, raw: Option<[f32; 2]>) -> [f32; 2] {
        let Some(raw) = raw else {
            return [0.0, 0.0];
        };

        let target = [
            raw[0].clamp(0.0, 1.0) * self.screen[0],
            raw[1].clamp(0.0, 1.0) * self.screen[1],
        ];
        self.smoothed[0] += self.config.smoothing * (target[0] - self.smoothed[0]);
        self.smoothed[1] += self.config.smoothing * (target[1] - self.smoothed[1]);

        let half = [self.screen[0] / 2.0, self.screen[1] / 2.0];
        let mut offset = [self.smoothed[0] - half[0], self.smoothed[1] - half[1]];
        for axis in &mut offset {
            if axis.abs() < self.config.dead_zone {
                *axis = 0.0;
            }
        }

        [
            (offset[0] / half[0] * self.config.force_scale)
                .clamp(-self.config.max_force, self.config.max_force),
            (offset[1] / half[1] * self.config.force_scale)
                .clamp(-self.config.max_force, self.config.max_force),
        ]
    }
}

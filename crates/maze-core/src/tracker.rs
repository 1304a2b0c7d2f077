//! Message-passing boundary to the asynchronous hand tracker.
//!
//! The external pose estimator runs on its own schedule and pushes each
//! detected point into a single-slot, latest-wins mailbox. The frame loop
//! reads the most recent complete point without ever blocking; a partial or
//! in-flight result is never observable.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A normalized tracked point, stamped by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPoint {
    pub timestamp_ms: u64,
    /// Normalized coordinates in `[0,1]x[0,1]` of the tracker image.
    pub x: f32,
    pub y: f32,
}

impl TrackedPoint {
    pub const fn new(timestamp_ms: u64, x: f32, y: f32) -> Self {
        Self { timestamp_ms, x, y }
    }
}

/// Shared single-slot mailbox. Cloning yields another handle to the same
/// slot, so the producer and the frame loop each hold one.
#[derive(Debug, Clone, Default)]
pub struct TrackerSlot {
    slot: Arc<Mutex<Option<TrackedPoint>>>,
}

impl TrackerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a point, replacing whatever was in the slot.
    pub fn publish(&self, point: TrackedPoint) {
        *self.slot.lock() = Some(point);
    }

    /// Reads the most recent point, leaving it in place. The frame loop
    /// uses this so a frame without a fresh detection reuses the last one.
    pub fn latest(&self) -> Option<TrackedPoint> {
        *self.slot.lock()
    }

    /// Reads and clears the slot, for consumers that want each point at
    /// most once.
    pub fn take_latest(&self) -> Option<TrackedPoint> {
        self.slot.lock().take()
    }

    /// Empties the slot, e.g. when the tracker loses the hand.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}

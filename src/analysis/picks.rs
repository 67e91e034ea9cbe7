//! Bounded queue of externally supplied selection events.
//!
//! Point picks arrive from whatever front end displays the spectrum.
//! The queue is owned by the caller and handed into calibration
//! explicitly; it holds at most a fixed number of recent picks and
//! silently evicts the oldest beyond that.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default capacity of a pick queue.
pub const DEFAULT_CAPACITY: usize = 10;

/// One selection event in spectrum coordinates (channel, count height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickQueue {
    points: VecDeque<PickPoint>,
    capacity: usize,
}

impl PickQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(PickPoint { x, y });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// The two most recent picks in pick order, if present.
    pub fn latest_pair(&self) -> Option<(PickPoint, PickPoint)> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        Some((self.points[n - 2], self.points[n - 1]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PickPoint> {
        self.points.iter()
    }
}

impl Default for PickQueue {
    fn default() -> Self {
        Self::new()
    }
}

//! Fixed-capacity rolling window of per-interval values

use std::collections::VecDeque;

use crate::types::WindowSize;

/// Most recent per-interval samples, oldest first
///
/// Pushing past capacity evicts from the front, so memory stays bounded no
/// matter how long the process runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingWindow {
    samples: VecDeque<u64>,
    capacity: WindowSize,
}

impl RollingWindow {
    #[must_use]
    pub fn new(capacity: WindowSize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest ones beyond capacity
    pub fn push(&mut self, sample: u64) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity.get() {
            self.samples.pop_front();
        }
    }

    /// Sum of all samples held
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.samples
            .iter()
            .fold(0u64, |acc, sample| acc.saturating_add(*sample))
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the window holds `capacity` samples
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity.get()
    }

    #[must_use]
    #[inline]
    pub const fn capacity(&self) -> WindowSize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().copied()
    }

    /// Samples oldest first, as a vector
    #[must_use]
    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(WindowSize::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(capacity: usize) -> RollingWindow {
        RollingWindow::new(WindowSize::new(capacity).unwrap())
    }

    #[test]
    fn test_push_and_sum() {
        let mut w = window(3);
        w.push(10);
        w.push(5);

        assert_eq!(w.to_vec(), vec![10, 5]);
        assert_eq!(w.sum(), 15);
        assert!(!w.is_full());
    }

    #[test]
    fn test_evicts_oldest() {
        let mut w = window(3);
        for sample in 1..=5 {
            w.push(sample);
        }

        assert_eq!(w.to_vec(), vec![3, 4, 5]);
        assert_eq!(w.len(), 3);
        assert!(w.is_full());
        assert_eq!(w.sum(), 12);
    }

    #[test]
    fn test_default_capacity_is_one_minute() {
        let mut w = RollingWindow::default();
        for _ in 0..100 {
            w.push(1);
        }
        assert_eq!(w.len(), 60);
        assert_eq!(w.sum(), 60);
    }

    #[test]
    fn test_sum_saturates() {
        let mut w = window(2);
        w.push(u64::MAX);
        w.push(1);
        assert_eq!(w.sum(), u64::MAX);
    }
}

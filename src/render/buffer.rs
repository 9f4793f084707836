// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::collections::VecDeque;

use crate::aggregator::BeatSample;

/// Samples polled from the engine that haven't been drawn yet. Bounded: once
/// full, the oldest samples are dropped to make room.
#[derive(Debug)]
pub struct SampleBuffer {
    samples: VecDeque<BeatSample>,
    capacity: usize,
    dropped: u64,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> SampleBuffer {
        let capacity = capacity.max(1);
        SampleBuffer {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            dropped: 0,
        }
    }

    /// Appends a batch, returning how many samples were dropped to fit it.
    pub fn push_batch(&mut self, batch: Vec<BeatSample>) -> usize {
        self.samples.extend(batch);
        let overflow = self.samples.len().saturating_sub(self.capacity);
        self.samples.drain(..overflow);
        self.dropped += overflow as u64;
        overflow
    }

    /// Removes and returns everything buffered, oldest first.
    pub fn drain(&mut self) -> Vec<BeatSample> {
        self.samples.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of samples dropped over the buffer's lifetime.
    pub fn total_dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn batch(start: usize, count: usize) -> Vec<BeatSample> {
        (start..start + count)
            .map(|i| BeatSample::new(i as f64, 0.0))
            .collect()
    }

    #[test]
    fn test_push_and_drain() {
        let mut buffer = SampleBuffer::new(10);
        assert_eq!(0, buffer.push_batch(batch(0, 3)));
        assert_eq!(0, buffer.push_batch(batch(3, 3)));
        assert_eq!(6, buffer.len());

        let drained = buffer.drain();
        assert_eq!(batch(0, 6), drained);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut buffer = SampleBuffer::new(4);
        assert_eq!(0, buffer.push_batch(batch(0, 3)));
        assert_eq!(2, buffer.push_batch(batch(3, 3)));
        assert_eq!(batch(2, 4), buffer.drain());

        assert_eq!(6, buffer.push_batch(batch(10, 10)));
        assert_eq!(batch(16, 4), buffer.drain());
        assert_eq!(8, buffer.total_dropped());
    }

    #[test]
    fn test_zero_capacity() {
        let mut buffer = SampleBuffer::new(0);
        assert_eq!(1, buffer.capacity());
        assert_eq!(1, buffer.push_batch(batch(0, 2)));
        assert_eq!(batch(1, 1), buffer.drain());
    }
}

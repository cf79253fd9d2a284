use std::collections::VecDeque;

use crate::sampling::domain::color_sample::ColorSample;

/// Fixed-capacity FIFO of per-frame color samples.
///
/// Samples are stored whole, so the red, green, blue and luminance
/// sequences always have the same length. Once full, each push evicts
/// the oldest sample.
#[derive(Debug, Clone)]
pub struct TemporalBuffer {
    samples: VecDeque<ColorSample>,
    capacity: usize,
}

/// Owned copy of the buffer contents, oldest sample first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferSnapshot {
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub blue: Vec<f64>,
    pub luminance: Vec<f64>,
}

impl BufferSnapshot {
    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }
}

impl TemporalBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, sample: ColorSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
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

    pub fn snapshot(&self) -> BufferSnapshot {
        let n = self.samples.len();
        let mut snapshot = BufferSnapshot {
            red: Vec::with_capacity(n),
            green: Vec::with_capacity(n),
            blue: Vec::with_capacity(n),
            luminance: Vec::with_capacity(n),
        };
        for s in &self.samples {
            snapshot.red.push(s.red);
            snapshot.green.push(s.green);
            snapshot.blue.push(s.blue);
            snapshot.luminance.push(s.luminance);
        }
        snapshot
    }
}

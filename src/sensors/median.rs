//! Running median over a fixed ring of raw ADC samples.
//!
//! A median rejects single-read spikes that a plain average would smear
//! into the result, which matters for a battery divider sitting next to
//! a PWM-driven motor.

/// Fixed-capacity ring buffer of the last `N` samples.
pub struct SmoothingWindow<const N: usize> {
    ring: [u16; N],
    head: usize,
    count: usize,
}

impl<const N: usize> SmoothingWindow<N> {
    pub const fn new() -> Self {
        Self {
            ring: [0; N],
            head: 0,
            count: 0,
        }
    }

    /// Insert a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, sample: u16) {
        self.ring[self.head] = sample;
        self.head = (self.head + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Median of the samples held so far.
    ///
    /// With an even count the two middle samples are averaged (integer
    /// division).  `None` until the first sample arrives.
    pub fn median(&self) -> Option<u32> {
        if self.count == 0 {
            return None;
        }
        let mut sorted: heapless::Vec<u16, N> = heapless::Vec::new();
        // Cannot overflow: count <= N.
        let _ = sorted.extend_from_slice(&self.ring[..self.count]);
        sorted.sort_unstable();

        let mid = self.count / 2;
        if self.count % 2 == 1 {
            Some(sorted[mid] as u32)
        } else {
            Some((sorted[mid - 1] as u32 + sorted[mid] as u32) / 2)
        }
    }
}

impl<const N: usize> Default for SmoothingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

//! Timing collection
//!
//! Adapters own their [Timings], so nothing is shared between adapter instances.

use core::time::Duration;

#[derive(Debug, Default, Clone)]
///Per call timing samples
pub struct Timings {
    samples: Vec<Duration>,
}

impl Timings {
    #[inline(always)]
    ///Creates empty collector
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    #[inline(always)]
    ///Records single sample
    pub fn record(&mut self, elapsed: Duration) {
        self.samples.push(elapsed);
    }

    #[inline(always)]
    ///Returns number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline(always)]
    ///Returns whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline(always)]
    ///Returns all samples in order of recording
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    ///Returns sum of all samples
    pub fn total(&self) -> Duration {
        self.samples.iter().sum()
    }

    ///Returns mean sample, if any
    pub fn mean(&self) -> Option<Duration> {
        match u32::try_from(self.samples.len()) {
            Ok(0) | Err(_) => None,
            Ok(len) => Some(self.total() / len),
        }
    }

    ///Returns longest sample, if any
    pub fn max(&self) -> Option<Duration> {
        self.samples.iter().max().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
///Amount of data processed over time
pub struct Throughput {
    ///Bytes processed
    pub bytes: u64,
    ///Time it took
    pub elapsed: Duration,
}

impl Throughput {
    #[inline(always)]
    ///Creates new instance
    pub const fn new(bytes: u64, elapsed: Duration) -> Self {
        Self {
            bytes,
            elapsed,
        }
    }

    ///Returns megabits per second, or `None` if no time elapsed.
    pub fn mbits(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            Some((self.bytes as f64 * 8.0) / secs / 1_000_000.0)
        } else {
            None
        }
    }
}

impl core::fmt::Display for Throughput {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.mbits() {
            Some(mbits) => write!(fmt, "{mbits:.3} Mbit/s"),
            None => fmt.write_str("n/a"),
        }
    }
}

// src/sensor/altitude.rs

//! Altitude sample ring fed by the ADC conversion interrupt.

use core::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

/// Default ring capacity.
pub const SAMPLE_CAPACITY: usize = 60;

/// Largest ring capacity whose rounded mean fits `u32` arithmetic.
pub const MAX_SAMPLE_CAPACITY: usize = 32_768;

/// Fixed-capacity ring of raw altitude samples.
///
/// Only the conversion handler calls [`push`](Self::push). A slot being
/// overwritten during [`mean`](Self::mean) skews one reading by at most one
/// sample, which is tolerated instead of locked against.
pub struct AltitudeSampler<const N: usize = SAMPLE_CAPACITY> {
    samples: [AtomicU16; N],
    index: AtomicUsize,
}

impl<const N: usize> AltitudeSampler<N> {
    const CAPACITY_IN_RANGE: () = assert!(
        0 < N && N <= MAX_SAMPLE_CAPACITY,
        "sample ring capacity must be between 1 and 32768 slots"
    );

    /// Creates a ring with every slot zeroed.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IN_RANGE;
        #[allow(clippy::declare_interior_mutable_const)]
        const EMPTY: AtomicU16 = AtomicU16::new(0);
        Self {
            samples: [EMPTY; N],
            index: AtomicUsize::new(0),
        }
    }

    /// Writes a sample over the oldest slot and advances the write index.
    pub fn push(&self, sample: u16) {
        let index = self.index.load(Ordering::Relaxed);
        self.samples[index].store(sample, Ordering::Relaxed);
        self.index.store((index + 1) % N, Ordering::Release);
    }

    /// Mean of all slots, rounded half up.
    ///
    /// Slots not yet written since startup count as zero, so callers should
    /// allow the ring to fill before trusting the value.
    pub fn mean(&self) -> u16 {
        let sum: u32 = self
            .samples
            .iter()
            .map(|slot| u32::from(slot.load(Ordering::Relaxed)))
            .sum();
        let count = N as u32;
        // At most u16::MAX by construction.
        ((2 * sum + count) / (2 * count)) as u16
    }
}

impl<const N: usize> Default for AltitudeSampler<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled<const N: usize>(value: u16) -> AltitudeSampler<N> {
        let sampler = AltitudeSampler::<N>::new();
        for _ in 0..N {
            sampler.push(value);
        }
        sampler
    }

    /// Test that a ring of constant samples averages to that sample.
    #[test]
    fn test_sampler_constant_mean() {
        for value in [0, 1, 1987, 4095, u16::MAX] {
            assert_eq!(
                value,
                filled::<SAMPLE_CAPACITY>(value).mean(),
                "Constant ring should average to {}",
                value
            );
        }
    }

    /// Test that an exact half rounds up rather than truncating.
    #[test]
    fn test_sampler_rounds_half_up() {
        let sampler = AltitudeSampler::<4>::new();
        for sample in [10, 10, 11, 11] {
            sampler.push(sample);
        }
        assert_eq!(11, sampler.mean(), "42 / 4 = 10.5 should round to 11.");

        let sampler = AltitudeSampler::<4>::new();
        for sample in [10, 10, 10, 11] {
            sampler.push(sample);
        }
        assert_eq!(10, sampler.mean(), "41 / 4 = 10.25 should round to 10.");

        let sampler = AltitudeSampler::<4>::new();
        for sample in [10, 11, 11, 11] {
            sampler.push(sample);
        }
        assert_eq!(11, sampler.mean(), "43 / 4 = 10.75 should round to 11.");
    }

    /// Test that the oldest sample is the one overwritten.
    #[test]
    fn test_sampler_overwrites_oldest() {
        let sampler = filled::<3>(30);
        sampler.push(0);
        assert_eq!(20, sampler.mean(), "One of three slots should be replaced.");
        sampler.push(0);
        sampler.push(0);
        assert_eq!(0, sampler.mean(), "Every slot should now be replaced.");
        sampler.push(90);
        assert_eq!(30, sampler.mean(), "The index should wrap to the start.");
    }

    /// Test that unwritten slots count as zero.
    #[test]
    fn test_sampler_partial_fill() {
        let sampler = AltitudeSampler::<SAMPLE_CAPACITY>::new();
        assert_eq!(0, sampler.mean());
        for _ in 0..30 {
            sampler.push(2000);
        }
        assert_eq!(1000, sampler.mean(), "Half a ring should average to half.");
    }

    /// Test that the largest ring averages full-scale samples exactly.
    #[test]
    fn test_sampler_max_capacity_full_scale() {
        let sampler = filled::<MAX_SAMPLE_CAPACITY>(u16::MAX);
        assert_eq!(u16::MAX, sampler.mean(), "Sum must not overflow at capacity.");
    }
}

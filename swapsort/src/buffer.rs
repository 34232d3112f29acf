use std::num::NonZeroUsize;

use rand::{rngs::OsRng, Rng};

use crate::error::BenchError;

/// An owned, contiguous, fixed-length buffer of signed 32-bit integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberBuffer {
    numbers: Box<[i32]>,
}

impl NumberBuffer {
    /// Allocate `count` integers and fill them from the operating system's random source.
    pub fn random(count: NonZeroUsize) -> Result<Self, BenchError> {
        Self::from_rng(count, &mut OsRng)
    }

    /// Allocate `count` integers and fill them from `rng`.
    ///
    /// Each integer is four random bytes, so values cover the whole `i32` range.
    pub fn from_rng<R: Rng + ?Sized>(count: NonZeroUsize, rng: &mut R) -> Result<Self, BenchError> {
        let mut numbers = Self::zeroed(count)?;
        rng.try_fill(&mut numbers[..]).map_err(|e| {
            BenchError::invalid_input(format!("Failed to read from the random source: {e}"))
        })?;
        log::debug!("filled {} numbers with random bytes", count);
        Ok(Self {
            numbers: numbers.into_boxed_slice(),
        })
    }

    /// Wrap existing values, e.g. to sort the same input with different swaps.
    pub fn from_values(values: Vec<i32>) -> Self {
        Self {
            numbers: values.into_boxed_slice(),
        }
    }

    fn zeroed(count: NonZeroUsize) -> Result<Vec<i32>, BenchError> {
        let count = count.get();
        let bytes = count
            .checked_mul(std::mem::size_of::<i32>())
            .filter(|b| *b <= isize::MAX as usize)
            .ok_or_else(|| BenchError::invalid_input(format!("{count} numbers do not fit in memory")))?;
        let mut numbers = Vec::new();
        numbers.try_reserve_exact(count).map_err(|e| {
            BenchError::invalid_input(format!("Failed to allocate {bytes} bytes: {e}"))
        })?;
        numbers.resize(count, 0);
        log::debug!("allocated {} bytes for {} numbers", bytes, count);
        Ok(numbers)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.numbers
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.numbers
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.numbers.into_vec()
    }
}

impl AsRef<[i32]> for NumberBuffer {
    fn as_ref(&self) -> &[i32] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;

    fn n(count: usize) -> NonZeroUsize {
        NonZeroUsize::new(count).unwrap()
    }

    #[test]
    fn random_buffer_has_requested_length() {
        let buffer = NumberBuffer::random(n(1000)).unwrap();
        assert_eq!(buffer.len(), 1000);
        // 1000 zeroes from a working random source is not going to happen
        assert!(buffer.as_slice().iter().any(|v| *v != 0));
    }

    #[test]
    fn random_values_span_the_signed_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        let buffer = NumberBuffer::from_rng(n(4096), &mut rng).unwrap();
        assert!(buffer.as_slice().iter().any(|v| *v < 0));
        assert!(buffer.as_slice().iter().any(|v| *v > 0));
    }

    #[test]
    fn seeded_fill_is_deterministic() {
        let a = NumberBuffer::from_rng(n(64), &mut SmallRng::seed_from_u64(7)).unwrap();
        let b = NumberBuffer::from_rng(n(64), &mut SmallRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_buffer_is_rejected() {
        let err = NumberBuffer::random(n(usize::MAX / 2)).unwrap_err();
        assert!(matches!(err, BenchError::InvalidInput(_)));
    }
}

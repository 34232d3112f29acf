use std::time::Duration;

use nix::time::{clock_gettime, ClockId};

use crate::error::BenchError;

/// CPU time consumed by this process so far.
///
/// Time the process spends descheduled is not counted.
pub fn process_cpu_time() -> Result<Duration, BenchError> {
    let now = clock_gettime(ClockId::CLOCK_PROCESS_CPUTIME_ID).map_err(|e| {
        BenchError::invalid_input(format!("Failed to read the process CPU-time clock: {e}"))
    })?;
    Ok(Duration::from(now))
}

/// Measures the process CPU time elapsed since [`CpuTimer::start`].
pub struct CpuTimer {
    start_time: Duration,
}

impl CpuTimer {
    pub fn start() -> Result<Self, BenchError> {
        Ok(Self {
            start_time: process_cpu_time()?,
        })
    }

    pub fn elapsed(&self) -> Result<Duration, BenchError> {
        Ok(process_cpu_time()?.saturating_sub(self.start_time))
    }

    /// Run `f` and return its result together with the CPU time it took.
    pub fn measure<R>(f: impl FnOnce() -> R) -> Result<(R, Duration), BenchError> {
        let timer = Self::start()?;
        let result = f();
        Ok((result, timer.elapsed()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_clock_is_monotonic() {
        let a = process_cpu_time().unwrap();
        let b = process_cpu_time().unwrap();
        assert!(b >= a);
    }

    #[test]
    fn busy_loop_consumes_cpu_time() {
        let (sum, elapsed) = CpuTimer::measure(|| {
            (0..2_000_000u64).fold(0u64, |acc, x| std::hint::black_box(acc.wrapping_add(x)))
        })
        .unwrap();
        assert_eq!(sum, 1_999_999_000_000);
        assert!(elapsed > Duration::ZERO);
    }
}

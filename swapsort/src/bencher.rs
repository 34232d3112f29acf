use std::{ffi::OsString, io::Write, marker::PhantomData, num::NonZeroUsize, time::Duration};

use clap::Parser;

use crate::{
    buffer::NumberBuffer,
    error::BenchError,
    sort::{bubble_sort, verify_sorted},
    swap::{SelectedSwap, Swap},
    timer::CpuTimer,
};

/// Whether this build checks the sorted order after timing.
pub const VERIFY: bool = cfg!(feature = "verify");

/// Bubble sort N random integers and print the CPU time it took, in nanoseconds.
#[derive(Parser, Debug)]
#[command(version)]
pub struct BenchArgs {
    /// Number of random integers to sort
    #[arg(value_name = "N", allow_hyphen_values = true)]
    pub count: String,
}

impl BenchArgs {
    /// The validated number count.
    pub fn count(&self) -> Result<NonZeroUsize, BenchError> {
        parse_count(&self.count)
    }
}

/// Parse a base-10 number count. The whole string must be consumed and the value must be positive.
pub fn parse_count(s: &str) -> Result<NonZeroUsize, BenchError> {
    let count = s
        .parse::<i64>()
        .map_err(|e| BenchError::invalid_input(format!("`{s}` is not a valid number count: {e}")))?;
    if count <= 0 {
        return Err(BenchError::invalid_input(format!(
            "Number count must be positive, got {count}"
        )));
    }
    usize::try_from(count)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| BenchError::invalid_input(format!("Number count {count} is too large")))
}

/// Result of one timed sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub count: usize,
    pub swap: &'static str,
    pub elapsed: Duration,
}

impl Measurement {
    pub fn nanos(&self) -> u128 {
        self.elapsed.as_nanos()
    }
}

/// One buffer, sorted once with the swap `S`.
pub struct SortBenchmark<S: Swap> {
    numbers: NumberBuffer,
    _swap: PhantomData<S>,
}

impl<S: Swap> SortBenchmark<S> {
    pub fn new(numbers: NumberBuffer) -> Self {
        Self {
            numbers,
            _swap: PhantomData,
        }
    }

    /// Sort the buffer. Only the sort itself is inside the timed region.
    pub fn run(&mut self) -> Result<Measurement, BenchError> {
        let numbers = self.numbers.as_mut_slice();
        let count = numbers.len();
        log::debug!("sorting {} numbers with {}", count, S::NAME);
        let ((), elapsed) = CpuTimer::measure(|| bubble_sort::<S>(numbers))?;
        log::debug!("sorted {} numbers in {:?} of CPU time", count, elapsed);
        Ok(Measurement {
            count,
            swap: S::NAME,
            elapsed,
        })
    }

    pub fn verify(&self) -> Result<(), BenchError> {
        verify_sorted(self.numbers.as_slice())?;
        log::debug!("verified {} numbers are sorted", self.numbers.len());
        Ok(())
    }

    pub fn numbers(&self) -> &[i32] {
        self.numbers.as_slice()
    }

    pub fn into_numbers(self) -> NumberBuffer {
        self.numbers
    }
}

/// Allocate and randomize `count` numbers, time the sort, print the elapsed
/// nanoseconds as one line to `out`, then optionally verify the order.
pub fn execute<S: Swap>(
    count: NonZeroUsize,
    verify: bool,
    out: &mut impl Write,
) -> Result<Measurement, BenchError> {
    let numbers = NumberBuffer::random(count)?;
    let mut benchmark = SortBenchmark::<S>::new(numbers);
    let measurement = benchmark.run()?;
    writeln!(out, "{}", measurement.nanos())?;
    out.flush()?;
    if verify {
        benchmark.verify()?;
    }
    Ok(measurement)
}

/// Run the benchmark for the given command line, using the swap and
/// verification mode this crate was built with.
pub fn run<I, T>(argv: I, out: &mut impl Write) -> Result<Measurement, BenchError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = BenchArgs::try_parse_from(argv)?;
    run_with_args(&args, out)
}

pub fn run_with_args(args: &BenchArgs, out: &mut impl Write) -> Result<Measurement, BenchError> {
    let count = args.count()?;
    execute::<SelectedSwap>(count, VERIFY, out)
}

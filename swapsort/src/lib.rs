//! Bubble sort timing experiment.
//!
//! Sorts N random `i32`s with a bubble sort whose swap primitive is chosen at
//! build time, and measures the process CPU time spent sorting.
//!
//! * default build: swap through a temporary ([`swap::TempSwap`])
//! * `--features xor-swap`: swap with three XORs ([`swap::XorSwap`])
//! * `--features verify`: check the order after the timed region
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use swapsort::{execute, swap::XorSwap};
//!
//! let mut out = Vec::new();
//! let count = NonZeroUsize::new(100).unwrap();
//! let measurement = execute::<XorSwap>(count, true, &mut out).unwrap();
//! assert_eq!(measurement.count, 100);
//! ```

mod bencher;
pub mod buffer;
pub mod error;
pub mod sort;
pub mod swap;
pub mod timer;

pub use bencher::{
    execute, parse_count, run, run_with_args, BenchArgs, Measurement, SortBenchmark, VERIFY,
};
pub use buffer::NumberBuffer;
pub use error::BenchError;

use std::error::Error;
use std::fmt::{Display, Formatter, Result};

/// Error type for a benchmark run.
///
/// `InvalidInput` is the caller's (or the machine's) fault: bad arguments,
/// an allocation that could not be satisfied, an unreadable random source or clock.
/// `InvariantViolation` means the sort itself produced a wrong answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenchError {
    /// Invalid command line input or an unusable environment.
    InvalidInput(String),

    /// The buffer is not in non-decreasing order after sorting.
    InvariantViolation {
        /// Index of the first element that is smaller than its predecessor.
        index: usize,
        /// Value at `index - 1`.
        previous: i32,
        /// Value at `index`.
        current: i32,
    },
}

impl BenchError {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Process exit status for this error.
    ///
    /// `2` matches the status clap uses for usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::InvariantViolation { .. } => 3,
        }
    }
}

impl Display for BenchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::InvariantViolation {
                index,
                previous,
                current,
            } => write!(
                f,
                "Buffer is not sorted: numbers[{}] = {} > numbers[{}] = {}",
                index - 1,
                previous,
                index,
                current
            ),
        }
    }
}

impl Error for BenchError {}

impl From<clap::Error> for BenchError {
    fn from(err: clap::Error) -> Self {
        Self::InvalidInput(err.to_string().trim_end().to_owned())
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        Self::InvalidInput(format!("I/O failure: {err}"))
    }
}

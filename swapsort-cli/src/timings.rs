//! Cached benchmark timings.
//!
//! Each build's timings are stored as a CSV file with the columns `build,count,trial,time`,
//! where `time` is the CPU time of one sort in nanoseconds.

use std::{
    collections::BTreeSet,
    fs::File,
    path::{Path, PathBuf},
};

use polars::prelude::*;

use crate::config::Profile;

pub const COLUMNS: [&str; 4] = ["build", "count", "trial", "time"];

/// One invocation of the benchmark binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRecord {
    pub build: String,
    pub count: usize,
    pub trial: usize,
    /// Nanoseconds of process CPU time
    pub time: u64,
}

/// Path of the cached timings of `build`, inside a profile directory.
pub fn cache_path(profile_dir: &Path, build: &str) -> PathBuf {
    profile_dir.join(format!("timings_{build}.csv"))
}

pub fn to_dataframe(records: &[TimingRecord]) -> anyhow::Result<DataFrame> {
    Ok(df!(
        "build" => records.iter().map(|r| r.build.as_str()).collect::<Vec<_>>(),
        "count" => records.iter().map(|r| r.count as u64).collect::<Vec<_>>(),
        "trial" => records.iter().map(|r| r.trial as u64).collect::<Vec<_>>(),
        "time" => records.iter().map(|r| r.time).collect::<Vec<_>>(),
    )?)
}

pub fn write_csv(path: &Path, records: &[TimingRecord]) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut df = to_dataframe(records)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Read a timings CSV. Columns other than `build` are unsigned integers, and no cell may be empty.
pub fn read_csv(path: &Path) -> anyhow::Result<DataFrame> {
    let df = CsvReader::from_path(path)?.has_header(true).finish()?;
    if df.get_column_names() != COLUMNS {
        anyhow::bail!(
            "Unexpected columns in {}: {:?}",
            path.display(),
            df.get_column_names()
        );
    }
    let df = df
        .lazy()
        .select([
            col("build").cast(DataType::String),
            col("count").strict_cast(DataType::UInt64),
            col("trial").strict_cast(DataType::UInt64),
            col("time").strict_cast(DataType::UInt64),
        ])
        .collect()?;
    if let Some(c) = df.get_columns().iter().find(|c| c.null_count() > 0) {
        anyhow::bail!("Missing `{}` values in {}", c.name(), path.display());
    }
    Ok(df)
}

/// Whether `df` holds exactly one timing of `build` for every (count, trial) pair of the profile.
pub fn covers_profile(df: &DataFrame, build: &str, profile: &Profile) -> anyhow::Result<bool> {
    let expected = profile
        .counts
        .counts()
        .into_iter()
        .flat_map(|c| (0..profile.trials).map(move |t| (c as u64, t as u64)))
        .collect::<BTreeSet<_>>();
    if df.height() != expected.len() {
        return Ok(false);
    }
    let builds = df.column("build")?.str()?;
    let counts = df.column("count")?.u64()?;
    let trials = df.column("trial")?.u64()?;
    let mut found = BTreeSet::new();
    for ((b, c), t) in builds.into_iter().zip(counts).zip(trials) {
        match (b, c, t) {
            (Some(b), Some(c), Some(t)) if b == build => found.insert((c, t)),
            _ => return Ok(false),
        };
    }
    Ok(found == expected)
}

/// Load the cached timings of `build` if they match the profile.
pub fn load_cached(path: &Path, build: &str, profile: &Profile) -> Option<DataFrame> {
    if !path.is_file() {
        return None;
    }
    match read_csv(path).and_then(|df| Ok((covers_profile(&df, build, profile)?, df))) {
        Ok((true, df)) => Some(df),
        Ok((false, _)) => {
            log::warn!(
                "Cached timings at {} do not match the profile, re-running",
                path.display()
            );
            None
        }
        Err(e) => {
            log::warn!("Ignoring unreadable cache {}: {}", path.display(), e);
            None
        }
    }
}

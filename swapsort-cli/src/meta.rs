//! Experiment run metadata.
//!
//! Each `cargo swapsort run` dumps a summary of the run to `target/swapsort/<PROFILE>/run.toml`:
//! the crate info, the profile used, and the system info at the time of the run.
//! `cargo swapsort report` prints it along with the results.

use std::path::{Path, PathBuf};

use cargo_metadata::MetadataCommand;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sysinfo::{CpuExt, System, SystemExt};

use crate::config::Profile;

/// The package that holds the benchmark binary and the experiment profiles.
pub const BENCH_PACKAGE: &str = "swapsort";

/// Crate metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CrateInfo {
    /// Crate name
    pub name: String,
    /// Path to the crate's Cargo.toml
    pub manifest_path: PathBuf,
    /// Path to the target directory
    pub target_dir: PathBuf,
}

impl CrateInfo {
    /// Locate the benchmark package in the current cargo workspace.
    /// Returns the crate info and the package's `metadata` table.
    pub fn load() -> anyhow::Result<(CrateInfo, serde_json::Value)> {
        let Ok(meta) = MetadataCommand::new().no_deps().exec() else {
            anyhow::bail!("Failed to get cargo metadata for the current directory");
        };
        let Some(pkg) = meta.packages.iter().find(|p| p.name == BENCH_PACKAGE) else {
            anyhow::bail!("Package `{}` not found in the current workspace", BENCH_PACKAGE);
        };
        let crate_info = CrateInfo {
            name: pkg.name.clone(),
            manifest_path: pkg.manifest_path.as_std_path().to_owned(),
            target_dir: meta.target_directory.as_std_path().to_owned(),
        };
        Ok((crate_info, pkg.metadata.clone()))
    }

    /// Directory holding the cached timings and `run.toml` of a profile.
    pub fn profile_dir(&self, profile: &str) -> PathBuf {
        self.target_dir.join("swapsort").join(profile)
    }

    /// Cargo target directory for one build, so that builds with different features do not
    /// overwrite each other's binaries.
    pub fn build_dir(&self, build: &str) -> PathBuf {
        self.target_dir.join("swapsort").join("builds").join(build)
    }
}

/// The parts of the machine state that affect a CPU-time measurement.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SystemInfo {
    /// Operating system name and version
    pub os: String,
    /// CPU model
    #[serde(rename = "cpu-model")]
    pub cpu_model: String,
    /// Total memory size in bytes
    pub memory_size: usize,
    /// The rustc that compiles the benchmark builds
    pub rustc: String,
    /// (*Linux only*) Users with a login session
    #[serde(default)]
    pub users: Vec<String>,
    /// (*Linux only*) The scaling governor of each CPU core
    #[serde(default, rename = "scaling-governor")]
    pub scaling_governor: Vec<String>,
}

impl SystemInfo {
    const UNKNOWN: &'static str = "<unknown>";

    /// Snapshot the current machine.
    pub fn current() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();
        let rustc = rustc_version::version_meta()
            .map(|v| format!("{} ({:?})", v.semver, v.channel).to_lowercase())
            .unwrap_or_else(|_| Self::UNKNOWN.to_owned());
        Self {
            os: sys
                .long_os_version()
                .unwrap_or_else(|| Self::UNKNOWN.to_owned()),
            cpu_model: sys
                .cpus()
                .first()
                .map(|c| c.brand().trim().to_owned())
                .unwrap_or_else(|| Self::UNKNOWN.to_owned()),
            memory_size: sys.total_memory() as usize,
            rustc,
            users: login_users(),
            scaling_governor: scaling_governors(sys.cpus().len()),
        }
    }
}

/// Distinct user names reported by `who`.
#[cfg(target_os = "linux")]
fn login_users() -> Vec<String> {
    let Ok(out) = std::process::Command::new("who").output() else {
        log::warn!("Failed to run `who`, skipping the logged-in users check");
        return vec![];
    };
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_owned)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(not(target_os = "linux"))]
fn login_users() -> Vec<String> {
    vec![]
}

/// The cpufreq governor of cores `0..cpus`. Cores without cpufreq are skipped.
#[cfg(target_os = "linux")]
fn scaling_governors(cpus: usize) -> Vec<String> {
    (0..cpus)
        .filter_map(|i| {
            std::fs::read_to_string(format!(
                "/sys/devices/system/cpu/cpu{i}/cpufreq/scaling_governor"
            ))
            .ok()
        })
        .map(|g| g.trim().to_owned())
        .collect()
}

#[cfg(not(target_os = "linux"))]
fn scaling_governors(_cpus: usize) -> Vec<String> {
    vec![]
}

/// The experiment run metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunInfo {
    /// Profile name
    #[serde(rename = "profile-name")]
    pub profile_name: String,
    /// Run start time
    #[serde(rename = "start-time-utc")]
    pub start_timestamp_utc: i64,
    /// Run finish time
    #[serde(rename = "finish-time-utc")]
    pub finish_timestamp_utc: Option<i64>,
    /// The crate info
    #[serde(rename = "crate")]
    pub crate_info: CrateInfo,
    /// Current system information
    pub system: SystemInfo,
    /// The enabled profile
    pub profile: Profile,
}

impl RunInfo {
    pub fn new(
        crate_info: CrateInfo,
        profile_name: &str,
        profile: Profile,
        start_time: DateTime<Local>,
    ) -> Self {
        Self {
            profile_name: profile_name.to_owned(),
            start_timestamp_utc: start_time.to_utc().timestamp(),
            finish_timestamp_utc: None,
            crate_info,
            system: SystemInfo::current(),
            profile,
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}

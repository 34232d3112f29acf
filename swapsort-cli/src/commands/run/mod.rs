use std::path::Path;

use chrono::Local;
use clap::Parser;

use crate::{
    config::{Profile, SwapsortConfig},
    meta::{CrateInfo, RunInfo},
};

mod checks;
mod runner;

pub use runner::BenchRunner;

/// Build every swap variant and time it over the profile's number counts
#[derive(Parser)]
pub struct RunArgs {
    #[arg(long, default_value = "default")]
    /// Experiment profile
    pub profile: String,
    #[arg(short = 't', long)]
    /// Number of trials per number count
    pub trials: Option<usize>,
    #[arg(long, default_value = "false")]
    /// Ignore cached timings and measure everything again
    pub force: bool,
    #[arg(long, default_value = "false")]
    /// (Linux only) Allow benchmarking even when multiple users are logged in
    pub allow_multi_user: bool,
    /// (Linux only) Allow any scaling governor value, instead of only `performance`
    #[arg(long, default_value = "false")]
    pub allow_any_scaling_governor: bool,
}

impl RunArgs {
    fn load_profile(&self, metadata: &serde_json::Value) -> anyhow::Result<Profile> {
        let config = SwapsortConfig::from_package_metadata(metadata)?;
        let mut profile = config.profile(&self.profile)?;
        // Overwrite trials
        if let Some(trials) = self.trials {
            if trials == 0 {
                anyhow::bail!("At least one trial is required");
            }
            profile.trials = trials;
        }
        Ok(profile)
    }

    /// Dump metadata before running the builds.
    fn dump_metadata(
        &self,
        crate_info: &CrateInfo,
        profile: &Profile,
        profile_dir: &Path,
    ) -> anyhow::Result<RunInfo> {
        std::fs::create_dir_all(profile_dir)?;
        let run_info = RunInfo::new(
            crate_info.clone(),
            &self.profile,
            profile.clone(),
            Local::now(),
        );
        run_info.save(&profile_dir.join("run.toml"))?;
        Ok(run_info)
    }

    fn update_metadata_on_finish(&self, profile_dir: &Path, mut meta: RunInfo) -> anyhow::Result<()> {
        assert!(meta.finish_timestamp_utc.is_none());
        meta.finish_timestamp_utc = Some(Local::now().to_utc().timestamp());
        meta.save(&profile_dir.join("run.toml"))?;
        Ok(())
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let (crate_info, metadata) = CrateInfo::load()?;
        let profile = self.load_profile(&metadata)?;
        let profile_dir = crate_info.profile_dir(&self.profile);
        let run_info = self.dump_metadata(&crate_info, &profile, &profile_dir)?;
        // Pre-benchmarking checks
        checks::check(self, &run_info)?;
        // Run benchmarks
        let mut runner = BenchRunner::new(&run_info, &profile_dir, self.force);
        runner.run()?;
        self.update_metadata_on_finish(&profile_dir, run_info)?;
        Ok(())
    }
}

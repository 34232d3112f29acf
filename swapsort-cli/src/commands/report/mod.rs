use chrono::{DateTime, Utc};
use clap::Parser;
use polars::prelude::DataFrame;

use crate::{
    config::{Profile, SwapsortConfig},
    meta::{CrateInfo, RunInfo},
    timings,
    utils::md::MarkdownPrinter,
};

pub mod data;

/// Summarize the cached timings as median and inter-quartile range per build and count
#[derive(Parser)]
pub struct ReportArgs {
    /// The profile to report.
    #[arg(long, default_value = "default")]
    pub profile: String,
    /// Normalize the summary to a baseline build.
    #[arg(long, default_value = "false")]
    pub norm: bool,
    /// The baseline build name to normalize to.
    /// If not specified, the one specified in the profile will be used.
    #[arg(long)]
    pub baseline: Option<String>,
}

fn fmt_timestamp(t: i64) -> String {
    DateTime::<Utc>::from_timestamp(t, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_owned())
}

/// A profile's cached timings, with the run metadata and profile they were measured with.
pub(crate) struct ProfileTimings {
    pub crate_info: CrateInfo,
    pub run_info: Option<RunInfo>,
    pub profile: Profile,
    pub raw: DataFrame,
}

impl ProfileTimings {
    pub fn load(profile_name: &str) -> anyhow::Result<Self> {
        let (crate_info, metadata) = CrateInfo::load()?;
        let profile_dir = crate_info.profile_dir(profile_name);
        // Prefer the profile the timings were measured with
        let run_info = RunInfo::load(&profile_dir.join("run.toml")).ok();
        let profile = match &run_info {
            Some(run) => run.profile.clone(),
            None => SwapsortConfig::from_package_metadata(&metadata)?.profile(profile_name)?,
        };
        let mut csvs = vec![];
        for build in profile.builds.keys() {
            let csv = timings::cache_path(&profile_dir, build);
            if !csv.exists() {
                anyhow::bail!(
                    "Timings of build `{}` not found: {}. Please run `cargo swapsort run` first.",
                    build,
                    csv.display()
                );
            }
            csvs.push(csv);
        }
        let raw = data::get_all_data(&csvs)?;
        Ok(Self {
            crate_info,
            run_info,
            profile,
            raw,
        })
    }
}

impl ReportArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let ProfileTimings {
            crate_info,
            run_info,
            profile,
            raw,
        } = ProfileTimings::load(&self.profile)?;
        let baseline = if self.norm {
            let b = self.baseline.clone().or(profile.baseline.clone());
            if b.is_none() {
                anyhow::bail!("No baseline specified");
            }
            b
        } else {
            None
        };
        let per_count = data::median_over_trials(&raw)?;
        let summary = data::summary_over_counts(&per_count)?;
        // Print results
        let mut printer = MarkdownPrinter::new();
        printer.add(format!(
            "# [{}] Swap Benchmark Results\n\n",
            crate_info.name
        ));
        printer.add(format!("* Profile: `{}`\n", self.profile));
        if let Some(run) = &run_info {
            printer.add(format!(
                "* Start Time (UTC): `{}`\n",
                fmt_timestamp(run.start_timestamp_utc)
            ));
            let finish = run.finish_timestamp_utc.map(fmt_timestamp);
            printer.add(format!(
                "* Finish Time (UTC): `{}`\n",
                finish.as_deref().unwrap_or("N/A")
            ));
            printer.add(format!("* OS: `{}`\n", run.system.os));
            printer.add(format!("* CPU: `{}`\n", run.system.cpu_model));
            printer.add(format!("* Memory: `{} GB`\n", run.system.memory_size >> 30));
            printer.add(format!("* Rustc: `{}`\n", run.system.rustc));
            if !run.system.scaling_governor.is_empty() {
                let mut governors = run.system.scaling_governor.clone();
                governors.sort();
                governors.dedup();
                printer.add(format!("* Scaling Governor: `{}`\n", governors.join(", ")));
            }
        }
        printer.add("\n## CPU Time Per Count (ns)\n\n");
        printer.add_dataframe(&per_count);
        printer.add("\n## Summary Over All Counts (ns)\n\n");
        printer.add_dataframe(&summary);
        if let Some(baseline) = baseline {
            printer.add(format!("\n## Normalized to `{}`\n\n", baseline));
            printer.add_dataframe(&data::normalize(&summary, &baseline)?);
        }
        printer.dump();
        Ok(())
    }
}

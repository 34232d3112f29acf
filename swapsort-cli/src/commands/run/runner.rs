use std::{
    collections::HashMap,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Output},
};

use colored::Colorize;

use crate::{
    config::BuildConfig,
    meta::{RunInfo, BENCH_PACKAGE},
    print_md,
    timings::{self, TimingRecord},
};

/// Builds the benchmark binary once per build config, and times it over all counts and trials.
#[derive(Debug)]
pub struct BenchRunner<'a> {
    run: &'a RunInfo,
    /// Where the timing caches of this profile live
    profile_dir: PathBuf,
    /// Re-measure even when a valid cache exists
    force: bool,
}

impl<'a> BenchRunner<'a> {
    pub const MAX_SUPPORTED_BUILDS: usize = 52;
    const KEYS: &'static str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// The letter marking build `index` in progress lines and plots.
    pub fn key(index: usize) -> Option<char> {
        Self::KEYS.chars().nth(index)
    }

    pub fn new(run: &'a RunInfo, profile_dir: &Path, force: bool) -> Self {
        Self {
            run,
            profile_dir: profile_dir.to_owned(),
            force,
        }
    }

    fn build_envs(&self, build: &BuildConfig) -> HashMap<String, String> {
        let mut envs = self.run.profile.env.clone();
        for (k, v) in &build.env {
            envs.insert(k.clone(), v.clone());
        }
        envs
    }

    /// Compile the benchmark binary with the build's features, into its own target directory.
    fn compile(&self, build_name: &str, build: &BuildConfig) -> anyhow::Result<PathBuf> {
        let target_dir = self.run.crate_info.build_dir(build_name);
        let mut cmd = Command::new("cargo");
        cmd.args(["build", "--release", "--package", BENCH_PACKAGE])
            .args(["--bin", BENCH_PACKAGE])
            .arg("--manifest-path")
            .arg(&self.run.crate_info.manifest_path)
            .arg("--target-dir")
            .arg(&target_dir);
        if !build.features.is_empty() {
            cmd.arg("--features").arg(build.features.join(","));
        }
        if !build.default_features {
            cmd.arg("--no-default-features");
        }
        log::info!("Compiling build `{}`: {:?}", build_name, cmd);
        let out = cmd.output()?;
        if !out.status.success() {
            anyhow::bail!(
                "Failed to compile build `{}`:\n{}",
                build_name,
                String::from_utf8_lossy(&out.stderr)
            );
        }
        let binary = target_dir
            .join("release")
            .join(format!("{}{}", BENCH_PACKAGE, std::env::consts::EXE_SUFFIX));
        if !binary.is_file() {
            anyhow::bail!("Benchmark binary not found: {}", binary.display());
        }
        Ok(binary)
    }

    /// Invoke the benchmark binary once and parse the nanoseconds it prints.
    fn run_one(
        binary: &Path,
        count: usize,
        envs: &HashMap<String, String>,
    ) -> anyhow::Result<u64> {
        let out = Command::new(binary)
            .arg(count.to_string())
            .envs(envs)
            .output()?;
        parse_timing(&out)
            .map_err(|e| anyhow::anyhow!("`{} {}`: {}", binary.display(), count, e))
    }

    /// Time one build over all counts and trials.
    fn run_build(
        &self,
        key: &str,
        build_name: &str,
        build: &BuildConfig,
    ) -> anyhow::Result<Vec<TimingRecord>> {
        let binary = self.compile(build_name, build)?;
        let envs = self.build_envs(build);
        let profile = &self.run.profile;
        let mut records = vec![];
        print!("{} ", build_name.blue().bold());
        io::stdout().flush()?;
        for count in profile.counts.counts() {
            print!("{}", progress_label(count).bold().blue().italic());
            io::stdout().flush()?;
            for trial in 0..profile.trials {
                match Self::run_one(&binary, count, &envs) {
                    Ok(time) => {
                        print!("{}", key.green());
                        records.push(TimingRecord {
                            build: build_name.to_owned(),
                            count,
                            trial,
                            time,
                        });
                    }
                    Err(e) => {
                        println!("{}", "✘".red());
                        return Err(e);
                    }
                }
                io::stdout().flush()?;
            }
        }
        println!();
        Ok(records)
    }

    fn print_before_run(&self) {
        let profile = &self.run.profile;
        print_md!("# {}\n\n", self.run.profile_name);
        print_md!("* results: `{}`", self.profile_dir.display());
        print_md!("* builds: `{}`", profile.builds.len());
        print_md!(
            "* counts: `{}..{}` step `{}`",
            profile.counts.start,
            profile.counts.end,
            profile.counts.step
        );
        print_md!("* trials: `{}`", profile.trials);
        println!();
        println!("{}\n", "Running Benchmarks...".blue());
    }

    fn print_after_run(&self) {
        println!("\n{}\n", "✔ Benchmarking Finished.".green());
        print_md!("Timings cached at:\n");
        print_md!("* `{}`\n\n", self.profile_dir.display());
        print_md!("Please run `cargo swapsort report` or `cargo swapsort plot` to view results.\n");
    }

    /// Measure all builds, one benchmark process at a time.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.print_before_run();
        for (index, (build_name, build)) in self.run.profile.builds.iter().enumerate() {
            let Some(key) = Self::key(index) else {
                anyhow::bail!("Too many builds!");
            };
            let key = key.to_string();
            let cache = timings::cache_path(&self.profile_dir, build_name);
            if !self.force {
                if let Some(cached) = timings::load_cached(&cache, build_name, &self.run.profile) {
                    println!(
                        "{} {}",
                        build_name.blue().bold(),
                        format!("found {} cached timings at {}", cached.height(), cache.display())
                            .italic()
                    );
                    continue;
                }
            }
            let records = self.run_build(&key, build_name, build)?;
            timings::write_csv(&cache, &records)?;
            log::info!("Saved {} timings to {}", records.len(), cache.display());
        }
        self.print_after_run();
        Ok(())
    }
}

/// Marks the start of a count in the progress line, ahead of one key per trial.
fn progress_label(count: usize) -> String {
    format!(" {count}:")
}

/// The nanoseconds printed by one successful benchmark invocation.
fn parse_timing(out: &Output) -> anyhow::Result<u64> {
    if !out.status.success() {
        anyhow::bail!(
            "failed with {}:\n{}",
            out.status,
            String::from_utf8_lossy(&out.stderr)
        );
    }
    let stdout = String::from_utf8_lossy(&out.stdout);
    let mut lines = stdout.lines();
    match (lines.next().map(|l| l.trim().parse::<u64>()), lines.next()) {
        (Some(Ok(time)), None) => Ok(time),
        _ => anyhow::bail!("expected one line of nanoseconds, got {:?}", stdout),
    }
}

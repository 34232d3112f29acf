use std::collections::BTreeMap;

use colored::Colorize;

use crate::{commands::run::RunArgs, meta::RunInfo};

use super::runner::BenchRunner;

fn dump_warnings(title: &str, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!("{}\n", title.bold().black().on_red());
    for msg in warnings {
        eprintln!("{} {}", "•".bright_red(), msg.red());
    }
    eprintln!();
}

/// Validates a run before any build is compiled. Fatal problems are errors, the rest are collected
/// as warnings.
struct PreBenchmarkingChecker<'a> {
    warnings: Vec<String>,
    allow_multi_user: bool,
    allow_any_scaling_governor: bool,
    run: &'a RunInfo,
}

impl<'a> PreBenchmarkingChecker<'a> {
    fn new(run: &'a RunInfo, allow_multi_user: bool, allow_any_scaling_governor: bool) -> Self {
        Self {
            warnings: Vec::new(),
            allow_multi_user,
            allow_any_scaling_governor,
            run,
        }
    }

    fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_owned());
    }

    /// Downgrade `msg` to a warning when the matching `--allow-*` flag is set.
    fn fail_unless(&mut self, allowed: bool, msg: String) -> anyhow::Result<()> {
        if !allowed {
            anyhow::bail!("{}", msg);
        }
        self.warn(msg);
        Ok(())
    }

    fn check_count_configs(&mut self) -> anyhow::Result<()> {
        if self.run.profile.counts.counts().is_empty() {
            anyhow::bail!("No number counts in the profile.");
        }
        if self.run.profile.trials < 3 {
            self.warn(format!(
                "Only {} trial(s) per count. Medians and quartiles need more.",
                self.run.profile.trials
            ));
        }
        Ok(())
    }

    fn check_build_configs(&mut self) -> anyhow::Result<()> {
        let run = self.run;
        let builds = &run.profile.builds;
        match builds.len() {
            0 => anyhow::bail!("No builds found in the profile."),
            1 => self.warn("Only one build: there is nothing to compare against."),
            n if n > BenchRunner::MAX_SUPPORTED_BUILDS => anyhow::bail!(
                "Too many builds. Maximum supported builds is {}.",
                BenchRunner::MAX_SUPPORTED_BUILDS
            ),
            _ => {}
        }
        let names = builds.keys().collect::<Vec<_>>();
        for (i, n1) in names.iter().enumerate() {
            for n2 in &names[i + 1..] {
                if builds[*n1] == builds[*n2] {
                    self.warn(format!(
                        "Builds {} and {} are identical, they measure the same swap.",
                        n1.italic(),
                        n2.italic(),
                    ));
                }
            }
        }
        if let Some(baseline) = &run.profile.baseline {
            if !builds.contains_key(baseline) {
                anyhow::bail!(
                    "Baseline `{}` is not an existing build name.",
                    baseline.italic(),
                );
            }
        }
        Ok(())
    }

    /// Other logged-in users and CPU frequency scaling both perturb CPU time.
    /// The snapshot is empty outside Linux, so nothing is reported there.
    fn check_machine(&mut self) -> anyhow::Result<()> {
        let run = self.run;
        let sys = &run.system;
        if sys.users.len() > 1 {
            let msg = format!(
                "{} users are logged in ({}). Their processes compete for the CPU.",
                sys.users.len(),
                sys.users.join(", ").italic()
            );
            self.fail_unless(self.allow_multi_user, msg)?;
        }
        let mut governors = BTreeMap::<&str, usize>::new();
        for g in &sys.scaling_governor {
            *governors.entry(g.as_str()).or_default() += 1;
        }
        if governors.keys().any(|g| *g != "performance") {
            let cores = governors
                .iter()
                .map(|(g, n)| format!("{} × {}", g, n))
                .collect::<Vec<_>>()
                .join(", ");
            let msg = format!(
                "CPU frequency is not pinned: scaling governors are {}. Set them to `performance`.",
                cores.italic()
            );
            self.fail_unless(self.allow_any_scaling_governor, msg)?;
        }
        Ok(())
    }

    fn check(mut self) -> anyhow::Result<Vec<String>> {
        self.check_count_configs()?;
        self.check_build_configs()?;
        self.check_machine()?;
        Ok(self.warnings)
    }
}

pub fn check(args: &RunArgs, run: &RunInfo) -> anyhow::Result<()> {
    let warnings = PreBenchmarkingChecker::new(
        run,
        args.allow_multi_user,
        args.allow_any_scaling_governor,
    )
    .check()?;
    dump_warnings("WARNINGS", &warnings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        config::{BuildConfig, Profile},
        meta::{CrateInfo, SystemInfo},
    };

    fn quiet_machine() -> SystemInfo {
        SystemInfo {
            users: vec!["bench".to_owned()],
            scaling_governor: vec!["performance".to_owned(); 4],
            ..Default::default()
        }
    }

    fn run_info(profile: Profile, system: SystemInfo) -> RunInfo {
        RunInfo {
            profile_name: "default".to_owned(),
            start_timestamp_utc: 0,
            finish_timestamp_utc: None,
            crate_info: CrateInfo {
                name: "swapsort".to_owned(),
                manifest_path: "swapsort/Cargo.toml".into(),
                target_dir: "target".into(),
            },
            system,
            profile,
        }
    }

    fn check(run: &RunInfo) -> anyhow::Result<Vec<String>> {
        PreBenchmarkingChecker::new(run, false, false).check()
    }

    #[test]
    fn test_default_profile_on_quiet_machine_passes() -> anyhow::Result<()> {
        let run = run_info(Profile::default(), quiet_machine());
        assert!(check(&run)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_build_config_errors() {
        let no_builds = Profile {
            builds: BTreeMap::new(),
            baseline: None,
            ..Default::default()
        };
        assert!(check(&run_info(no_builds, quiet_machine())).is_err());
        let bad_baseline = Profile {
            baseline: Some("quick_swap".to_owned()),
            ..Default::default()
        };
        let err = check(&run_info(bad_baseline, quiet_machine())).unwrap_err();
        assert!(err.to_string().contains("quick_swap"));
    }

    #[test]
    fn test_build_config_warnings() -> anyhow::Result<()> {
        let identical = Profile {
            builds: [
                ("a".to_owned(), BuildConfig::default()),
                ("b".to_owned(), BuildConfig::default()),
            ]
            .into_iter()
            .collect(),
            baseline: None,
            ..Default::default()
        };
        let warnings = check(&run_info(identical, quiet_machine()))?;
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("identical"));

        let single = Profile {
            builds: [("a".to_owned(), BuildConfig::default())].into_iter().collect(),
            baseline: Some("a".to_owned()),
            trials: 1,
            ..Default::default()
        };
        assert_eq!(check(&run_info(single, quiet_machine()))?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_multiple_users_need_permission() -> anyhow::Result<()> {
        let system = SystemInfo {
            users: vec!["bench".to_owned(), "alice".to_owned()],
            ..quiet_machine()
        };
        let run = run_info(Profile::default(), system);
        assert!(check(&run).is_err());
        let warnings = PreBenchmarkingChecker::new(&run, true, false).check()?;
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("2 users"));
        Ok(())
    }

    #[test]
    fn test_scaling_governor_needs_permission() -> anyhow::Result<()> {
        let system = SystemInfo {
            scaling_governor: vec![
                "performance".to_owned(),
                "powersave".to_owned(),
                "powersave".to_owned(),
            ],
            ..quiet_machine()
        };
        let run = run_info(Profile::default(), system);
        let err = check(&run).unwrap_err();
        assert!(err.to_string().contains("powersave"));
        assert!(PreBenchmarkingChecker::new(&run, false, true).check()?.len() == 1);
        // The users flag does not cover the governor
        assert!(PreBenchmarkingChecker::new(&run, true, false).check().is_err());
        Ok(())
    }
}

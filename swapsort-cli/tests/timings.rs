use swapsort_cli::{
    config::{CountRange, Profile},
    timings::{self, TimingRecord},
};
use tempdir::TempDir;

fn profile() -> Profile {
    Profile {
        counts: CountRange {
            start: 100,
            end: 300,
            step: 100,
        },
        trials: 2,
        ..Default::default()
    }
}

fn records(build: &str, profile: &Profile) -> Vec<TimingRecord> {
    let mut records = vec![];
    for count in profile.counts.counts() {
        for trial in 0..profile.trials {
            records.push(TimingRecord {
                build: build.to_owned(),
                count,
                trial,
                time: (count * 1000 + trial) as u64,
            });
        }
    }
    records
}

#[test]
fn test_cache_round_trips_through_polars() -> anyhow::Result<()> {
    let dir = TempDir::new("swapsort")?;
    let path = timings::cache_path(dir.path(), "xor_swap");
    let all = records("xor_swap", &profile());
    timings::write_csv(&path, &all)?;
    let header = std::fs::read_to_string(&path)?;
    assert_eq!(header.lines().next(), Some("build,count,trial,time"));
    let df = timings::read_csv(&path)?;
    assert!(df.equals(&timings::to_dataframe(&all)?));
    Ok(())
}

#[test]
fn test_cache_is_reused_only_when_complete() -> anyhow::Result<()> {
    let dir = TempDir::new("swapsort")?;
    let profile = profile();
    let path = timings::cache_path(dir.path(), "xor_swap");
    assert!(path.ends_with("timings_xor_swap.csv"));
    assert!(timings::load_cached(&path, "xor_swap", &profile).is_none());

    let all = records("xor_swap", &profile);
    timings::write_csv(&path, &all)?;
    let cached = timings::load_cached(&path, "xor_swap", &profile);
    assert_eq!(cached.map(|df| df.height()), Some(all.len()));
    // Measured for another build
    assert!(timings::load_cached(&path, "temp_swap", &profile).is_none());
    // More trials requested than cached
    let more_trials = Profile {
        trials: 3,
        ..profile.clone()
    };
    assert!(timings::load_cached(&path, "xor_swap", &more_trials).is_none());
    // A missing row
    timings::write_csv(&path, &all[1..])?;
    assert!(timings::load_cached(&path, "xor_swap", &profile).is_none());
    // A duplicated row in place of a missing one
    let mut duplicated = all.clone();
    duplicated[0] = duplicated[1].clone();
    timings::write_csv(&path, &duplicated)?;
    assert!(timings::load_cached(&path, "xor_swap", &profile).is_none());
    Ok(())
}

#[test]
fn test_corrupted_cache_is_ignored() -> anyhow::Result<()> {
    let dir = TempDir::new("swapsort")?;
    let profile = profile();
    let path = timings::cache_path(dir.path(), "temp_swap");
    std::fs::write(&path, "build,count,trial,time\ntemp_swap,100,0,\n")?;
    assert!(timings::read_csv(&path).is_err());
    assert!(timings::load_cached(&path, "temp_swap", &profile).is_none());
    std::fs::write(&path, "build,count,trial,time\ntemp_swap,100,0,fast\n")?;
    assert!(timings::read_csv(&path).is_err());
    std::fs::write(&path, "count,time\n100,5\n")?;
    assert!(timings::read_csv(&path).is_err());
    Ok(())
}

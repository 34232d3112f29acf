use serde_json::json;
use swapsort_cli::config::{CountRange, SwapsortConfig};

#[test]
fn test_missing_section_uses_default_profile() -> anyhow::Result<()> {
    let config = SwapsortConfig::from_package_metadata(&serde_json::Value::Null)?;
    let profile = config.profile("default")?;
    assert_eq!(profile.trials, 5);
    assert_eq!(
        profile.counts.counts(),
        vec![40960, 45056, 49152, 53248, 57344]
    );
    assert_eq!(
        profile.builds.keys().cloned().collect::<Vec<_>>(),
        vec!["temp_swap", "xor_swap"]
    );
    assert_eq!(profile.builds["xor_swap"].features, vec!["xor-swap"]);
    assert!(profile.builds["temp_swap"].default_features);
    Ok(())
}

#[test]
fn test_profile_from_metadata() -> anyhow::Result<()> {
    let metadata = json!({
        "swapsort": {
            "profiles": {
                "smoke": {
                    "trials": 3,
                    "counts": { "start": 1024, "end": 4097, "step": 1024 },
                    "baseline": "a",
                    "env": { "RUST_LOG": "debug" },
                    "builds": {
                        "a": { "features": ["verify"] },
                        "b": { "features": ["xor-swap", "verify"], "default-features": false }
                    }
                }
            }
        }
    });
    let config = SwapsortConfig::from_package_metadata(&metadata)?;
    assert!(config.profile("default").is_err());
    let profile = config.profile("smoke")?;
    assert_eq!(profile.trials, 3);
    assert_eq!(profile.counts.counts(), vec![1024, 2048, 3072, 4096]);
    assert_eq!(profile.baseline.as_deref(), Some("a"));
    assert_eq!(profile.env["RUST_LOG"], "debug");
    assert!(!profile.builds["b"].default_features);
    Ok(())
}

#[test]
fn test_omitted_fields_take_defaults() -> anyhow::Result<()> {
    let metadata = json!({ "swapsort": { "profiles": { "default": {} } } });
    let profile = SwapsortConfig::from_package_metadata(&metadata)?.profile("default")?;
    assert_eq!(profile.trials, 5);
    assert_eq!(profile.counts, CountRange::default());
    assert_eq!(profile.builds.len(), 2);
    assert!(profile.baseline.is_none());
    Ok(())
}

#[test]
fn test_invalid_profiles_are_rejected() -> anyhow::Result<()> {
    for counts in [
        json!({ "start": 0, "end": 10, "step": 1 }),
        json!({ "start": 10, "end": 10, "step": 1 }),
        json!({ "start": 1, "end": 10, "step": 0 }),
    ] {
        let metadata = json!({ "swapsort": { "profiles": { "p": { "counts": counts } } } });
        let config = SwapsortConfig::from_package_metadata(&metadata)?;
        assert!(config.profile("p").is_err());
    }
    let metadata = json!({ "swapsort": { "profiles": { "p": { "trials": 0 } } } });
    assert!(SwapsortConfig::from_package_metadata(&metadata)?
        .profile("p")
        .is_err());
    Ok(())
}

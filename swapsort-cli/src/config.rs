//! The swapsort experiment configs
//!
//! This should be placed in the `[package.metadata.swapsort]` section of the `swapsort` crate's `Cargo.toml`.
//!
//! If the section is not present, a default config is used. It contains a `default` profile that
//! measures the two swap builds `temp_swap` and `xor_swap` over 40960..61440 numbers (step 4096), 5 trials each.
//!
//! # Example:
//!
//! ```toml
//! [package.metadata.swapsort.profiles.default]
//! trials = 5 # Optional. Default to 5
//! counts = { start = 40960, end = 61440, step = 4096 } # `end` is exclusive
//! baseline = "temp_swap" # Optional. Only used for data reporting
//! # Additional environment variables to set for all builds
//! env = { RUST_LOG = "debug" }
//!
//! [package.metadata.swapsort.profiles.default.builds]
//! # Default cargo features: the temporary-variable swap
//! temp_swap = {}
//! # XOR swap, with the ordering check enabled
//! xor_swap = { features = ["xor-swap", "verify"] }
//! ```
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// The swapsort configuration.
#[derive(Serialize, Deserialize, Debug)]
pub struct SwapsortConfig {
    /// Evaluation profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl SwapsortConfig {
    /// Read the config from a package's `metadata` table, as reported by `cargo metadata`.
    /// If the `swapsort` section is not present, the default config is returned.
    pub fn from_package_metadata(metadata: &serde_json::Value) -> anyhow::Result<SwapsortConfig> {
        let mut config = match metadata.get("swapsort") {
            Some(v) => serde_json::from_value::<SwapsortConfig>(v.clone())?,
            None => SwapsortConfig::default(),
        };
        if config.profiles.is_empty() {
            config
                .profiles
                .insert("default".to_owned(), Default::default());
        }
        Ok(config)
    }

    /// Look up a profile by name and validate it.
    pub fn profile(&self, name: &str) -> anyhow::Result<Profile> {
        let Some(profile) = self.profiles.get(name).cloned() else {
            anyhow::bail!("Could not find swapsort profile `{}`", name);
        };
        profile.counts.validate()?;
        if profile.trials == 0 {
            anyhow::bail!("Profile `{}` must run at least one trial", name);
        }
        Ok(profile)
    }
}

impl Default for SwapsortConfig {
    fn default() -> Self {
        Self {
            profiles: [("default".to_owned(), Default::default())]
                .into_iter()
                .collect(),
        }
    }
}

/// A range of number counts: `start`, `start + step`, ... up to but excluding `end`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CountRange {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl CountRange {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.start == 0 {
            anyhow::bail!("Number counts must start above zero");
        }
        if self.step == 0 {
            anyhow::bail!("Number count step must be positive");
        }
        if self.start >= self.end {
            anyhow::bail!("Number count range {}..{} is empty", self.start, self.end);
        }
        Ok(())
    }

    pub fn counts(&self) -> Vec<usize> {
        if self.step == 0 {
            return vec![];
        }
        (self.start..self.end).step_by(self.step).collect()
    }
}

impl Default for CountRange {
    fn default() -> Self {
        Self {
            start: 10 * 4096,
            end: 15 * 4096,
            step: 4096,
        }
    }
}

fn default_trials() -> usize {
    5
}

/// The experiment profile.
///
/// The `default` profile will be used by the runner by default.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Profile {
    /// Environment variables to set for all builds
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Builds to evaluate, one per swap strategy
    #[serde(default = "default_builds")]
    pub builds: BTreeMap<String, BuildConfig>,
    /// Number counts to sort
    #[serde(default)]
    pub counts: CountRange,
    /// Number of trials per count. Default is 5
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// The baseline build name. This is only used for data reporting.
    pub baseline: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            env: HashMap::new(),
            builds: default_builds(),
            counts: CountRange::default(),
            trials: default_trials(),
            baseline: Some("temp_swap".to_owned()),
        }
    }
}

fn default_builds() -> BTreeMap<String, BuildConfig> {
    [
        ("temp_swap".to_owned(), BuildConfig::default()),
        (
            "xor_swap".to_owned(),
            BuildConfig {
                features: vec!["xor-swap".to_owned()],
                ..Default::default()
            },
        ),
    ]
    .into_iter()
    .collect()
}

fn default_true() -> bool {
    true
}

/// The build configuration used for evaluation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Extra cargo features used for compilation. Default to no extra features.
    #[serde(default)]
    pub features: Vec<String>,
    /// Whether to use default features. Default to `true`
    #[serde(default = "default_true", rename = "default-features")]
    pub default_features: bool,
    /// Environment variables to set. Default to no extra environment variables.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            default_features: true,
            env: HashMap::new(),
        }
    }
}

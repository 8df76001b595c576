use hop_core::{CaseMode, HopResult, PathFilter, WeightSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// hop configuration
///
/// Loaded from `$HOP_CONFIG`, `--config`, or the first of
/// `~/.config/hop/config.{toml,json,yaml,yml}`. Every field has a default, so
/// an empty file is a valid configuration.
///
/// # Example
///
/// ```toml
/// data_file = "~/.local/share/hop/hop.txt"
/// exclude = ["/tmp/**"]
///
/// [weights]
/// increment = 10.0
/// max_total = 10000.0
/// decay_factor = 0.9
///
/// [matching]
/// case = "smart"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopConfig {
    /// Store file; defaults to `<data_dir>/hop/hop.txt`
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Diagnostic sink for background recording; defaults to `<data_dir>/hop/hop.log`
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Default tracing filter when `HOP_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit log lines as JSON objects
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    pub weights: WeightSettings,

    #[serde(default)]
    pub matching: MatchingSettings,

    /// Number of candidates offered to shell completion
    #[serde(default = "default_completion_limit")]
    pub completion_limit: usize,

    /// Ignore recorded directories that no longer exist when jumping
    #[serde(default = "default_true")]
    pub skip_missing: bool,

    /// Glob patterns for directories that are never recorded
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub case: CaseMode,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_completion_limit() -> usize {
    9
}

fn default_true() -> bool {
    true
}

impl Default for HopConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            log_file: None,
            log_level: default_log_level(),
            log_json: false,
            weights: WeightSettings::default(),
            matching: MatchingSettings::default(),
            completion_limit: default_completion_limit(),
            skip_missing: true,
            exclude: Vec::new(),
        }
    }
}

impl HopConfig {
    pub fn data_file(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| data_dir().join("hop.txt"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join("hop.log"))
    }

    pub fn path_filter(&self) -> HopResult<PathFilter> {
        PathFilter::new(&self.exclude, dirs::home_dir().as_deref())
    }
}

// Prefer the XDG data dir, fall back to ~/.hop when it is unavailable.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("hop"))
        .or_else(|| dirs::home_dir().map(|h| h.join(".hop")))
        .unwrap_or_else(|| PathBuf::from(".hop"))
}

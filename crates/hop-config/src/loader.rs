use crate::schema::HopConfig;
use anyhow::{anyhow, ensure, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Explicit config file, checked before the default locations
pub const CONFIG_ENV: &str = "HOP_CONFIG";
/// Overrides `data_file` from any config file
pub const DATA_FILE_ENV: &str = "HOP_DATA_FILE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;

        match ext {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: HopConfig,
    /// File the config came from, `None` when running on defaults
    pub path: Option<PathBuf>,
}

/// Load configuration from `explicit`, `$HOP_CONFIG`, or the default
/// locations, falling back to defaults when no file exists.
///
/// An explicitly named file that is missing or malformed is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    let (config, path) = match named.or_else(find_config_file) {
        Some(path) => (load_config_from_file(&path)?, Some(path)),
        None => (HopConfig::default(), None),
    };

    let config = finalize(apply_env_overrides(config, |key| env::var(key).ok()))?;
    Ok(ResolvedConfig { config, path })
}

pub fn load_config_from_file(path: &Path) -> Result<HopConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| anyhow!("Unknown config format for: {}", path.display()))?;

    parse_config_content(&content, format)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

fn parse_config_content(content: &str, format: ConfigFormat) -> Result<HopConfig> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML"),
        ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON"),
        ConfigFormat::Yaml => serde_yaml_ng::from_str(content).context("Failed to parse YAML"),
    }
}

const CONFIG_CANDIDATES: &[&str] = &["config.toml", "config.json", "config.yaml", "config.yml"];

pub fn find_config_file() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join("hop");
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|path| path.exists())
}

fn apply_env_overrides(
    mut config: HopConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> HopConfig {
    if let Some(data_file) = lookup(DATA_FILE_ENV).filter(|v| !v.is_empty()) {
        config.data_file = Some(PathBuf::from(data_file));
    }
    config
}

fn finalize(mut config: HopConfig) -> Result<HopConfig> {
    config.data_file = config.data_file.map(|p| expand_path(&p));
    config.log_file = config.log_file.map(|p| expand_path(&p));
    config.exclude = config
        .exclude
        .iter()
        .map(|pattern| expand_path(Path::new(pattern)).to_string_lossy().into_owned())
        .collect();

    let weights = &config.weights;
    ensure!(
        weights.increment > 0.0,
        "weights.increment must be positive, got {}",
        weights.increment
    );
    ensure!(
        weights.max_total > 0.0,
        "weights.max_total must be positive, got {}",
        weights.max_total
    );
    ensure!(
        weights.decay_factor > 0.0 && weights.decay_factor < 1.0,
        "weights.decay_factor must be between 0 and 1, got {}",
        weights.decay_factor
    );
    ensure!(
        weights.adjust_step > 0.0,
        "weights.adjust_step must be positive, got {}",
        weights.adjust_step
    );

    Ok(config)
}

fn expand_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let expanded = expand_env_string(&text);

    if expanded == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = expanded.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(expanded)
}

/// Expand `$VAR` and `${VAR}`; unknown variables are left as written.
pub fn expand_env_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        if chars.peek() == Some(&'{') {
            chars.next();
            let var_name: String = chars.by_ref().take_while(|&c| c != '}').collect();
            match env::var(&var_name) {
                Ok(value) => result.push_str(&value),
                Err(_) => {
                    result.push_str("${");
                    result.push_str(&var_name);
                    result.push('}');
                }
            }
            continue;
        }

        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                var_name.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if var_name.is_empty() {
            result.push('$');
        } else if let Ok(value) = env::var(&var_name) {
            result.push_str(&value);
        } else {
            result.push('$');
            result.push_str(&var_name);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_env_string_with_braces() {
        env::set_var("HOP_TEST_BRACED", "/srv/data");
        assert_eq!(expand_env_string("${HOP_TEST_BRACED}/hop.txt"), "/srv/data/hop.txt");
    }

    #[test]
    fn test_expand_env_string_without_braces() {
        env::set_var("HOP_TEST_PLAIN", "/srv");
        assert_eq!(expand_env_string("$HOP_TEST_PLAIN/hop"), "/srv/hop");
    }

    #[test]
    fn test_expand_env_string_missing_var() {
        assert_eq!(
            expand_env_string("${HOP_TEST_UNSET_VAR}/x"),
            "${HOP_TEST_UNSET_VAR}/x"
        );
        assert_eq!(expand_env_string("$HOP_TEST_UNSET_VAR"), "$HOP_TEST_UNSET_VAR");
        assert_eq!(expand_env_string("cost $"), "cost $");
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path(Path::new("~/hop.txt")), home.join("hop.txt"));
            assert_eq!(expand_path(Path::new("~")), home);
        }
        assert_eq!(expand_path(Path::new("/abs/~x")), PathBuf::from("/abs/~x"));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.toml")),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("config.ini")), None);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "completion_limit = 4\nexclude = [\"/tmp/**\"]\n[matching]\ncase = \"sensitive\"\n",
        )
        .unwrap();

        let resolved = load_config(Some(&path)).unwrap();
        assert_eq!(resolved.path.as_deref(), Some(path.as_path()));
        assert_eq!(resolved.config.completion_limit, 4);
        assert_eq!(resolved.config.exclude, vec!["/tmp/**".to_string()]);
        assert_eq!(resolved.config.matching.case, hop_core::CaseMode::Sensitive);
    }

    #[test]
    fn test_load_yaml_and_json_files() {
        let dir = TempDir::new().unwrap();

        let yaml = dir.path().join("config.yaml");
        fs::write(&yaml, "skip_missing: false\nweights:\n  increment: 3\n").unwrap();
        let config = load_config_from_file(&yaml).unwrap();
        assert!(!config.skip_missing);
        assert_eq!(config.weights.increment, 3.0);

        let json = dir.path().join("config.json");
        fs::write(&json, r#"{"log_level": "debug"}"#).unwrap();
        assert_eq!(load_config_from_file(&json).unwrap().log_level, "debug");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "completion_limit = \"lots\"").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_decay_factor_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[weights]\ndecay_factor = 1.5\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("decay_factor"));
    }

    #[test]
    fn test_data_file_env_override() {
        let config = HopConfig {
            data_file: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };

        let overridden = apply_env_overrides(config.clone(), |key| {
            (key == DATA_FILE_ENV).then(|| "/from/env".to_string())
        });
        assert_eq!(overridden.data_file, Some(PathBuf::from("/from/env")));

        let untouched = apply_env_overrides(config, |_| Some(String::new()));
        assert_eq!(untouched.data_file, Some(PathBuf::from("/from/config")));
    }
}

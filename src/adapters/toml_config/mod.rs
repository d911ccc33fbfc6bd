// TOML config adapter - Configuration management using TOML files
//
// Precedence: Env > File > Defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::*;
use crate::domain::model::PartOrdering;
use crate::domain::rules::DurationTolerance;
use crate::ports::LogLevel;
use crate::utils::logging::LogFormat;
use crate::utils::summary::SummaryFormat;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MERGEX_CONFIG";

/// Files searched when no explicit config file is given
const CONFIG_SEARCH_PATHS: [&str; 2] = ["mergex.toml", "config/mergex.toml"];

/// Environment variables that override file settings
pub const ENV_OVERRIDE_KEYS: [&str; 11] = [
    "MERGEX_SOURCE_DIR",
    "MERGEX_OUTPUT_DIR",
    "MERGEX_LOG_DIR",
    "MERGEX_LOG_LEVEL",
    "MERGEX_LOG_FORMAT",
    "MERGEX_SUMMARY_FORMAT",
    "MERGEX_PROBE_TIMEOUT_SECS",
    "MERGEX_MERGE_TIMEOUT_SECS",
    "MERGEX_FFMPEG",
    "MERGEX_FFPROBE",
    "MERGEX_PART_ORDER",
];

/// Runtime configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeXConfig {
    /// Folder holding one subdirectory per logical video; prompted for when unset
    pub source_dir: Option<PathBuf>,
    /// Where merged files are written; prompted for when unset
    pub output_dir: Option<PathBuf>,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub log_format: LogFormat,
    pub summary_format: SummaryFormat,
    pub probe_timeout_secs: u64,
    pub merge_timeout_secs: u64,
    pub duration_tolerance_secs: f64,
    pub duration_tolerance_ratio: f64,
    pub exclude_prefixes: Vec<String>,
    pub part_order: PartOrdering,
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Directory for concat manifests; system temp dir when unset
    pub temp_dir: Option<PathBuf>,
}

impl Default for MergeXConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            output_dir: None,
            log_dir: PathBuf::from("mergex-logs"),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            summary_format: SummaryFormat::Text,
            probe_timeout_secs: 60,
            merge_timeout_secs: 7200,
            duration_tolerance_secs: 5.0,
            duration_tolerance_ratio: 0.02,
            exclude_prefixes: vec!["_".to_string(), ".".to_string()],
            part_order: PartOrdering::Lexicographic,
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            temp_dir: None,
        }
    }
}

impl MergeXConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn merge_timeout(&self) -> Duration {
        Duration::from_secs(self.merge_timeout_secs)
    }

    pub fn duration_tolerance(&self) -> DurationTolerance {
        DurationTolerance {
            absolute_secs: self.duration_tolerance_secs,
            ratio: self.duration_tolerance_ratio,
        }
    }

    /// Parsed log level; call after `validate`
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        LogLevel::parse(&self.log_level)?;

        if self.probe_timeout_secs == 0 || self.merge_timeout_secs == 0 {
            return Err(DomainError::BadArgs(
                "Timeouts must be at least one second".to_string(),
            ));
        }

        for (key, value) in [
            ("duration_tolerance_secs", self.duration_tolerance_secs),
            ("duration_tolerance_ratio", self.duration_tolerance_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::BadArgs(format!(
                    "Invalid value for {}: {}",
                    key, value
                )));
            }
        }

        if self.ffmpeg.trim().is_empty() || self.ffprobe.trim().is_empty() {
            return Err(DomainError::BadArgs(
                "ffmpeg and ffprobe locations cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// On-disk layout: everything under a `[mergex]` table
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    mergex: MergeXConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create adapter using `$MERGEX_CONFIG` or the first search path that exists
    pub fn new() -> Self {
        let config_file_path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| {
                CONFIG_SEARCH_PATHS
                    .iter()
                    .map(PathBuf::from)
                    .find(|path| path.exists())
            });
        Self { config_file_path }
    }

    /// Create adapter reading an explicit file
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_file_path: Some(path.into()),
        }
    }

    /// Config file in use, if any
    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Load defaults, then the file, then the process environment
    pub fn load(&self) -> Result<MergeXConfig, DomainError> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Same as `load` with an injectable environment lookup
    pub fn load_with_env<F>(&self, lookup: F) -> Result<MergeXConfig, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config_file_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    DomainError::FsFail(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml_str(&content)?
            }
            None => MergeXConfig::default(),
        };

        Self::apply_env_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Deserialize config from TOML string
    pub fn from_toml_str(toml_content: &str) -> Result<MergeXConfig, DomainError> {
        let parsed: ConfigFile = toml::from_str(toml_content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))?;
        Ok(parsed.mergex)
    }

    /// Override variables that are set to a non-empty value
    pub fn env_overrides<F>(lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        ENV_OVERRIDE_KEYS
            .into_iter()
            .filter(|key| lookup(key).is_some_and(|v| !v.trim().is_empty()))
            .collect()
    }

    /// Apply `MERGEX_*` environment overrides
    fn apply_env_overrides<F>(config: &mut MergeXConfig, lookup: F) -> Result<(), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get("MERGEX_SOURCE_DIR") {
            config.source_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get("MERGEX_OUTPUT_DIR") {
            config.output_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get("MERGEX_LOG_DIR") {
            config.log_dir = PathBuf::from(value);
        }
        if let Some(value) = get("MERGEX_LOG_LEVEL") {
            config.log_level = value;
        }
        if let Some(value) = get("MERGEX_LOG_FORMAT") {
            config.log_format = LogFormat::parse(&value)?;
        }
        if let Some(value) = get("MERGEX_SUMMARY_FORMAT") {
            config.summary_format = SummaryFormat::parse(&value)?;
        }
        if let Some(value) = get("MERGEX_PROBE_TIMEOUT_SECS") {
            config.probe_timeout_secs = parse_secs("MERGEX_PROBE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("MERGEX_MERGE_TIMEOUT_SECS") {
            config.merge_timeout_secs = parse_secs("MERGEX_MERGE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("MERGEX_FFMPEG") {
            config.ffmpeg = value;
        }
        if let Some(value) = get("MERGEX_FFPROBE") {
            config.ffprobe = value;
        }
        if let Some(value) = get("MERGEX_PART_ORDER") {
            config.part_order = PartOrdering::parse(&value)?;
        }
        Ok(())
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, DomainError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| DomainError::BadArgs(format!("Invalid value for {}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = MergeXConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.exclude_prefixes, vec!["_", "."]);
        assert_eq!(config.part_order, PartOrdering::Lexicographic);
        assert_eq!(config.duration_tolerance(), DurationTolerance::default());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let config = TomlConfigAdapter::from_toml_str(
            r##"
            [mergex]
            log_level = "debug"
            log_format = "json"
            summary_format = "yaml"
            probe_timeout_secs = 15
            exclude_prefixes = ["#"]
            part_order = "natural"
            "##,
        )
        .unwrap();

        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.summary_format, SummaryFormat::Yaml);
        assert_eq!(config.probe_timeout(), Duration::from_secs(15));
        assert_eq!(config.exclude_prefixes, vec!["#"]);
        assert_eq!(config.part_order, PartOrdering::Natural);
        assert_eq!(config.merge_timeout_secs, 7200);
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let config = TomlConfigAdapter::from_toml_str("[other]\nkey = 1\n").unwrap();
        assert_eq!(config, MergeXConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mergex.toml");
        let content = "[mergex]\nlog_level = \"warn\"\nffmpeg = \"/opt/ffmpeg\"\n";
        std::fs::write(&path, content).unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("MERGEX_LOG_LEVEL", "error"),
            ("MERGEX_SOURCE_DIR", "/videos"),
            ("MERGEX_MERGE_TIMEOUT_SECS", "30"),
        ]);
        let config = TomlConfigAdapter::with_file(&path)
            .load_with_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.log_level, "error");
        assert_eq!(config.ffmpeg, "/opt/ffmpeg");
        assert_eq!(config.source_dir, Some(PathBuf::from("/videos")));
        assert_eq!(config.merge_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides_lists_set_keys() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MERGEX_LOG_LEVEL", "error"),
            ("MERGEX_FFMPEG", "  "),
            ("UNRELATED", "1"),
        ]);
        let keys = TomlConfigAdapter::env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(keys, vec!["MERGEX_LOG_LEVEL"]);
        assert!(TomlConfigAdapter::env_overrides(no_env).is_empty());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let parse = |text: &str| TomlConfigAdapter::from_toml_str(text).unwrap();

        let zero_timeout = parse("[mergex]\nprobe_timeout_secs = 0\n");
        assert!(zero_timeout.validate().is_err());

        let bad_level = parse("[mergex]\nlog_level = \"loud\"\n");
        assert!(bad_level.validate().is_err());

        let negative = parse("[mergex]\nduration_tolerance_secs = -1.0\n");
        assert!(negative.validate().is_err());

        assert!(TomlConfigAdapter::from_toml_str("[mergex]\npart_order = \"random\"\n").is_err());

        let env = |key: &str| (key == "MERGEX_PROBE_TIMEOUT_SECS").then(|| "soon".to_string());
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();
        assert!(TomlConfigAdapter::with_file(&path).load_with_env(env).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = TomlConfigAdapter::with_file("/nonexistent/mergex.toml")
            .load_with_env(no_env)
            .unwrap_err();
        assert!(matches!(err, DomainError::FsFail(_)));
    }
}

//! @ai:module:intent Configuration structs for the results viewer
//! @ai:module:layer infrastructure
//! @ai:module:public_api ViewerConfig, ApiConfig, PathConfig, BenchmarkSpec
//! @ai:module:stateless true

use crate::results::NamingScheme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "memora-results.toml";

/// @ai:intent Main configuration for the results viewer
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default = "default_benchmarks")]
    pub benchmarks: Vec<BenchmarkSpec>,
}

/// @ai:intent Connection settings for the results API
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// @ai:intent Path configuration for local results and generated reports
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

/// @ai:intent One benchmark family served by the results API
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSpec {
    /// Name used on the command line
    pub name: String,
    /// Path segment under /api/
    pub endpoint: String,
    #[serde(default)]
    pub naming: NamingScheme,
    /// Accepted values of the mode query parameter; empty when the endpoint takes none
    #[serde(default)]
    pub modes: Vec<String>,
    /// Command that produces the results; `{mode}` is substituted
    pub produce_command: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            paths: PathConfig::default(),
            benchmarks: default_benchmarks(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            reports_dir: default_reports_dir(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("benchmarks/results")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_benchmarks() -> Vec<BenchmarkSpec> {
    vec![
        BenchmarkSpec {
            name: "locomo".to_string(),
            endpoint: "locomo".to_string(),
            naming: NamingScheme::Coded,
            modes: vec!["search".to_string(), "think".to_string()],
            produce_command: "uv run python -m benchmarks.locomo --mode {mode}".to_string(),
        },
        BenchmarkSpec {
            name: "longmemeval".to_string(),
            endpoint: "longmemeval".to_string(),
            naming: NamingScheme::Freeform,
            modes: vec![],
            produce_command: "uv run python -m benchmarks.longmemeval".to_string(),
        },
    ]
}

impl ViewerConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Load the explicit config, else the fallback file if present, else defaults
    /// @ai:post errors name the file that failed to load
    /// @ai:effects fs:read
    pub fn load_or_default(explicit: Option<&Path>, fallback: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None if fallback.exists() => fallback,
            None => return Ok(Self::default()),
        };

        Self::load(path).with_context(|| format!("Failed to load config {}", path.display()))
    }

    /// @ai:intent Find a benchmark by its name
    /// @ai:effects pure
    pub fn benchmark(&self, name: &str) -> Option<&BenchmarkSpec> {
        self.benchmarks.iter().find(|b| b.name == name)
    }
}

impl BenchmarkSpec {
    /// @ai:intent Resolve the mode to request, defaulting to the first configured one
    /// @ai:post None for benchmarks that take no mode
    /// @ai:effects pure
    pub fn resolve_mode<'a>(&'a self, requested: Option<&'a str>) -> anyhow::Result<Option<&'a str>> {
        if self.modes.is_empty() {
            if let Some(mode) = requested {
                tracing::warn!("Benchmark {} takes no mode; ignoring {}", self.name, mode);
            }
            return Ok(None);
        }

        match requested {
            Some(mode) if self.modes.iter().any(|m| m == mode) => Ok(Some(mode)),
            Some(mode) => anyhow::bail!(
                "Unknown mode '{}' for {} (expected one of: {})",
                mode,
                self.name,
                self.modes.join(", ")
            ),
            None => Ok(self.modes.first().map(String::as_str)),
        }
    }

    /// @ai:intent Command the user should run to produce missing results
    /// @ai:effects pure
    pub fn produce_hint(&self, mode: Option<&str>) -> String {
        self.produce_command
            .replace("{mode}", mode.unwrap_or_default())
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_has_both_families() {
        let config = ViewerConfig::default();
        assert_eq!(config.benchmark("locomo").map(|b| b.naming), Some(NamingScheme::Coded));
        assert_eq!(
            config.benchmark("longmemeval").map(|b| b.naming),
            Some(NamingScheme::Freeform)
        );
        assert!(config.benchmark("unknown").is_none());
    }

    #[test]
    fn test_resolve_mode() {
        let config = ViewerConfig::default();
        let locomo = config.benchmark("locomo").unwrap();

        assert_eq!(locomo.resolve_mode(None).unwrap(), Some("search"));
        assert_eq!(locomo.resolve_mode(Some("think")).unwrap(), Some("think"));
        assert!(locomo.resolve_mode(Some("dream")).is_err());

        let lme = config.benchmark("longmemeval").unwrap();
        assert_eq!(lme.resolve_mode(Some("search")).unwrap(), None);
    }

    #[test]
    fn test_produce_hint_substitutes_mode() {
        let config = ViewerConfig::default();
        let locomo = config.benchmark("locomo").unwrap();
        assert_eq!(
            locomo.produce_hint(Some("think")),
            "uv run python -m benchmarks.locomo --mode think"
        );
    }

    #[test]
    fn test_save_and_load_roundtrip_keeps_benchmarks() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("memora-results.toml");

        let mut config = ViewerConfig::default();
        config.api.base_url = "http://bench.internal:9000".to_string();
        config.save(&path).unwrap();

        let loaded = ViewerConfig::load(&path).unwrap();
        assert_eq!(loaded.api.base_url, "http://bench.internal:9000");
        assert_eq!(loaded.benchmarks, config.benchmarks);
    }

    #[test]
    fn test_load_or_default_reports_failing_file() {
        let temp = TempDir::new().unwrap();
        let fallback = temp.path().join(DEFAULT_CONFIG_FILE);

        let config = ViewerConfig::load_or_default(None, &fallback).unwrap();
        assert_eq!(config.benchmarks.len(), 2);

        std::fs::write(&fallback, "[api\nbroken").unwrap();
        let err = ViewerConfig::load_or_default(None, &fallback).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));

        let missing = temp.path().join("absent.toml");
        let err = ViewerConfig::load_or_default(Some(&missing), &fallback).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 5\n").unwrap();

        let loaded = ViewerConfig::load(&path).unwrap();
        assert_eq!(loaded.api.timeout_secs, 5);
        assert_eq!(loaded.api.base_url, "http://localhost:8080");
        assert_eq!(loaded.benchmarks.len(), 2);
    }
}

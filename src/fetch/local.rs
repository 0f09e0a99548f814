//! @ai:module:intent Read result documents from a local results directory
//! @ai:module:layer infrastructure
//! @ai:module:public_api LocalResultsSource, LocalResultFile
//! @ai:module:stateless true

use crate::config::BenchmarkSpec;
use crate::error::{Result, ViewerError};
use crate::fetch::client::{display_name, ResultsSourceTrait};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// @ai:intent A result file found on disk
#[derive(Debug, Clone)]
pub struct LocalResultFile {
    pub benchmark: String,
    pub mode: Option<String>,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

/// @ai:intent Results source backed by `<endpoint>[_<mode>][_results].json` files
pub struct LocalResultsSource {
    results_dir: PathBuf,
}

impl LocalResultsSource {
    /// @ai:intent Create a source rooted at a results directory
    /// @ai:effects pure
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// @ai:effects pure
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// @ai:intent File name pattern for one benchmark
    /// @ai:effects pure
    fn pattern_for(benchmark: &BenchmarkSpec) -> std::result::Result<Regex, regex::Error> {
        Regex::new(&format!(
            r"^{}(?:_(?P<mode>[A-Za-z0-9-]+?))?(?:_results)?\.json$",
            regex::escape(&benchmark.endpoint)
        ))
    }

    /// @ai:intent Find all result files belonging to the given benchmarks
    /// @ai:effects fs:read
    pub fn discover(&self, benchmarks: &[BenchmarkSpec]) -> Vec<LocalResultFile> {
        let patterns: Vec<_> = benchmarks
            .iter()
            .filter_map(|b| match Self::pattern_for(b) {
                Ok(pattern) => Some((b, pattern)),
                Err(e) => {
                    tracing::warn!("Cannot match result files for {}: {}", b.name, e);
                    None
                }
            })
            .collect();

        let mut found = Vec::new();

        for entry in WalkDir::new(&self.results_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };

            for (benchmark, pattern) in &patterns {
                let Some(captures) = pattern.captures(file_name) else {
                    continue;
                };

                // `_results` alone is the suffix, not a mode
                let mode = captures
                    .name("mode")
                    .map(|m| m.as_str())
                    .filter(|m| *m != "results")
                    .map(str::to_string);

                if let Some(ref m) = mode {
                    if !benchmark.modes.iter().any(|known| known == m) {
                        tracing::debug!("Ignoring {} (unknown mode {})", entry.path().display(), m);
                        continue;
                    }
                }

                found.push(LocalResultFile {
                    benchmark: benchmark.name.clone(),
                    mode,
                    path: entry.path().to_path_buf(),
                    modified: entry.metadata().ok().and_then(|m| m.modified().ok()),
                });
                break;
            }
        }

        found.sort_by(|a, b| (&a.benchmark, &a.mode, &a.path).cmp(&(&b.benchmark, &b.mode, &b.path)));
        found
    }

    /// @ai:intent Pick the most recent file for a benchmark and mode
    /// @ai:effects fs:read
    pub fn locate(&self, benchmark: &BenchmarkSpec, mode: Option<&str>) -> Option<LocalResultFile> {
        self.discover(std::slice::from_ref(benchmark))
            .into_iter()
            .filter(|f| f.mode.as_deref() == mode)
            .max_by_key(|f| f.modified)
    }
}

impl ResultsSourceTrait for LocalResultsSource {
    /// @ai:intent Read and parse the matching result file
    /// @ai:effects fs:read
    async fn fetch(&self, benchmark: &BenchmarkSpec, mode: Option<&str>) -> Result<Value> {
        let file = self.locate(benchmark, mode).ok_or_else(|| ViewerError::NotFound {
            benchmark: display_name(benchmark, mode),
            hint: benchmark.produce_hint(mode),
        })?;

        tracing::info!("Reading {} results from {}", benchmark.name, file.path.display());

        let content = tokio::fs::read_to_string(&file.path).await?;

        serde_json::from_str(&content).map_err(|e| {
            ViewerError::MalformedDocument(format!("{} is not valid JSON: {}", file.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_result_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_discover_matches_modes_and_suffixes() {
        let temp = TempDir::new().unwrap();
        create_result_file(temp.path(), "locomo_search.json", "{}");
        create_result_file(temp.path(), "nested/locomo_think_results.json", "{}");
        create_result_file(temp.path(), "longmemeval.json", "{}");
        create_result_file(temp.path(), "old/longmemeval_results.json", "{}");
        create_result_file(temp.path(), "locomo_dream.json", "{}");
        create_result_file(temp.path(), "notes.txt", "");

        let config = ViewerConfig::default();
        let source = LocalResultsSource::new(temp.path());
        let found = source.discover(&config.benchmarks);

        let summary: Vec<_> = found
            .iter()
            .map(|f| (f.benchmark.as_str(), f.mode.as_deref()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("locomo", Some("search")),
                ("locomo", Some("think")),
                ("longmemeval", None),
                ("longmemeval", None),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_reads_matching_file() {
        let temp = TempDir::new().unwrap();
        create_result_file(temp.path(), "locomo_think.json", r#"{"item_results": []}"#);

        let config = ViewerConfig::default();
        let locomo = config.benchmark("locomo").unwrap();
        let source = LocalResultsSource::new(temp.path());

        let doc = source.fetch(locomo, Some("think")).await.unwrap();
        assert!(doc["item_results"].is_array());

        let err = source.fetch(locomo, Some("search")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_malformed() {
        let temp = TempDir::new().unwrap();
        create_result_file(temp.path(), "longmemeval.json", "{oops");

        let config = ViewerConfig::default();
        let lme = config.benchmark("longmemeval").unwrap();

        let err = LocalResultsSource::new(temp.path())
            .fetch(lme, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewerError::MalformedDocument(_)));
    }
}

//! @ai:module:intent Report generation for loaded benchmark results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, MarkdownReporter, ChartGenerator, RenderOptions

pub mod charts;
pub mod json_report;
pub mod markdown_report;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use json_report::{JsonReporter, JsonReporterTrait};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait, RenderOptions};

use crate::session::LoadedBenchmark;
use anyhow::Result;
use std::path::Path;

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    /// @ai:intent Generate all reports for a loaded benchmark
    /// @ai:effects fs:write
    pub fn generate_all(
        &self,
        loaded: &LoadedBenchmark,
        options: &RenderOptions,
        output_dir: &Path,
        with_charts: bool,
    ) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        self.json.generate(&loaded.view, &output_dir.join("summary.json"))?;
        self.markdown.generate(
            &loaded.view,
            &loaded.document,
            loaded.spec.naming,
            options,
            &output_dir.join("results.md"),
        )?;

        if with_charts {
            let charts = self
                .charts
                .generate_all(&loaded.view, &loaded.document, output_dir)?;
            tracing::debug!("Charts written: {}", charts.join(", "));
        }

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::fetch::MockResultsSource;
    use crate::session::{PanelState, ViewerSession};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_generate_all_without_charts() {
        let config = ViewerConfig::default();
        let lme = config.benchmark("longmemeval").unwrap();
        let source = MockResultsSource::new().with_document(
            "longmemeval",
            json!({
                "item_results": [{
                    "item_id": "lme-1",
                    "metrics": {"detailed_results": [{
                        "question": "Which city did I move to?",
                        "correct_answer": "Denver",
                        "predicted_answer": "Denver",
                        "category": "single-session-user",
                        "is_correct": true
                    }]}
                }]
            }),
        );

        let mut session = ViewerSession::new();
        let PanelState::Loaded(loaded) = session.load(&source, lme, None).await else {
            panic!("load failed");
        };

        let temp = TempDir::new().unwrap();
        ReportGenerator::new()
            .generate_all(loaded, &RenderOptions::default(), temp.path(), false)
            .unwrap();

        assert!(temp.path().join("summary.json").exists());
        let markdown = std::fs::read_to_string(temp.path().join("results.md")).unwrap();
        assert!(markdown.contains("| single-session-user | 1 | 1 | 0 | 100.0% |"));
    }
}

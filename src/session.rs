//! @ai:module:intent Own the currently loaded benchmark and its filter state
//! @ai:module:layer application
//! @ai:module:public_api ViewerSession, LoadedBenchmark, PanelState
//! @ai:module:stateless false

use crate::config::BenchmarkSpec;
use crate::error::Result;
use crate::fetch::ResultsSourceTrait;
use crate::metrics::{BenchmarkView, ResultAggregator};
use crate::results::{normalize, ItemResult, QuestionResult, ResultDocument, ResultFilter};

/// @ai:intent One fully loaded benchmark: normalized document plus its aggregated view
#[derive(Debug, Clone)]
pub struct LoadedBenchmark {
    pub spec: BenchmarkSpec,
    pub mode: Option<String>,
    pub document: ResultDocument,
    pub view: BenchmarkView,
}

/// @ai:intent Outcome of a load, as shown in the result panel
#[derive(Debug)]
pub enum PanelState<'a> {
    Loaded(&'a LoadedBenchmark),
    /// Inline message shown in place of the results
    Failed(String),
}

/// @ai:intent Session state for the viewer; replaced wholesale on every load
#[derive(Debug, Default)]
pub struct ViewerSession {
    current: Option<LoadedBenchmark>,
    filter: ResultFilter,
}

impl ViewerSession {
    /// @ai:intent Create an empty session
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:effects pure
    pub fn current(&self) -> Option<&LoadedBenchmark> {
        self.current.as_ref()
    }

    /// @ai:effects pure
    pub fn filter(&self) -> ResultFilter {
        self.filter
    }

    /// @ai:intent Switch the active question filter
    /// @ai:effects state:write
    pub fn set_filter(&mut self, filter: ResultFilter) {
        self.filter = filter;
    }

    /// @ai:intent Questions of the loaded benchmark that pass the active filter
    /// @ai:effects pure
    pub fn visible(&self) -> Vec<(&ItemResult, Vec<&QuestionResult>)> {
        self.current
            .as_ref()
            .map(|loaded| self.filter.apply(&loaded.document.items))
            .unwrap_or_default()
    }

    /// @ai:intent Fetch, normalize and aggregate a benchmark, replacing the current state
    /// @ai:post on failure the previous state is cleared and an inline message returned
    /// @ai:effects network, state:write, log
    pub async fn load<S: ResultsSourceTrait>(
        &mut self,
        source: &S,
        spec: &BenchmarkSpec,
        mode: Option<&str>,
    ) -> PanelState<'_> {
        self.current = None;

        match Self::build(source, spec, mode).await {
            Ok(loaded) => {
                tracing::info!(
                    "Loaded {} items ({} questions) for {}",
                    loaded.view.summary.item_count,
                    loaded.view.summary.total_questions,
                    spec.name
                );
                PanelState::Loaded(self.current.insert(loaded))
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", spec.name, e);
                PanelState::Failed(e.user_message())
            }
        }
    }

    /// @ai:effects network
    async fn build<S: ResultsSourceTrait>(
        source: &S,
        spec: &BenchmarkSpec,
        mode: Option<&str>,
    ) -> Result<LoadedBenchmark> {
        let raw = source.fetch(spec, mode).await?;
        let document = normalize(&raw, &spec.naming)?;
        let view = ResultAggregator::new(spec.naming).view(&spec.name, mode, &document);

        Ok(LoadedBenchmark {
            spec: spec.clone(),
            mode: mode.map(str::to_string),
            document,
            view,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::fetch::MockResultsSource;
    use serde_json::json;

    fn document() -> serde_json::Value {
        json!({
            "overall_accuracy": 50.0,
            "total_correct": 1,
            "total_questions": 2,
            "item_results": [{
                "item_id": "conv-26",
                "metrics": {
                    "detailed_results": [
                        {"question": "q1", "correct_answer": "a", "predicted_answer": "a", "category": 4, "is_correct": true},
                        {"question": "q2", "correct_answer": "b", "predicted_answer": "c", "category": 4, "is_correct": false}
                    ]
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_load_success_replaces_state() {
        let config = ViewerConfig::default();
        let locomo = config.benchmark("locomo").unwrap();
        let source = MockResultsSource::new().with_document("locomo", document());
        let mut session = ViewerSession::new();

        match session.load(&source, locomo, Some("search")).await {
            PanelState::Loaded(loaded) => {
                assert_eq!(loaded.view.summary.total_questions, 2);
                assert_eq!(loaded.view.categories[0].label, "Open-domain");
                assert_eq!(loaded.mode.as_deref(), Some("search"));
            }
            PanelState::Failed(message) => panic!("unexpected failure: {}", message),
        }

        assert!(session.current().is_some());
    }

    #[tokio::test]
    async fn test_failed_load_blanks_only_the_panel() {
        let config = ViewerConfig::default();
        let locomo = config.benchmark("locomo").unwrap();
        let lme = config.benchmark("longmemeval").unwrap();
        let source = MockResultsSource::new().with_document("locomo", document());
        let mut session = ViewerSession::new();

        session.load(&source, locomo, Some("search")).await;
        assert!(session.current().is_some());

        match session.load(&source, lme, None).await {
            PanelState::Failed(message) => {
                assert!(message.contains("uv run python -m benchmarks.longmemeval"));
            }
            PanelState::Loaded(_) => panic!("expected a failure"),
        }
        assert!(session.current().is_none());

        // Session remains usable after a failure
        assert!(matches!(
            session.load(&source, locomo, Some("think")).await,
            PanelState::Loaded(_)
        ));
    }

    #[tokio::test]
    async fn test_malformed_document_shows_rendering_error() {
        let config = ViewerConfig::default();
        let locomo = config.benchmark("locomo").unwrap();
        let source = MockResultsSource::new().with_document("locomo", json!({"overall_accuracy": 1.0}));
        let mut session = ViewerSession::new();

        match session.load(&source, locomo, None).await {
            PanelState::Failed(message) => assert!(message.starts_with("Error rendering results")),
            PanelState::Loaded(_) => panic!("expected a failure"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let config = ViewerConfig::default();
        let lme = config.benchmark("longmemeval").unwrap();
        let source = MockResultsSource::new().with_transport_failure("longmemeval", "connection refused");
        let mut session = ViewerSession::new();

        match session.load(&source, lme, None).await {
            PanelState::Failed(message) => assert!(message.contains("connection refused")),
            PanelState::Loaded(_) => panic!("expected a failure"),
        }
    }

    #[tokio::test]
    async fn test_filter_toggle() {
        let config = ViewerConfig::default();
        let locomo = config.benchmark("locomo").unwrap();
        let source = MockResultsSource::new().with_document("locomo", document());
        let mut session = ViewerSession::new();
        session.load(&source, locomo, None).await;

        assert_eq!(session.visible()[0].1.len(), 2);

        session.set_filter(ResultFilter::Incorrect);
        let visible = session.visible();
        assert_eq!(visible[0].1.len(), 1);
        assert_eq!(visible[0].1[0].question, "q2");

        session.set_filter(ResultFilter::Invalid);
        assert!(session.visible().is_empty());
    }
}

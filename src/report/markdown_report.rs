//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter, RenderOptions
//! @ai:module:stateless true

use crate::metrics::{BenchmarkView, Headline, TotalSource};
use crate::results::{CategoryNaming, NamingScheme, QuestionResult, ResultDocument, ResultFilter};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent What to include in per-question output
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub filter: ResultFilter,
    /// Include reasoning and retrieved memories
    pub show_details: bool,
    pub max_memories: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            filter: ResultFilter::All,
            show_details: false,
            max_memories: 10,
        }
    }
}

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from a view and its document
    fn generate(
        &self,
        view: &BenchmarkView,
        document: &ResultDocument,
        naming: NamingScheme,
        options: &RenderOptions,
        output_path: &Path,
    ) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from aggregated results
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// @ai:intent Create a new Markdown reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Make text safe for a table cell
    /// @ai:effects pure
    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace(['\n', '\r'], " ")
    }

    /// @ai:intent Generate title section
    /// @ai:effects pure
    fn generate_title(view: &BenchmarkView) -> String {
        let mut output = String::new();

        writeln!(output, "# {} Benchmark Results", view.benchmark).unwrap();
        writeln!(output).unwrap();
        if let Some(mode) = &view.mode {
            writeln!(output, "**Mode:** {}", mode).unwrap();
        }
        writeln!(output, "**Generated:** {}", view.generated_at).unwrap();
        writeln!(output).unwrap();

        output
    }

    /// @ai:intent Generate overall results table
    /// @ai:effects pure
    fn generate_overall_table(headline: &Headline) -> String {
        let mut output = String::new();

        let valid_note = match headline.total_valid_source {
            TotalSource::Supplied => " (reported)",
            TotalSource::Computed => "",
        };

        writeln!(output, "## Overall Results").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Accuracy | {:.2}% |", headline.overall_accuracy).unwrap();
        writeln!(output, "| Correct | {} |", headline.total_correct).unwrap();
        writeln!(output, "| Valid Questions | {}{} |", headline.total_valid, valid_note).unwrap();
        writeln!(output, "| Invalid Questions | {} |", headline.total_invalid).unwrap();
        writeln!(output, "| Total Questions | {} |", headline.total_questions).unwrap();
        writeln!(output, "| Items | {} |", headline.item_count).unwrap();
        writeln!(output).unwrap();

        output
    }

    /// @ai:intent Generate category breakdown section
    /// @ai:effects pure
    fn generate_category_section(view: &BenchmarkView) -> String {
        let mut output = String::new();

        writeln!(output, "## Results by Category").unwrap();
        writeln!(output).unwrap();

        if view.categories.is_empty() {
            writeln!(output, "_No questions._").unwrap();
            writeln!(output).unwrap();
            return output;
        }

        writeln!(output, "| Category | Correct | Valid | Invalid | Accuracy |").unwrap();
        writeln!(output, "|----------|---------|-------|---------|----------|").unwrap();

        for row in &view.categories {
            writeln!(
                output,
                "| {} | {} | {} | {} | {:.1}% |",
                Self::escape_cell(&row.label),
                row.correct,
                row.valid_total,
                row.invalid,
                row.accuracy
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Status tag of a question
    /// @ai:effects pure
    fn status(result: &QuestionResult) -> &'static str {
        if result.is_invalid {
            "INVALID"
        } else if result.is_correct {
            "CORRECT"
        } else {
            "INCORRECT"
        }
    }

    /// @ai:intent Render one question card
    /// @ai:effects pure
    fn generate_question_card(
        index: usize,
        result: &QuestionResult,
        naming: NamingScheme,
        options: &RenderOptions,
    ) -> String {
        let mut output = String::new();

        writeln!(output, "#### Q{} [{}]", index + 1, Self::status(result)).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "- **Question:** {}", result.question).unwrap();
        writeln!(output, "- **Expected:** {}", result.correct_answer).unwrap();
        writeln!(output, "- **Predicted:** {}", result.predicted_answer).unwrap();
        writeln!(output, "- **Category:** {}", naming.display_name(&result.category)).unwrap();

        if result.is_invalid {
            writeln!(
                output,
                "- **Error:** {}",
                result.error_message.as_deref().unwrap_or("unknown error")
            )
            .unwrap();
        }

        if options.show_details {
            if let Some(reasoning) = &result.reasoning {
                writeln!(output, "- **Reasoning:** {}", reasoning).unwrap();
            }
            if let Some(judge) = &result.correctness_reasoning {
                writeln!(output, "- **Judge:** {}", judge).unwrap();
            }

            if !result.retrieved_memories.is_empty() {
                writeln!(
                    output,
                    "- **Retrieved memories:** {}",
                    result.retrieved_memories.len()
                )
                .unwrap();

                for (i, memory) in result
                    .retrieved_memories
                    .iter()
                    .take(options.max_memories)
                    .enumerate()
                {
                    let tags = memory.tags();
                    let prefix = if tags.is_empty() {
                        String::new()
                    } else {
                        format!("({}) ", tags.join(", "))
                    };
                    writeln!(output, "  {}. {}{}", i + 1, prefix, memory.text).unwrap();
                }
            }
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Generate per-item question sections, honouring the filter
    /// @ai:effects pure
    fn generate_items_section(
        document: &ResultDocument,
        naming: NamingScheme,
        options: &RenderOptions,
    ) -> String {
        let mut output = String::new();

        writeln!(output, "## Questions ({})", options.filter).unwrap();
        writeln!(output).unwrap();

        let selected = options.filter.apply(&document.items);

        if selected.is_empty() {
            writeln!(output, "_No questions match the filter._").unwrap();
            writeln!(output).unwrap();
            return output;
        }

        for (item, questions) in selected {
            writeln!(
                output,
                "### {} ({}/{} correct, {:.1}%)",
                item.item_id,
                item.correct_count(),
                item.valid_count(),
                item.accuracy()
            )
            .unwrap();
            writeln!(output).unwrap();

            for (index, result) in questions.into_iter().enumerate() {
                output.push_str(&Self::generate_question_card(index, result, naming, options));
            }
        }

        output
    }

    /// @ai:intent Render the full report as a string
    /// @ai:effects pure
    pub fn render(
        &self,
        view: &BenchmarkView,
        document: &ResultDocument,
        naming: NamingScheme,
        options: &RenderOptions,
    ) -> String {
        let mut content = String::new();

        content.push_str(&Self::generate_title(view));
        content.push_str(&Self::generate_overall_table(&view.headline));
        content.push_str(&Self::generate_category_section(view));
        content.push_str(&Self::generate_items_section(document, naming, options));

        content
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Generate Markdown report to file
    /// @ai:effects fs:write
    fn generate(
        &self,
        view: &BenchmarkView,
        document: &ResultDocument,
        naming: NamingScheme,
        options: &RenderOptions,
        output_path: &Path,
    ) -> Result<()> {
        let content = self.render(view, document, naming, options);
        std::fs::write(output_path, content)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(())
    }
}

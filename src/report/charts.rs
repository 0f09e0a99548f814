//! @ai:module:intent Chart generation for aggregated results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator
//! @ai:module:stateless true

use crate::metrics::BenchmarkView;
use crate::results::ResultDocument;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

/// @ai:intent Trait for chart generation
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Generate all charts, returning the file names written
    fn generate_all(
        &self,
        view: &BenchmarkView,
        document: &ResultDocument,
        output_dir: &Path,
    ) -> Result<Vec<String>>;
}

/// @ai:intent Generates bar charts from aggregated results
pub struct ChartGenerator;

/// One bar: label and percentage
type Bar = (String, f64);

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Accuracy bars per category, in breakdown order
    /// @ai:effects pure
    pub fn category_bars(view: &BenchmarkView) -> Vec<Bar> {
        view.categories
            .iter()
            .map(|row| (row.label.clone(), row.accuracy))
            .collect()
    }

    /// @ai:intent Accuracy bars per item, skipping items without valid questions
    /// @ai:effects pure
    pub fn item_bars(document: &ResultDocument) -> Vec<Bar> {
        document
            .items
            .iter()
            .filter(|item| item.valid_count() > 0)
            .map(|item| (item.item_id.clone(), item.accuracy()))
            .collect()
    }

    /// @ai:intent Draw a single-series percentage bar chart
    /// @ai:effects fs:write
    fn draw_bars(
        &self,
        caption: &str,
        y_desc: &str,
        data: &[Bar],
        output_path: &Path,
    ) -> Result<()> {
        let width = (120 + data.len() as u32 * 60).clamp(800, 2400);
        let root = BitMapBackend::new(output_path, (width, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..data.len() as i32, 0f64..100f64)?;

        chart
            .configure_mesh()
            .x_labels(data.len())
            .y_desc(y_desc)
            .x_label_formatter(&|x| {
                data.get(*x as usize)
                    .map(|(name, _)| name.to_string())
                    .unwrap_or_default()
            })
            .draw()?;

        chart.draw_series(data.iter().enumerate().map(|(i, (_, accuracy))| {
            Rectangle::new(
                [(i as i32, 0.0), (i as i32 + 1, *accuracy)],
                BLUE.mix(0.7).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Generate category and item accuracy charts
    /// @ai:post charts with no data are skipped
    /// @ai:effects fs:write
    fn generate_all(
        &self,
        view: &BenchmarkView,
        document: &ResultDocument,
        output_dir: &Path,
    ) -> Result<Vec<String>> {
        std::fs::create_dir_all(output_dir)?;

        let mut generated = Vec::new();

        let categories = Self::category_bars(view);
        if categories.is_empty() {
            tracing::debug!("No categories to chart for {}", view.benchmark);
        } else {
            self.draw_bars(
                &format!("{} accuracy by category", view.benchmark),
                "Accuracy (%)",
                &categories,
                &output_dir.join("by_category.png"),
            )?;
            generated.push("by_category.png".to_string());
        }

        let items = Self::item_bars(document);
        if items.is_empty() {
            tracing::debug!("No items with valid questions to chart for {}", view.benchmark);
        } else {
            self.draw_bars(
                &format!("{} accuracy by item", view.benchmark),
                "Accuracy (%)",
                &items,
                &output_dir.join("by_item.png"),
            )?;
            generated.push("by_item.png".to_string());
        }

        Ok(generated)
    }
}

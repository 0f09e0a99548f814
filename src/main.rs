//! @ai:module:intent CLI for browsing memora benchmark results
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use memora_results::{
    config::{BenchmarkSpec, ViewerConfig, DEFAULT_CONFIG_FILE},
    fetch::{HttpResultsSource, LocalResultsSource},
    metrics::{BenchmarkView, TotalSource},
    report::{RenderOptions, ReportGenerator},
    results::{CategoryNaming, QuestionResult, ResultFilter},
    session::{LoadedBenchmark, PanelState, ViewerSession},
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "memora-results")]
#[command(about = "Browse and report memora benchmark results")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a benchmark summary in the terminal
    Show {
        /// Benchmark name (e.g. locomo, longmemeval)
        benchmark: String,

        /// Benchmark mode (e.g. search, think)
        #[arg(short, long)]
        mode: Option<String>,

        /// Read from the local results directory instead of the API
        #[arg(long)]
        local: bool,

        /// Also print per-question results
        #[arg(short, long)]
        questions: bool,

        /// Which questions to print
        #[arg(short, long, value_enum, default_value_t = ResultFilter::All)]
        filter: ResultFilter,

        /// Include reasoning and retrieved memories
        #[arg(short, long)]
        details: bool,
    },

    /// Write JSON, Markdown and chart reports
    Report {
        /// Benchmark name (e.g. locomo, longmemeval)
        benchmark: String,

        /// Benchmark mode (e.g. search, think)
        #[arg(short, long)]
        mode: Option<String>,

        /// Read from the local results directory instead of the API
        #[arg(long)]
        local: bool,

        /// Which questions to include
        #[arg(short, long, value_enum, default_value_t = ResultFilter::All)]
        filter: ResultFilter,

        /// Include reasoning and retrieved memories
        #[arg(short, long)]
        details: bool,

        /// Skip chart generation
        #[arg(long)]
        no_charts: bool,

        /// Output directory (defaults to <reports_dir>/<benchmark>[_<mode>])
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List result files in the local results directory
    List,

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "memora-results.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("memora_results=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            benchmark,
            mode,
            local,
            questions,
            filter,
            details,
        } => {
            let config = load_or_default_config(cli.config)?;
            show(&config, &benchmark, mode.as_deref(), local, questions, filter, details).await
        }
        Commands::Report {
            benchmark,
            mode,
            local,
            filter,
            details,
            no_charts,
            output,
        } => {
            let config = load_or_default_config(cli.config)?;
            let options = RenderOptions {
                filter,
                show_details: details,
                ..Default::default()
            };
            report(&config, &benchmark, mode.as_deref(), local, &options, !no_charts, output).await
        }
        Commands::List => list_local(&load_or_default_config(cli.config)?),
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Look up a benchmark in the configuration
/// @ai:effects pure
fn find_benchmark<'a>(config: &'a ViewerConfig, name: &str) -> Result<&'a BenchmarkSpec> {
    config.benchmark(name).with_context(|| {
        let known: Vec<_> = config.benchmarks.iter().map(|b| b.name.as_str()).collect();
        format!("Unknown benchmark '{}' (configured: {})", name, known.join(", "))
    })
}

/// @ai:intent Load a benchmark into the session from the chosen source
/// @ai:effects network, fs:read
async fn load<'s>(
    session: &'s mut ViewerSession,
    config: &ViewerConfig,
    spec: &BenchmarkSpec,
    mode: Option<&str>,
    local: bool,
) -> Result<&'s LoadedBenchmark> {
    let state = if local {
        let source = LocalResultsSource::new(&config.paths.results_dir);
        session.load(&source, spec, mode).await
    } else {
        let source = HttpResultsSource::new(&config.api)?;
        session.load(&source, spec, mode).await
    };

    match state {
        PanelState::Loaded(loaded) => Ok(loaded),
        PanelState::Failed(message) => anyhow::bail!(message),
    }
}

/// @ai:intent Print a benchmark summary and optionally its questions
/// @ai:effects network, io
async fn show(
    config: &ViewerConfig,
    name: &str,
    mode: Option<&str>,
    local: bool,
    questions: bool,
    filter: ResultFilter,
    details: bool,
) -> Result<()> {
    let spec = find_benchmark(config, name)?;
    let mode = spec.resolve_mode(mode)?;

    let mut session = ViewerSession::new();
    session.set_filter(filter);
    load(&mut session, config, spec, mode, local).await?;

    if let Some(loaded) = session.current() {
        print_summary(&loaded.view);
    }

    if questions {
        print_questions(&session, spec, details);
    }

    Ok(())
}

/// @ai:intent Generate reports for a benchmark
/// @ai:effects network, fs:write
async fn report(
    config: &ViewerConfig,
    name: &str,
    mode: Option<&str>,
    local: bool,
    options: &RenderOptions,
    with_charts: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let spec = find_benchmark(config, name)?;
    let mode = spec.resolve_mode(mode)?;

    let output_dir = output.unwrap_or_else(|| {
        let dir_name = match mode {
            Some(mode) => format!("{}_{}", spec.name, mode),
            None => spec.name.clone(),
        };
        config.paths.reports_dir.join(dir_name)
    });

    let mut session = ViewerSession::new();
    let loaded = load(&mut session, config, spec, mode, local).await?;

    ReportGenerator::new().generate_all(loaded, options, &output_dir, with_charts)?;
    print_summary(&loaded.view);
    println!("Reports generated in {}", output_dir.display());

    Ok(())
}

/// @ai:intent List result files found locally
/// @ai:effects fs:read, io
fn list_local(config: &ViewerConfig) -> Result<()> {
    let source = LocalResultsSource::new(&config.paths.results_dir);
    let files = source.discover(&config.benchmarks);

    if files.is_empty() {
        println!("No result files in {}", source.results_dir().display());
        return Ok(());
    }

    println!("Result files ({}):", files.len());
    println!();
    println!("{:<16} {:<10} {:<20} {}", "Benchmark", "Mode", "Modified", "Path");
    println!("{}", "-".repeat(80));

    for file in files {
        let modified = file
            .modified
            .map(|t| {
                chrono::DateTime::<chrono::Local>::from(t)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<16} {:<10} {:<20} {}",
            file.benchmark,
            file.mode.as_deref().unwrap_or("-"),
            modified,
            file.path.display()
        );
    }

    Ok(())
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    ViewerConfig::default().save(&output)?;
    println!("Configuration written to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<ViewerConfig> {
    ViewerConfig::load_or_default(path.as_deref(), Path::new(DEFAULT_CONFIG_FILE))
}

/// @ai:intent Colour an accuracy value by band
/// @ai:effects pure
fn colored_accuracy(accuracy: f64) -> colored::ColoredString {
    let text = format!("{:>6.1}%", accuracy);

    if accuracy >= 80.0 {
        text.green()
    } else if accuracy >= 50.0 {
        text.yellow()
    } else {
        text.red()
    }
}

/// @ai:intent Print summary to console
/// @ai:effects io
fn print_summary(view: &BenchmarkView) {
    let headline = &view.headline;
    let title = match &view.mode {
        Some(mode) => format!("{} ({}) results", view.benchmark, mode),
        None => format!("{} results", view.benchmark),
    };

    println!();
    println!("{}", title.bold());
    println!("{}", "=".repeat(title.len()));
    println!();
    println!("{:<20} {}", "Accuracy:", colored_accuracy(headline.overall_accuracy));
    println!(
        "{:<20} {} / {}{}",
        "Correct / valid:",
        headline.total_correct,
        headline.total_valid,
        match headline.total_valid_source {
            TotalSource::Supplied => " (reported)",
            TotalSource::Computed => "",
        }
    );
    if headline.total_invalid > 0 {
        println!(
            "{:<20} {}",
            "Invalid:",
            headline.total_invalid.to_string().yellow()
        );
    }
    println!("{:<20} {}", "Questions:", headline.total_questions);
    println!("{:<20} {}", "Items:", headline.item_count);
    println!();

    if view.categories.is_empty() {
        return;
    }

    println!(
        "{:<24} {:>8} {:>8} {:>8} {:>8}",
        "Category", "Correct", "Valid", "Invalid", "Accuracy"
    );
    println!("{}", "-".repeat(60));

    for row in &view.categories {
        println!(
            "{:<24} {:>8} {:>8} {:>8}  {}",
            row.label,
            row.correct,
            row.valid_total,
            row.invalid,
            colored_accuracy(row.accuracy)
        );
    }

    println!();
}

/// @ai:intent Status tag for a question
/// @ai:effects pure
fn status_tag(result: &QuestionResult) -> colored::ColoredString {
    if result.is_invalid {
        "INVALID".yellow().bold()
    } else if result.is_correct {
        "CORRECT".green().bold()
    } else {
        "WRONG".red().bold()
    }
}

/// @ai:intent Print questions passing the session filter
/// @ai:effects io
fn print_questions(session: &ViewerSession, spec: &BenchmarkSpec, details: bool) {
    let visible = session.visible();

    if visible.is_empty() {
        println!("No questions match filter '{}'", session.filter());
        return;
    }

    for (item, questions) in visible {
        println!(
            "{} ({}/{} correct, {:.1}%)",
            item.item_id.bold(),
            item.correct_count(),
            item.valid_count(),
            item.accuracy()
        );
        println!("{}", "-".repeat(60));

        for result in questions {
            println!(
                "  [{}] {} {}",
                status_tag(result),
                spec.naming.display_name(&result.category).dimmed(),
                result.question
            );
            println!("    expected:  {}", result.correct_answer);
            println!("    predicted: {}", result.predicted_answer);

            if let Some(error) = &result.error_message {
                println!("    {} {}", "error:".yellow(), error);
            }

            if details {
                if let Some(reasoning) = &result.reasoning {
                    println!("    {} {}", "reasoning:".cyan(), reasoning);
                }
                if let Some(judge) = &result.correctness_reasoning {
                    println!("    {} {}", "judge:".cyan(), judge);
                }
                for memory in &result.retrieved_memories {
                    let tags = memory.tags();
                    if tags.is_empty() {
                        println!("    - {}", memory.text);
                    } else {
                        println!("    - [{}] {}", tags.join(", ").dimmed(), memory.text);
                    }
                }
            }
        }

        println!();
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Attribute, Cell, Table};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verifai::config::get_config;
use verifai::models::{PaperCheck, ReferenceReport, VerificationReport};
use verifai::utils::CitationFormat;
use verifai::Verifier;

/// VerifAI - verify scholarly papers, their references and retraction status
#[derive(Parser, Debug)]
#[command(name = "verifai")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify scholarly papers against bibliographic sources", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Citation style (overrides the configured one)
    #[arg(long, value_enum, global = true)]
    style: Option<CitationFormat>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Table if stdout is a terminal, JSON otherwise
    Auto,
    /// JSON format (machine-readable)
    Json,
    /// Table format (human-readable)
    Table,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify a paper by DOI
    Doi {
        /// DOI, optionally as a https://doi.org/ URL
        id: String,
    },

    /// Look up a book by ISBN
    Isbn {
        /// ISBN-10 or ISBN-13, hyphens allowed
        isbn: String,
    },

    /// Verify a PDF, DOCX or TXT document
    Document {
        /// Path to the document
        path: PathBuf,
    },

    /// Search all sources for a paper and check it for retraction
    Check {
        /// Free-text query, usually a title
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Verify every reference of a DOI or document
    VerifyRefs {
        /// DOI or path to a document
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("verifai={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = get_config(cli.config.as_deref())?;
    let mut builder = Verifier::builder(config);
    if let Some(style) = cli.style {
        builder = builder.style(style);
    }
    let verifier = builder.build()?;
    let format = resolve_format(cli.output);

    let success = match cli.command {
        Commands::Doi { id } => {
            let report = verifier.verify_doi(&id).await;
            output_report(&report, format)?;
            report.success
        }
        Commands::Isbn { isbn } => {
            let report = verifier.verify_isbn(&isbn).await;
            output_report(&report, format)?;
            report.success
        }
        Commands::Document { path } => {
            let report = verifier.verify_document(&path).await;
            output_report(&report, format)?;
            report.success
        }
        Commands::Check { query } => {
            let check = verifier.check_paper(&query.join(" ")).await;
            output_check(&check, format)?;
            true
        }
        Commands::VerifyRefs { target } => match verifier.collect_references(&target).await {
            Ok(references) => {
                tracing::info!(count = references.len(), "Verifying references");
                let report = verifier.verify_references(&references).await;
                output_references(&report, format)?;
                true
            }
            Err(e) => {
                output_report(&VerificationReport::failure(e.code(), e.to_string()), format)?;
                false
            }
        },
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
        OutputFormat::Auto => OutputFormat::Json,
        other => other,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shorten `text` to `max` characters with a trailing ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn field_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table
}

fn add_field(table: &mut Table, name: &str, value: impl Into<String>) {
    table.add_row(vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new(value.into()),
    ]);
}

fn output_report(report: &VerificationReport, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_json(report);
    }

    let mut table = field_table();
    if !report.success {
        add_field(&mut table, "Error", report.error_code.clone().unwrap_or_default());
        add_field(&mut table, "Message", report.error.clone().unwrap_or_default());
        println!("{table}");
        return Ok(());
    }

    if let Some(paper) = &report.paper {
        add_field(&mut table, "Title", paper.title.clone());
        add_field(&mut table, "Authors", truncate(&paper.authors.join(", "), 80));
        add_field(&mut table, "Year", paper.year.clone().unwrap_or_default());
        add_field(&mut table, "DOI", paper.doi.clone().unwrap_or_default());
        if !paper.keywords.is_empty() {
            add_field(&mut table, "Keywords", paper.keywords.join(", "));
        }
    }
    if let Some(book) = &report.book {
        add_field(&mut table, "Title", book.title.clone());
        add_field(&mut table, "Authors", book.authors.join(", "));
        add_field(&mut table, "Publisher", book.publisher.clone());
        add_field(&mut table, "Published", book.publish_date.clone());
        add_field(&mut table, "ISBN", book.isbn.clone());
    }
    if let Some(style) = &report.citation_style {
        add_field(
            &mut table,
            "Citation style",
            format!("{} ({})", style.style, style.count),
        );
    }
    if report.paper.is_some() {
        add_field(&mut table, "Retracted", if report.is_retracted { "yes" } else { "no" });
    }
    if let Some(citation) = &report.citation {
        add_field(&mut table, "Citation", citation.clone());
    }
    println!("{table}");

    let references = report
        .paper
        .as_ref()
        .map(|p| p.references.as_slice())
        .unwrap_or_default();
    if !references.is_empty() {
        let mut refs = Table::new();
        refs.load_preset(comfy_table::presets::UTF8_FULL);
        refs.set_header(vec!["#", "Score %", "Year", "Reference"]);
        for (i, ranked) in references.iter().enumerate() {
            refs.add_row(vec![
                Cell::new(i + 1),
                Cell::new(format!("{:.2}", ranked.similarity_percentage)),
                Cell::new(ranked.reference.year.clone().unwrap_or_default()),
                Cell::new(truncate(ranked.reference.display_text(), 70)),
            ]);
        }
        println!("{refs}");
    }
    Ok(())
}

fn output_check(check: &PaperCheck, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_json(check);
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Source", "Title", "Year", "DOI"]);
    for (source, hits) in &check.results {
        for hit in hits {
            table.add_row(vec![
                Cell::new(source),
                Cell::new(truncate(&hit.title, 60)).add_attribute(Attribute::Bold),
                Cell::new(hit.year.clone().unwrap_or_default()),
                Cell::new(hit.doi.clone().unwrap_or_default()),
            ]);
        }
    }
    println!("{table}");

    for notice in &check.retracted {
        println!("Retraction notice: {} ({})", notice.title, notice.doi);
    }
    Ok(())
}

fn output_references(report: &ReferenceReport, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_json(report);
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["#", "Status", "Reference"]);
    for (i, check) in report.checks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(check.reference.verification_status),
            Cell::new(truncate(check.reference.display_text(), 70)),
        ]);
    }
    println!("{table}");

    let stats = &report.stats;
    println!(
        "{} verified, {} unverifiable, {} retracted, {} pending",
        stats.verified, stats.unverifiable, stats.retracted, stats.pending
    );
    Ok(())
}

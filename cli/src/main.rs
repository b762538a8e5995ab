//! notedown CLI - rich-text note documents to Markdown

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use notedown::{
    detect_input, BatchOptions, BatchReport, Document, InputKind, Notedown, NotesExport,
};

#[derive(Parser)]
#[command(name = "notedown")]
#[command(version)]
#[command(about = "Export rich-text note documents to Markdown", long_about = None)]
struct Cli {
    /// Input JSON file (document or notes export)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file for a document, output directory for an export
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one document to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input document JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Render lists whose `tight` is unset or null as loose
        #[arg(long)]
        loose: bool,

        /// Do not escape Markdown characters in text
        #[arg(long)]
        no_escape: bool,
    },

    /// Convert every note of a notes export
    Batch {
        /// Input notes export JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Convert at most N notes
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Convert notes one at a time
        #[arg(long)]
        sequential: bool,

        /// Write manifest.json with the per-note outcomes
        #[arg(long)]
        manifest: bool,
    },

    /// Show input information
    Info {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List registered node and mark kinds
    Kinds,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Markdown {
            input,
            output,
            loose,
            no_escape,
        }) => read_json(&input)
            .and_then(|value| cmd_markdown(&value, output.as_deref(), loose, no_escape)),
        Some(Commands::Batch {
            input,
            output,
            limit,
            sequential,
            manifest,
        }) => read_json(&input).and_then(|value| {
            cmd_batch(value, output.as_deref(), limit, sequential, manifest)
        }),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Kinds) => {
            cmd_kinds();
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: detect the input and convert it
            if let Some(input) = cli.input {
                cmd_auto(&input, cli.output.as_deref())
            } else {
                println!("{}", "Usage: notedown <FILE> [OUTPUT]".yellow());
                println!("       notedown --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_json(input: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let value = serde_json::from_str(&text).map_err(notedown::Error::from)?;
    Ok(value)
}

fn cmd_auto(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let value = read_json(input)?;
    let kind = detect_input(&value)?;
    debug!("detected {}", kind);
    match kind {
        InputKind::Document => cmd_markdown(&value, output, false, false),
        InputKind::NotesExport { .. } => cmd_batch(value, output, None, false, false),
    }
}

fn cmd_markdown(
    value: &serde_json::Value,
    output: Option<&Path>,
    loose: bool,
    no_escape: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut converter = Notedown::new();
    if loose {
        converter = converter.loose_lists();
    }
    if no_escape {
        converter = converter.without_escaping();
    }

    let markdown = converter.to_markdown_value(value)?;

    if let Some(path) = output {
        fs::write(path, &markdown)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", markdown);
    }

    Ok(())
}

fn cmd_batch(
    value: serde_json::Value,
    output: Option<&Path>,
    limit: Option<usize>,
    sequential: bool,
    manifest: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("notes"));
    fs::create_dir_all(&output_dir)?;

    let export = NotesExport::from_value(value)?;

    let mut options = BatchOptions::new();
    if let Some(n) = limit {
        options = options.with_limit(n);
    }
    if sequential {
        options = options.sequential();
    }

    let total = options.limit.map_or(export.len(), |n| n.min(export.len()));
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Converting notes...");

    let converter = Notedown::new();
    let report = notedown::batch::convert_notes_with(
        &export,
        converter.schema(),
        converter.serializer(),
        &options,
        |_| pb.inc(1),
    );
    pb.finish_with_message("Done!");

    for (index, markdown) in report.converted_notes() {
        fs::write(output_dir.join(format!("{}.md", index)), markdown)?;
    }
    if manifest {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(output_dir.join("manifest.json"), json)?;
    }

    print_report(&report, &output_dir);
    Ok(())
}

fn print_report(report: &BatchReport, output_dir: &Path) {
    println!("\n{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Notes".bold(), report.total);
    println!("{}: {}", "Converted".bold(), report.converted.to_string().green());
    println!("{}: {}", "Blank".bold(), report.blank);
    println!("{}: {}", "Failed".bold(), report.failed.to_string().red());
    println!("{}: {}", "Output".bold(), output_dir.display());

    for failure in report.failures() {
        if let notedown::BatchOutcome::Failed { index, error, .. } = failure {
            println!("  {} note {}: {}", "skipped".yellow(), index, error.dimmed());
        }
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let value = read_json(input)?;
    let kind = detect_input(&value)?;

    println!("{}", "Input Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), kind);

    if kind == InputKind::Document {
        let converter = Notedown::new();
        let doc = Document::from_value(converter.schema(), &value)?;

        println!("{}: {}", "Blocks".bold(), doc.content().len());
        println!("{}: {}", "Nodes".bold(), doc.root().subtree_size());
        println!(
            "{}: {}",
            "Characters".bold(),
            doc.root().text_content().chars().count()
        );

        println!();
        println!("{}", "Node Kinds".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (name, count) in doc.kind_counts() {
            println!("{}: {}", name.bold(), count);
        }

        let marks = doc.mark_counts();
        if !marks.is_empty() {
            println!();
            println!("{}", "Mark Kinds".cyan().bold());
            println!("{}", "─".repeat(40).dimmed());
            for (name, count) in marks {
                println!("{}: {}", name.bold(), count);
            }
        }
    }

    Ok(())
}

fn cmd_kinds() {
    let converter = Notedown::new();
    let serializer = converter.serializer();

    println!("{}", "Node Kinds".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for node_type in converter.schema().node_types() {
        let renderer = match serializer.node_renderer(node_type.name()) {
            Ok(r) => r.label().normal(),
            Err(_) if node_type.name() == notedown::schema::TOP_NODE => "root".dimmed(),
            Err(_) => "missing".red(),
        };
        println!("  {:<18} {}", node_type.name(), renderer);
    }

    println!();
    println!("{}", "Mark Kinds".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for mark_type in converter.schema().mark_types() {
        let renderer = match serializer.mark_spec(mark_type.name()) {
            Ok(spec) => spec.describe().normal(),
            Err(_) => "missing".red(),
        };
        println!("  {:<18} {}", mark_type.name(), renderer);
    }
}

fn cmd_version() {
    println!("{} {}", "notedown".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Rich-text note documents to Markdown");
    println!();
    println!("License: MIT");
}

//! sechtml CLI - filing structure inference tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use sechtml::render::{self, apply_visitor, MaxHeadingDepthVisitor};
use sechtml::{
    detect_format_from_path, parse_file_with_options, Alignment, ColumnWidthConfig,
    ColumnWidthOptimizer, Document, JsonFormat, NodeKind, OutlineItem, ParseOptions, SizedTable,
};

#[derive(Parser)]
#[command(name = "sechtml")]
#[command(version)]
#[command(about = "Infer headings, text blocks, tables and pages from SEC filing HTML", long_about = None)]
struct Cli {
    /// Input filing document
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a filing to document and table JSON files
    Convert {
        /// Input filing document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Export the node sequence as JSON
    Json {
        /// Input filing document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Do not detect page breaks
        #[arg(long)]
        no_pages: bool,

        /// Demote headings deeper than this level to text (1-4)
        #[arg(long, default_value = "4")]
        max_heading: u8,
    },

    /// Print the heading outline
    Outline {
        /// Input filing document
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print processed tables
    Tables {
        /// Input filing document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Total width budget in characters
        #[arg(long, default_value = "100")]
        width: usize,

        /// Output processed tables as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input filing document
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Convert every filing in a directory to JSON
    Batch {
        /// Input directory
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert { input, output }) => cmd_convert(&input, output.as_deref()),
        Some(Commands::Json {
            input,
            output,
            compact,
            no_pages,
            max_heading,
        }) => cmd_json(&input, output.as_deref(), compact, no_pages, max_heading),
        Some(Commands::Outline { input }) => cmd_outline(&input),
        Some(Commands::Tables { input, width, json }) => cmd_tables(&input, width, json),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Batch {
            input,
            output,
            compact,
        }) => cmd_batch(&input, &output, compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref())
            } else {
                println!("{}", "Usage: sechtml <FILE> [OUTPUT]".yellow());
                println!("       sechtml --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Parse a filing, turning a missing body into an error for commands that
/// need a document.
fn load(input: &Path, options: ParseOptions) -> Result<Document, Box<dyn std::error::Error>> {
    parse_file_with_options(input, options)?
        .ok_or_else(|| format!("{}: no <body> element", input.display()).into())
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(input: &Path, output: Option<&Path>) -> CliResult {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Parsing filing...");
    let options = ParseOptions::new();
    let doc = load(input, options.clone())?;
    pb.inc(1);

    pb.set_message("Writing document JSON...");
    let json = render::to_json(&doc, JsonFormat::Pretty)?;
    fs::write(output_dir.join("content.json"), &json)?;
    pb.inc(1);

    pb.set_message("Processing tables...");
    let tables = render::tables_to_json(&doc, &options.table, options.parallel, JsonFormat::Pretty)?;
    fs::write(output_dir.join("tables.json"), &tables)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} content.json", "├─".dimmed());
    println!("  {} tables.json", "└─".dimmed());

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    no_pages: bool,
    max_heading: u8,
) -> CliResult {
    let options = ParseOptions::new().with_page_breaks(!no_pages);
    let mut doc = load(input, options)?;
    if max_heading < 4 {
        doc = apply_visitor(&doc, &mut MaxHeadingDepthVisitor::new(max_heading));
    }

    let json = render::to_json(&doc, json_format(compact))?;
    write_or_print(output, &json)
}

fn cmd_outline(input: &Path) -> CliResult {
    let doc = load(input, ParseOptions::new())?;
    let outline = doc.outline();

    if outline.is_empty() {
        println!("{}", "No headings found".yellow());
        return Ok(());
    }

    for item in &outline.items {
        print_outline_item(item, 0);
    }
    println!(
        "\n{} {} headings",
        "Total:".bold(),
        outline.total_items()
    );
    Ok(())
}

fn print_outline_item(item: &OutlineItem, depth: usize) {
    let page = item
        .page
        .map(|p| format!(" (page {})", p))
        .unwrap_or_default();
    let title = match item.level {
        1 => item.title.bold().to_string(),
        2 => item.title.cyan().to_string(),
        _ => item.title.clone(),
    };
    println!("{}{}{}", "  ".repeat(depth), title, page.dimmed());
    for child in &item.children {
        print_outline_item(child, depth + 1);
    }
}

fn cmd_tables(input: &Path, width: usize, json: bool) -> CliResult {
    let options = ParseOptions::new();
    let doc = load(input, options.clone())?;

    if json {
        let rendered =
            render::tables_to_json(&doc, &options.table, options.parallel, JsonFormat::Pretty)?;
        return write_or_print(None, &rendered);
    }

    let optimizer = ColumnWidthOptimizer::new(ColumnWidthConfig::default().with_budget(width));
    let processed = doc.process_tables(&options.table, options.parallel);

    for (index, table) in processed.iter().enumerate() {
        println!("{}", format!("Table {}", index + 1).cyan().bold());
        match table {
            Some(table) => print_table(&optimizer.optimize(table)),
            None => println!("{}", "(empty)".dimmed()),
        }
        println!();
    }
    println!("{} {} tables", "Total:".bold(), processed.len());
    Ok(())
}

fn print_table(sized: &SizedTable) {
    let table = &sized.table;
    if let Some(header) = &table.header {
        print_row(header, &sized.widths, None);
        let rule: Vec<String> = sized.widths.iter().map(|w| "─".repeat(*w)).collect();
        println!("{}", rule.join(" ").dimmed());
    }
    for row in &table.data_rows {
        print_row(row, &sized.widths, Some(table.alignments.as_slice()));
    }
}

/// Print one logical row, expanding wrapped cells into several lines.
fn print_row(cells: &[String], widths: &[usize], alignments: Option<&[Alignment]>) {
    let split: Vec<Vec<&str>> = cells.iter().map(|c| c.lines().collect()).collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for line in 0..height {
        let parts: Vec<String> = split
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(j, (lines, &width))| {
                let text = lines.get(line).copied().unwrap_or("");
                let right = alignments
                    .and_then(|a| a.get(j))
                    .is_some_and(|a| *a == Alignment::Right);
                if right {
                    format!("{:>width$}", text)
                } else {
                    format!("{:<width$}", text)
                }
            })
            .collect();
        println!("{}", parts.join(" ").trim_end());
    }
}

fn cmd_info(input: &Path) -> CliResult {
    let format = detect_format_from_path(input)?;
    let doc = load(input, ParseOptions::new())?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for kind in NodeKind::ALL {
        println!("{}: {}", kind.as_str().bold(), doc.count(kind));
    }

    let text = doc.plain_text();
    let annotated = doc
        .nodes()
        .iter()
        .filter(|n| !n.annotations().is_empty())
        .count();
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());
    println!("{}: {}", "Annotated nodes".bold(), annotated);

    Ok(())
}

fn is_filing_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "htm" | "html" | "xhtml" | "txt"))
}

fn cmd_batch(input: &Path, output: &Path, compact: bool) -> CliResult {
    let mut files: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_filing_path(p))
        .collect();
    files.sort();
    fs::create_dir_all(output)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let (mut converted, mut skipped, mut failed) = (0usize, 0usize, 0usize);
    for path in &files {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        pb.set_message(name.to_string());

        match parse_file_with_options(path, ParseOptions::new()) {
            Ok(Some(doc)) => {
                let stem = path.file_stem().unwrap_or_default().to_string_lossy();
                let json = render::to_json(&doc, json_format(compact))?;
                fs::write(output.join(format!("{}.json", stem)), json)?;
                converted += 1;
            }
            Ok(None) => {
                log::info!("{}: no <body> element, skipped", path.display());
                skipped += 1;
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), path.display(), e));
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} converted, {} skipped, {} failed",
        "Batch:".green().bold(),
        converted,
        skipped,
        failed
    );
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "sechtml".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("SEC filing structure inference tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_filing_path() {
        assert!(is_filing_path(Path::new("aapl-20230930.htm")));
        assert!(is_filing_path(Path::new("0000320193-23-000106.TXT")));
        assert!(!is_filing_path(Path::new("report.pdf")));
        assert!(!is_filing_path(Path::new("README")));
    }

    #[test]
    fn test_load_reports_missing_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.htm");
        fs::write(&path, "<html><frameset><frame src='a.htm'></frameset></html>").unwrap();

        let err = load(&path, ParseOptions::new()).unwrap_err();
        assert!(err.to_string().contains("no <body> element"));
    }

    #[test]
    fn test_batch_writes_json() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(
            input.path().join("a.htm"),
            "<html><body><p>Hello</p></body></html>",
        )
        .unwrap();
        fs::write(input.path().join("notes.md"), "ignored").unwrap();

        cmd_batch(input.path(), output.path(), true).unwrap();

        let json = fs::read_to_string(output.path().join("a.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][1]["text"], "Hello");
        assert!(!output.path().join("notes.json").exists());
    }
}

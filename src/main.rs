//! doclinks - list the hyperlinks in a DOCX or PDF document

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use doclinks::{DocumentFormat, DocxStrategy, ExtractOptions, Hyperlink, PdfStrategy};

#[derive(Parser)]
#[command(name = "doclinks")]
#[command(version, about = "List the hyperlinks in a DOCX or PDF document", long_about = None)]
#[command(after_help = "EXAMPLES:
    doclinks report.docx                       Links with their visible text
    doclinks --docx-mode relationships a.docx  Relationship targets only
    doclinks --pdf-mode text-scan paper.pdf    URLs written in the page text
    doclinks --json upload.bin --format pdf    JSON output, explicit type")]
struct Cli {
    /// Input file (DOCX or PDF)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Document type; taken from the file extension when omitted
    #[arg(short, long, value_name = "TYPE")]
    format: Option<String>,

    /// DOCX extraction variant
    #[arg(long, value_enum, default_value_t = DocxMode::Correlated)]
    docx_mode: DocxMode,

    /// PDF extraction variant
    #[arg(long, value_enum, default_value_t = PdfMode::Annotations)]
    pdf_mode: PdfMode,

    /// Characters of context kept around URLs found in PDF text
    #[arg(long, value_name = "N", default_value_t = doclinks::DEFAULT_CONTEXT_RADIUS)]
    context: usize,

    /// Print links as a JSON array
    #[arg(long, conflicts_with = "count")]
    json: bool,

    /// Print only the number of links found
    #[arg(long)]
    count: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocxMode {
    /// w:hyperlink elements and HYPERLINK fields, with labels
    Correlated,
    /// Hyperlink relationships, unlabelled
    Relationships,
}

#[derive(Clone, Copy, ValueEnum)]
enum PdfMode {
    /// Link annotations plus labelled text scan
    Annotations,
    /// URL-shaped page text, unlabelled
    TextScan,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("doclinks={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let format = match &cli.format {
        Some(tag) => DocumentFormat::from_tag(tag),
        None => DocumentFormat::from_path(&cli.input),
    }
    .map_err(|e| e.to_string())?;

    let options = ExtractOptions::default()
        .with_docx(match cli.docx_mode {
            DocxMode::Correlated => DocxStrategy::Correlated,
            DocxMode::Relationships => DocxStrategy::Relationships,
        })
        .with_pdf(match cli.pdf_mode {
            PdfMode::Annotations => PdfStrategy::Annotations,
            PdfMode::TextScan => PdfStrategy::TextScan,
        })
        .with_context_radius(cli.context);

    let bytes = std::fs::read(&cli.input)
        .map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let links = doclinks::extract_links(&bytes, format, &options).map_err(|e| e.to_string())?;

    if cli.count {
        println!("{}", links.len());
    } else if cli.json {
        let json = serde_json::to_string_pretty(&links).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print_links(&cli.input, &links);
    }

    Ok(())
}

fn print_links(input: &std::path::Path, links: &[Hyperlink]) {
    println!("File: {}", input.display());
    println!("Links: {}", links.len());
    for (i, link) in links.iter().enumerate() {
        if link.has_label() && link.text != link.url {
            println!("{:>4}. {} <{}>", i + 1, link.text, link.url);
        } else {
            println!("{:>4}. {}", i + 1, link.url);
        }
    }
}

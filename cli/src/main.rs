//! pdfoutline CLI - bookmark tree inspection tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use pdfoutline::{
    pdf_version_of_file, render, BookMark, BoundaryStrategy, JsonFormat, ParseOptions, PdfParser,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Build bookmark trees from PDF outlines", long_about = None)]
struct Cli {
    /// Keep going when the outline cannot be read
    #[arg(long, global = true)]
    lenient: bool,

    /// Password for encrypted documents (reserved, decryption is not supported yet)
    #[arg(long, global = true, env = "PDFOUTLINE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bookmark tree with page ranges
    Tree {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the flat outline entries as read from the document
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Convert the bookmark tree to JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document and outline information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let mut options = ParseOptions::new();
    if cli.lenient {
        options = options.lenient();
    }
    if let Some(password) = cli.password {
        options = options.with_password(password);
    }
    log::debug!("parse options: {:?}", options);

    let result = match cli.command {
        Commands::Tree { input } => cmd_tree(&input, options),
        Commands::Outline { input } => cmd_outline(&input, options),
        Commands::Json {
            input,
            output,
            compact,
        } => cmd_json(&input, output.as_deref(), compact, options),
        Commands::Info { input } => cmd_info(&input, options),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_tree(input: &Path, options: ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    let parser = PdfParser::open_with_options(input, options)?;
    let bookmarks = parser.bookmarks();

    if bookmarks.is_empty() {
        println!("{}", "No outline found".yellow());
        return Ok(());
    }

    print!("{}", render::to_outline_text(&bookmarks));
    parser.close()?;
    Ok(())
}

fn cmd_outline(input: &Path, options: ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    let parser = PdfParser::open_with_options(input, options)?;

    for entry in parser.outline() {
        let anchor = if entry.anchor.is_none() {
            "title".dimmed().to_string()
        } else {
            format!("({}, {})", entry.anchor.x, entry.anchor.y)
        };
        println!(
            "{} {} {} {}",
            format!("L{}", entry.level).cyan(),
            entry.title,
            format!("p.{}", entry.page).dimmed(),
            anchor
        );
    }

    parser.close()?;
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    options: ParseOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let parser = PdfParser::open_with_options(input, options)?;
    let bookmarks = parser.bookmarks();

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&bookmarks, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    parser.close()?;
    Ok(())
}

fn cmd_info(input: &Path, options: ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    let version = pdf_version_of_file(input)?;
    let parser = PdfParser::open_with_options(input, options)?;
    let bookmarks = parser.bookmarks();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), version);
    println!("{}: {}", "Pages".bold(), parser.page_count());
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if parser.backend().is_encrypted() { "Yes" } else { "No" }
    );

    println!();
    println!("{}", "Outline Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let all: Vec<&BookMark> = bookmarks.iter().flat_map(BookMark::walk).collect();
    let anchored = all
        .iter()
        .filter(|b| matches!(b.strategy, BoundaryStrategy::GeometricAnchor { .. }))
        .count();
    let depth = all.iter().map(|b| b.level + 1).max().unwrap_or(0);

    println!("{}: {}", "Outline entries".bold(), parser.outline().len());
    println!("{}: {}", "Bookmarks".bold(), all.len());
    println!("{}: {}", "Top-level".bold(), bookmarks.len());
    println!("{}: {}", "Depth".bold(), depth);
    println!("{}: {}", "Anchored".bold(), anchored);
    println!("{}: {}", "Title-matched".bold(), all.len() - anchored);

    parser.close()?;
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline to bookmark tree tool");
    println!();
    println!("Library: pdfoutline {}", env!("CARGO_PKG_VERSION"));
}

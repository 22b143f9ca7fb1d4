//! Xiasi CLI - Command-line tool for perm.bin asset extraction.
//!
//! This is the main entry point for the Xiasi command-line application.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::Level;
use walkdir::WalkDir;

use xiasi::prelude::*;
use xiasi::resource::browse::to_tree as browse_tree;

/// Xiasi - perm.bin mesh and resource extraction tool
#[derive(Parser)]
#[command(name = "xiasi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract meshes from a perm.bin file or a directory of them
    Extract {
        /// Input file or directory
        #[arg(short, long, env = "INPUT_PATH")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Mesh resolution profile (per-mesh or pooled)
        #[arg(short, long, env = "XIASI_PROFILE", default_value_t = Profile::PerMesh)]
        profile: Profile,

        /// File name pattern used when walking a directory (glob-style)
        #[arg(long, default_value = "*.perm.bin")]
        pattern: String,
    },

    /// Show the decode report of a perm.bin file
    Info {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Mesh resolution profile (per-mesh or pooled)
        #[arg(short, long, env = "XIASI_PROFILE", default_value_t = Profile::PerMesh)]
        profile: Profile,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan a file for known resource type signatures
    Scan {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify the zones, resources and textures of a directory
    List {
        /// Directory to list
        #[arg(short, long, env = "INPUT_PATH")]
        dir: PathBuf,

        /// Descend into zone directories
        #[arg(short, long)]
        recursive: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Extract {
            input,
            output,
            profile,
            pattern,
        } => {
            cmd_extract(&input, &output, profile, &pattern)?;
        }
        Commands::Info {
            input,
            profile,
            json,
        } => {
            cmd_info(&input, profile, json)?;
        }
        Commands::Scan { input, json } => {
            cmd_scan(&input, json)?;
        }
        Commands::List { dir, recursive } => {
            cmd_list(&dir, recursive)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Collect the files to decode from a file or directory argument.
fn collect_inputs(input: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let pattern = Pattern::new(pattern).with_context(|| format!("Invalid pattern: {pattern}"))?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::default()
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
        if entry.file_type().is_file()
            && pattern.matches_with(&entry.file_name().to_string_lossy(), options)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Output directory for one input file.
///
/// Files found under a walked directory keep their relative parent path, so
/// same-named packs in different zones do not overwrite each other.
fn output_dir_for(input: &Path, output: &Path, path: &Path) -> PathBuf {
    match path.parent().and_then(|parent| parent.strip_prefix(input).ok()) {
        Some(relative) => output.join(relative),
        None => output.to_path_buf(),
    }
}

struct Extracted {
    report: DecodeReport,
    written: usize,
}

fn extract_one(path: &Path, output: &Path, options: &DecodeOptions) -> Result<Extracted> {
    let file = PermFile::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let report = file.decode(options);
    let written = report
        .write_meshes(output)
        .with_context(|| format!("Failed to write meshes of {}", file.name()))?
        .len();
    Ok(Extracted { report, written })
}

fn cmd_extract(input: &Path, output: &Path, profile: Profile, pattern: &str) -> Result<()> {
    let files = collect_inputs(input, pattern)?;
    if files.is_empty() {
        anyhow::bail!("No files matching {} under {}", pattern, input.display());
    }

    println!("Decoding {} files with the {} profile...", files.len(), profile);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let options = DecodeOptions::new(profile);
    let start = Instant::now();

    let results: Vec<(PathBuf, Result<Extracted>)> = files
        .par_iter()
        .map(|path| {
            let result = extract_one(path, &output_dir_for(input, output, path), &options);
            pb.inc(1);
            (path.clone(), result)
        })
        .collect();

    pb.finish_with_message("Done");

    let mut meshes = 0;
    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(extracted) => {
                meshes += extracted.written;
                print_summary(&extracted.report);
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }

    println!(
        "Wrote {} meshes from {} files to {} in {:?} ({} failed)",
        meshes,
        results.len() - failed,
        output.display(),
        start.elapsed(),
        failed
    );

    Ok(())
}

fn print_summary(report: &DecodeReport) {
    println!("{}", report.summary());
    for skipped in &report.skipped {
        println!(
            "  skipped mesh {} of model at {}: {}",
            skipped.descriptor_index, skipped.model_offset, skipped.reason
        );
    }
    for diagnostic in report.errors() {
        println!("  {diagnostic}");
    }
}

fn cmd_info(input: &Path, profile: Profile, json: bool) -> Result<()> {
    let file = PermFile::open(input).context("Failed to open input file")?;
    let report = file.decode(&DecodeOptions::new(profile));

    if json {
        let text = serde_json::to_string_pretty(&report.digest()).context("Failed to serialize report")?;
        println!("{text}");
    } else {
        print!("{}", report.to_tree());
        println!(
            "\n{} chunks ({} unknown), {} stream declarations ({} shadowed), {} descriptors",
            report.stats.chunks,
            report.stats.unknown_chunks,
            report.stats.stream_declarations,
            report.stats.shadowed_streams,
            report.stats.descriptors
        );
    }

    Ok(())
}

fn cmd_scan(input: &Path, json: bool) -> Result<()> {
    let file = PermFile::open(input).context("Failed to open input file")?;

    let start = Instant::now();
    let results = find_resources(file.data());

    if json {
        let text = serde_json::to_string_pretty(&results).context("Failed to serialize scan results")?;
        println!("{text}");
    } else {
        print!("{}", results.to_tree(file.name()));
        println!(
            "\nTotal: {} matches in {} resource types ({:?})",
            results.total(),
            results.groups.len(),
            start.elapsed()
        );
    }

    Ok(())
}

fn cmd_list(dir: &Path, recursive: bool) -> Result<()> {
    let depth = if recursive { None } else { Some(1) };
    let entries = browse(dir, depth).with_context(|| format!("Failed to list {}", dir.display()))?;

    print!("{}", browse_tree(dir.display().to_string(), &entries));

    let count = |kind: EntryKind| entries.iter().filter(|e| e.kind == kind).count();
    println!(
        "\nTotal: {} zones, {} resources, {} textures",
        count(EntryKind::Zone),
        count(EntryKind::Resource),
        count(EntryKind::Texture)
    );

    Ok(())
}

//! # CLI Module
//!
//! Command-line interface for the media organizer.
//!
//! ## Usage
//! ```bash
//! # Move a camera dump into a dated library
//! photo-org import /media/card/DCIM ~/Pictures/library
//!
//! # See what would happen, as JSON
//! photo-org import /media/card/DCIM ~/Pictures/library --dry-run --output json
//!
//! # Show the date tags and resolved capture time of a few files
//! photo-org show IMG_0001.JPG clip.mov
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_org::config::{Config, FileConfig, MetadataBackend, Overrides};
use photo_org::core::metadata::lookup_tags;
use photo_org::core::organize::{CollisionPolicy, FileStatus, ImportReport, OperationMode};
use photo_org::core::resolver::candidate_date_tags;
use photo_org::core::MediaFile;
use photo_org::error::Result;
use photo_org::events::{Event, EventChannel, ImportEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

/// photo-org - File photos and videos by capture date
#[derive(Parser, Debug)]
#[command(name = "photo-org")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: <config dir>/photo-org/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move (or copy) files into <target>/<YYYY>/<MM>/
    Import {
        /// Root to scan (overrides `source_path`)
        source: Option<PathBuf>,

        /// Library root (overrides `target_path`)
        target: Option<PathBuf>,

        /// Resolve and plan without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Copy instead of move
        #[arg(long)]
        copy: bool,

        /// What to do when the destination is taken
        #[arg(long)]
        collision: Option<Collision>,

        /// Where tags come from
        #[arg(long)]
        backend: Option<Backend>,

        /// Tag extraction program for the external backend
        #[arg(long)]
        tag_program: Option<String>,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,

        /// Walk into symlinked directories
        #[arg(long)]
        follow_symlinks: bool,

        /// Deepest directory level to walk (1 = only files directly in source)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Record a SHA-256 of every file in the report
        #[arg(long)]
        hash: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Print date tags and the resolved capture time of files
    Show {
        /// Files to inspect
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Where tags come from
        #[arg(long)]
        backend: Option<Backend>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Collision {
    /// Add `_1`, `_2`, ... to the name (default)
    Rename,
    /// Leave the file in place and report it
    Skip,
}

impl From<Collision> for CollisionPolicy {
    fn from(c: Collision) -> Self {
        match c {
            Collision::Rename => CollisionPolicy::Rename,
            Collision::Skip => CollisionPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Run exiftool per file (default)
    External,
    /// Read EXIF in-process
    Builtin,
}

impl From<Backend> for MetadataBackend {
    fn from(b: Backend) -> Self {
        match b {
            Backend::External => MetadataBackend::External,
            Backend::Builtin => MetadataBackend::Builtin,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON report for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    photo_org::init_tracing(if cli.verbose { "debug" } else { "info" });

    match cli.command {
        Commands::Import {
            source,
            target,
            dry_run,
            copy,
            collision,
            backend,
            tag_program,
            include_hidden,
            follow_symlinks,
            max_depth,
            hash,
            output,
        } => {
            let overrides = Overrides {
                source_path: source,
                target_path: target,
                tag_program,
                metadata_backend: backend.map(Into::into),
                collision: collision.map(Into::into),
                operation: copy.then_some(OperationMode::Copy),
                include_hidden: include_hidden.then_some(true),
                follow_symlinks: follow_symlinks.then_some(true),
                max_depth,
                dry_run,
                compute_hash: hash,
            };
            let config = Config::load(cli.config.as_deref(), overrides)?;
            run_import(&config, output)
        }
        Commands::Show { paths, backend } => {
            let file = FileConfig::load(cli.config.as_deref())?;
            run_show(file, &paths, backend)
        }
    }
}

fn run_import(config: &Config, output: OutputFormat) -> Result<ExitCode> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("photo-org").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    // Fail early, before any file is looked at
    if let Some(reader) = config.external_reader() {
        let version = reader.check_available()?;
        tracing::debug!(program = reader.program(), version = %version, "tag reader found");
    }

    let importer = config.build_importer()?;
    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Import(ImportEvent::FileStarted { index, path, .. }) => {
                    pb.set_position(index as u64);
                    pb.set_message(
                        path.file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
                Event::Import(ImportEvent::Completed { .. }) | Event::Import(ImportEvent::Aborted { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = importer.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = result?;
    match output {
        OutputFormat::Pretty => print_pretty_report(&term, &report),
        OutputFormat::Json => print_json_report(&report),
    }

    // One line per failure, regardless of format
    for failure in report.failures() {
        if let FileStatus::Failed { message } = &failure.status {
            eprintln!("failed: {}: {}", failure.source.display(), message);
        }
    }
    for error in &report.scan_errors {
        eprintln!("failed: {}", error);
    }

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_pretty_report(term: &Term, report: &ImportReport) {
    let summary = &report.summary;
    let verb = if report.dry_run { "planned" } else { "placed" };

    term.write_line(&format!(
        "{} {}",
        style("✓").green().bold(),
        if report.dry_run { "Dry run complete" } else { "Import complete" }
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files found in {:.1}s",
        style(summary.total_files).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!("  {} {}", style(summary.placed).cyan(), verb)).ok();
    if summary.renamed_on_collision > 0 {
        term.write_line(&format!(
            "  {} renamed to avoid a clash",
            style(summary.renamed_on_collision).yellow()
        ))
        .ok();
    }
    term.write_line(&format!(
        "  {} already organized",
        style(summary.skipped).dim()
    ))
    .ok();
    if summary.failed > 0 {
        term.write_line(&format!("  {} failed", style(summary.failed).red().bold()))
            .ok();
    }
    if summary.folders_created > 0 {
        term.write_line(&format!(
            "  {} folders created",
            style(summary.folders_created).dim()
        ))
        .ok();
    }
    term.write_line("").ok();

    for file in &report.files {
        let (Some(destination), Some(evidence)) = (&file.destination, &file.evidence) else {
            continue;
        };
        if !matches!(file.status, FileStatus::Placed | FileStatus::Planned) {
            continue;
        }
        term.write_line(&format!(
            "  {} {} {}",
            display_path(&file.source),
            style("→").dim(),
            display_path(destination)
        ))
        .ok();
        term.write_line(&format!("    {}", style(format!("from {}", evidence)).dim()))
            .ok();
    }

    if report.dry_run {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style("Dry run: no files were moved.").dim()
        ))
        .ok();
    }
}

fn print_json_report(report: &ImportReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "could not serialize report"),
    }
}

fn run_show(file: FileConfig, paths: &[PathBuf], backend: Option<Backend>) -> Result<ExitCode> {
    let term = Term::stdout();

    let overrides = Overrides {
        // Roots are irrelevant here
        source_path: Some(PathBuf::from(".")),
        target_path: Some(PathBuf::from(".")),
        metadata_backend: backend.map(Into::into),
        ..Default::default()
    };
    let config = Config::resolve(file, overrides)?;
    if let Some(reader) = config.external_reader() {
        reader.check_available()?;
    }
    let registry = config.registry()?;
    let reader = config.tag_reader();
    let resolver = config.resolver();

    let mut failed = false;
    for path in paths {
        let mut media = MediaFile::new(path, &registry);
        term.write_line(&format!(
            "{} ({})",
            style(display_path(path)).bold(),
            media.kind()
        ))
        .ok();

        match lookup_tags(reader.as_ref(), path, media.kind()) {
            Ok(tags) => {
                for (label, value) in candidate_date_tags(&tags) {
                    term.write_line(&format!("  {}: {}", label, value)).ok();
                }
                media = media.with_tags(tags);
            }
            Err(e) => {
                term.write_line(&format!("  {} {}", style("tags:").red(), e)).ok();
            }
        }

        match media.captured_at(reader.as_ref(), &resolver) {
            Ok(resolved) => {
                term.write_line(&format!(
                    "  {} {} (from {})",
                    style("→").green(),
                    resolved.time,
                    resolved.source
                ))
                .ok();
            }
            Err(e) => {
                failed = true;
                term.write_line(&format!("  {} {}", style("✗").red(), e)).ok();
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn display_path(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => match path.strip_prefix(&home) {
            Ok(rest) => format!("~/{}", rest.display()),
            Err(_) => path.display().to_string(),
        },
        None => path.display().to_string(),
    }
}

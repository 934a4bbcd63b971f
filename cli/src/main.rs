use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use clap::{ArgAction, Parser};
use console::style;
use dejargon_core::{
    profile, CatalogConfig, Cleaned, Cleaner, Match, MatchKind, PatternCatalog, StyleProfile,
    Summary,
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Dejargon CLI entry point.
#[derive(Debug, Parser)]
#[command(
    name = "dejargon",
    about = "Replace machine-sounding jargon in prose with plainer wording."
)]
struct Args {
    /// Files or directories to clean.
    #[arg(value_name = "PATH", num_args = 0.., conflicts_with = "text")]
    paths: Vec<PathBuf>,

    /// Clean this text instead of reading files.
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// Catalog config (JSON or YAML, chosen by extension). Built-in tables otherwise.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Document whose style should guide replacement choice.
    #[arg(long, value_name = "FILE")]
    reference: Option<PathBuf>,

    /// Domain priorities to apply (academic, business, grant_writing, ...).
    #[arg(long, value_name = "NAME")]
    domain: Option<String>,

    /// Where to write cleaned text: a file, or a directory when cleaning several files.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write a `<name>_report.txt` next to each output.
    #[arg(long, action = ArgAction::SetTrue)]
    report: bool,

    /// Emit JSON output for automation.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Suppress everything but errors.
    #[arg(long, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Re-run cleaning on its own output up to this many times.
    #[arg(long, value_name = "N", default_value_t = 1)]
    passes: usize,

    /// Glob patterns to skip while walking directories (repeatable).
    #[arg(long, value_name = "GLOB")]
    ignore: Vec<String>,

    /// Log pipeline internals to stderr.
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct FileResult {
    path: String,
    passes: usize,
    style: StyleProfile,
    summary: Summary,
    matches: Vec<Match>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputReport {
    files: Vec<FileResult>,
    total_changes: usize,
    changes_per_kind: BTreeMap<MatchKind, usize>,
}

/// One unit of work: a file on disk or the inline `--text`.
struct Input {
    label: String,
    source: Option<PathBuf>,
    bytes: Vec<u8>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(args)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let catalog = PatternCatalog::new(cfg).context("Invalid pattern catalog")?;

    let mut cleaner = Cleaner::new(&catalog);
    if let Some(domain) = &args.domain {
        if !catalog.has_domain(domain) && !args.quiet && !args.json {
            eprintln!(
                "{} unknown domain `{}`; known: {}",
                style("note:").yellow(),
                domain,
                catalog.domains().collect::<Vec<_>>().join(", ")
            );
        }
        cleaner = cleaner.with_domain(domain.clone());
    }
    if let Some(path) = &args.reference {
        let reference = load_reference(path)?;
        if !args.quiet && !args.json {
            println!(
                "{} {} ({} tone, formality {:.2})",
                style("Reference style analyzed:").bold(),
                path.display(),
                reference.tone,
                reference.formality_score
            );
        }
        cleaner = cleaner.with_reference(reference);
    }

    let inputs = gather_inputs(&args)?;
    let many = inputs.len() > 1;
    let mut files = Vec::new();
    let mut per_kind: BTreeMap<MatchKind, usize> = BTreeMap::new();
    let mut total_changes = 0usize;

    for input in inputs {
        let cleaned = cleaner
            .clean_bytes_iteratively(&input.bytes, args.passes)
            .with_context(|| format!("Failed to clean {}", input.label))?;
        tracing::debug!(input = %input.label, changes = cleaned.matches.len(), "cleaned");

        let output = output_path(args.output.as_deref(), input.source.as_deref(), many)?;
        emit(&args, &input, &cleaned, output.as_deref())?;

        total_changes += cleaned.matches.len();
        for m in &cleaned.matches {
            *per_kind.entry(m.kind).or_insert(0) += 1;
        }
        files.push(FileResult {
            path: input.label,
            passes: cleaned.passes,
            summary: cleaned.summary(),
            style: cleaned.self_profile,
            matches: cleaned.matches,
            output: output.map(|p| p.to_string_lossy().to_string()),
        });
    }

    if args.json {
        let output = OutputReport {
            files,
            total_changes,
            changes_per_kind: per_kind,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !args.quiet && many {
        println!(
            "\n{} files, {} changes",
            style(files.len()).bold(),
            style(total_changes).bold()
        );
    }
    Ok(())
}

/// Write or print the cleaned text and its report for one input.
fn emit(args: &Args, input: &Input, cleaned: &Cleaned, output: Option<&Path>) -> anyhow::Result<()> {
    let human = !args.quiet && !args.json;
    match output {
        Some(path) => {
            fs::write(path, &cleaned.text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if human {
                println!("{} {}", style("Cleaned text written to:").green(), path.display());
            }
        }
        None if !args.json => println!("{}", cleaned.text),
        None => {}
    }

    if args.report {
        let base = output
            .map(Path::to_path_buf)
            .or_else(|| input.source.clone())
            .unwrap_or_else(|| PathBuf::from("analysis"));
        let report_path = report_path_for(&base);
        fs::write(&report_path, cleaned.report())
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;
        if human {
            println!("\n{} {}", style("Report written to:").green(), report_path.display());
        }
    } else if human {
        print_human_report(&input.label, cleaned);
    }
    Ok(())
}

fn print_human_report(label: &str, cleaned: &Cleaned) {
    println!(
        "\n{} ({} words, {} tone, {} changes over {} pass(es))",
        style(label).bold(),
        cleaned.self_profile.word_count,
        cleaned.self_profile.tone,
        cleaned.matches.len(),
        cleaned.passes
    );
    if cleaned.matches.is_empty() {
        println!("  {}", style("clean").green());
        return;
    }
    println!("{}", cleaned.report());
}

/// `proposal.txt` reports to `proposal.txt_report.txt`.
fn report_path_for(base: &Path) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push("_report.txt");
    PathBuf::from(name)
}

fn output_path(output: Option<&Path>, source: Option<&Path>, many: bool) -> anyhow::Result<Option<PathBuf>> {
    let Some(output) = output else {
        return Ok(None);
    };
    if !many && !output.is_dir() {
        return Ok(Some(output.to_path_buf()));
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    let name = source
        .and_then(Path::file_name)
        .ok_or_else(|| anyhow!("--output {} is a directory but the input has no file name", output.display()))?;
    Ok(Some(output.join(name)))
}

fn gather_inputs(args: &Args) -> anyhow::Result<Vec<Input>> {
    if let Some(text) = &args.text {
        return Ok(vec![Input {
            label: "<text>".to_string(),
            source: None,
            bytes: text.clone().into_bytes(),
        }]);
    }
    if args.paths.is_empty() {
        bail!("Nothing to clean: pass one or more PATHs or --text");
    }

    let ignore = build_ignore_set(&args.ignore)?;
    let mut files = collect_files(&args.paths, ignore.as_ref())?;
    files.sort();
    files.dedup();
    if files.is_empty() {
        bail!("No supported files (.md, .markdown, .txt, .rst) found");
    }

    files
        .into_iter()
        .map(|path| {
            let bytes =
                fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(Input {
                label: path.to_string_lossy().to_string(),
                source: Some(path),
                bytes,
            })
        })
        .collect()
}

fn build_ignore_set(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Bad --ignore glob `{pattern}`"))?);
    }
    Ok(Some(builder.build()?))
}

fn collect_files(paths: &[PathBuf], ignore: Option<&GlobSet>) -> anyhow::Result<Vec<PathBuf>> {
    let ignored = |path: &Path| ignore.is_some_and(|set| set.is_match(path));
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut walker = WalkDir::new(path).into_iter();
            while let Some(entry) = walker.next() {
                let entry = entry?;
                let entry_path = entry.path();
                if ignored(entry_path) {
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    continue;
                }
                if entry.file_type().is_file() && is_supported(entry_path) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else if path.is_file() {
            // Explicitly named files are cleaned whatever their extension.
            if !ignored(path) {
                files.push(path.clone());
            }
        } else {
            bail!("{} does not exist", path.display());
        }
    }
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "md" | "markdown" | "txt" | "rst"),
        None => false,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CatalogConfig> {
    let Some(path) = path else {
        return Ok(CatalogConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase);
    let cfg = match ext.as_deref() {
        Some("json") => CatalogConfig::from_json_str(&text),
        Some("yml") | Some("yaml") => CatalogConfig::from_yaml_str(&text),
        _ => CatalogConfig::from_yaml_str(&text).or_else(|_| CatalogConfig::from_json_str(&text)),
    }
    .with_context(|| format!("Invalid config structure in {}", path.display()))?;
    Ok(cfg)
}

fn load_reference(path: &Path) -> anyhow::Result<StyleProfile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read reference {}", path.display()))?;
    Ok(profile(&text))
}

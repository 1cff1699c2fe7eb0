//! CLI command implementations

use anyhow::Context;
use arrange_core::{
    ArrangeConfig, ConfigFormat, ConfigLoader, DiagnosticProvider, Document, ErrorKind,
    ExternalDiagnostics, FileDiscovery, UnusedUsingAnalyzer,
};
use arrange_rules::RuleEngine;
use colored::Colorize;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

use crate::output::{DiffRenderer, FileReport, FileStatus, FormatSummary};

/// Options of `arrange fmt`
#[derive(Debug, Clone)]
pub struct FmtOptions {
    pub paths: Vec<PathBuf>,
    pub check: bool,
    pub write: bool,
    pub diff: bool,
    pub diagnostics: Option<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub config_path: Option<PathBuf>,
}

/// Format command implementation
///
/// Returns `false` when the command should exit with code 1: a file would
/// change under `--check`, or a file could not be processed.
pub fn fmt_command(options: FmtOptions) -> anyhow::Result<bool> {
    debug!("Running fmt command on paths: {:?}", options.paths);

    let mut config = load_config(options.config_path.as_deref(), config_start(&options.paths))?;

    // Apply CLI overrides to configuration
    if !options.include.is_empty() {
        config.files.include = options.include.clone();
    }
    if !options.exclude.is_empty() {
        config.files.exclude = options.exclude.clone();
    }
    for id in &options.enable {
        config.rules.set(id.clone(), true);
    }
    for id in &options.disable {
        config.rules.set(id.clone(), false);
    }

    let mut engine = RuleEngine::with_builtin_rules();
    engine
        .configure(&config.rules)
        .context("Invalid rule configuration")?;

    let provider: Box<dyn DiagnosticProvider> = match &options.diagnostics {
        Some(path) => Box::new(
            ExternalDiagnostics::from_file(path)
                .with_context(|| format!("Failed to load diagnostics from {}", path.display()))?,
        ),
        None => Box::new(UnusedUsingAnalyzer::new()),
    };

    let start_time = Instant::now();

    let files = FileDiscovery::new(&config.files)?
        .discover(&options.paths)
        .context("File discovery failed")?;
    if files.is_empty() {
        println!("No C# files found in specified paths.");
        return Ok(true);
    }
    debug!("Found {} C# files to format", files.len());

    // Parallel across documents, sequential within one
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| format_file(path, &engine, provider.as_ref(), options.write))
        .collect();

    let renderer = DiffRenderer::new();
    let mut summary = FormatSummary::new(reports.len());
    for report in &reports {
        summary.record(&report.status);
        report.print(options.write);
        if options.diff
            && let FileStatus::Changed {
                original,
                formatted,
                ..
            } = &report.status
        {
            println!("{}", renderer.render_diff(original, formatted));
        }
    }

    summary.print(options.write);
    println!(
        "Completed in {}",
        crate::output::utils::format_duration(start_time.elapsed())
    );

    let check_failed = options.check && summary.changed > 0;
    Ok(!check_failed && summary.failed == 0)
}

/// Format one file, writing it back when requested
fn format_file(
    path: &Path,
    engine: &RuleEngine,
    provider: &dyn DiagnosticProvider,
    write: bool,
) -> FileReport {
    let status = match Document::from_path(path) {
        Err(e) => FileStatus::Failed(e.to_string()),
        Ok(document) => match engine.format(&document, provider) {
            Ok(outcome) if !outcome.changed => FileStatus::Unchanged,
            Ok(outcome) => {
                let written = if write {
                    fs::write(path, &outcome.text).map(|()| true)
                } else {
                    Ok(false)
                };
                match written {
                    Ok(written) => FileStatus::Changed {
                        original: document.text,
                        formatted: outcome.text,
                        applied_rules: outcome.applied_rules,
                        written,
                    },
                    Err(e) => FileStatus::Failed(format!("Failed to write file: {e}")),
                }
            }
            Err(e) if e.kind() == ErrorKind::Parse => {
                warn!("Skipping {}: {}", path.display(), e);
                FileStatus::Skipped(e.to_string())
            }
            Err(e) => FileStatus::Failed(e.to_string()),
        },
    };

    FileReport {
        path: path.to_path_buf(),
        status,
    }
}

/// Rules list command implementation
pub fn rules_command(detailed: bool, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    debug!("Listing available rules");

    let config = load_config(config_path.as_deref(), Path::new("."))?;
    let mut engine = RuleEngine::with_builtin_rules();
    engine
        .configure(&config.rules)
        .context("Invalid rule configuration")?;

    println!("Available Rules:");
    println!("================");

    let rules = engine.rules();
    for rule in &rules {
        let state = if rule.enabled {
            "enabled".green()
        } else {
            "disabled".yellow()
        };

        if detailed {
            println!("\n{}", rule.metadata.id.bold());
            println!("  Description: {}", rule.metadata.description);
            println!("  Phase: {}", rule.metadata.phase);
            println!("  Order: {}", rule.metadata.order);
            println!("  Status: {state}");
            println!(
                "  Default: {}",
                if rule.metadata.default_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        } else {
            println!(
                "  {} - {} [{}]",
                rule.metadata.id, rule.metadata.description, state
            );
        }
    }

    println!("\nTotal: {} rules", rules.len());
    Ok(())
}

/// Config init command implementation
pub fn config_init_command(format: ConfigFormat, force: bool) -> anyhow::Result<()> {
    debug!("Initializing configuration file with format: {:?}", format);

    let filename = format.default_file_name();
    let config_path = PathBuf::from(filename);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file '{filename}' already exists. Use --force to overwrite.");
    }

    // Every built-in rule listed with its default state
    let mut config = ArrangeConfig::default();
    for rule in RuleEngine::with_builtin_rules().rules() {
        config
            .rules
            .set(rule.metadata.id, rule.metadata.default_enabled);
    }

    let content = config.render(format)?;
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("{} Created configuration file: {filename}", "✓".green());
    println!("   Edit the file to enable or disable rules and adjust file patterns.");
    Ok(())
}

/// Config show command implementation
pub fn config_show_command(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    debug!("Showing configuration");

    let source = match &config_path {
        Some(path) => Some(path.clone()),
        None => ConfigLoader::auto_discover(Path::new("."))?,
    };
    let config = match &source {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ArrangeConfig::default(),
    };

    println!("Configuration:");
    println!("==============");
    match &source {
        Some(path) => println!("Source: {}", path.display()),
        None => println!("Source: (defaults)"),
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Directory to start config discovery from
fn config_start(paths: &[PathBuf]) -> &Path {
    match paths.first() {
        Some(first) if first.is_file() => match first.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        },
        Some(first) if first.is_dir() => first,
        _ => Path::new("."),
    }
}

fn load_config(config_path: Option<&Path>, start: &Path) -> anyhow::Result<ArrangeConfig> {
    let config = ConfigLoader::load(config_path, Some(start))?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

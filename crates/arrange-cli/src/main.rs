//! Arrange CLI
//!
//! Command-line interface for the arrange C# source normalizer

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing::error;

use arrange_core::init_tracing;

#[derive(Parser)]
#[command(name = "arrange")]
#[command(about = "arrange: put C# class members in a canonical order and drop unused usings")]
#[command(version = arrange_core::VERSION)]
#[command(
    long_about = "arrange normalizes C# sources without touching member bodies.\n\
Members of every class and struct are ordered as events, fields, properties,\n\
constructors, methods, enums and nested types, each group sorted by name.\n\
\n\
Examples:\n  \
arrange fmt                   # Show which files would change\n  \
arrange fmt --write src/      # Rewrite files in src/\n  \
arrange fmt --check --diff .  # Fail if anything would change, show the diff\n  \
arrange rules --detailed      # List rules and their state\n  \
arrange config init           # Create a configuration file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.arrange.toml/.arrange.json/arrange.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Arrange C# files
    #[command(alias = "format")]
    Fmt {
        /// Files or directories to format
        #[arg(help = "Files or directories to format (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Check formatting without modifying files
        #[arg(
            long,
            help = "Exit with code 1 if any file would change",
            conflicts_with = "write"
        )]
        check: bool,

        /// Write changes back to the files
        #[arg(long, help = "Write changes to files")]
        write: bool,

        /// Show diff of proposed changes
        #[arg(long, help = "Show diff of proposed changes")]
        diff: bool,

        /// Compiler diagnostics to use instead of the built-in analyzer
        #[arg(
            long,
            value_name = "FILE",
            help = "JSON file with compiler diagnostics (replaces the built-in unused-using analyzer)"
        )]
        diagnostics: Option<PathBuf>,

        /// Include patterns (glob syntax)
        #[arg(
            long,
            help = "Include files matching pattern (can be used multiple times)"
        )]
        include: Vec<String>,

        /// Exclude patterns (glob syntax)
        #[arg(
            long,
            help = "Exclude files matching pattern (can be used multiple times)"
        )]
        exclude: Vec<String>,

        /// Enable a rule
        #[arg(long, value_name = "RULE", help = "Enable a rule by id (can be used multiple times)")]
        enable: Vec<String>,

        /// Disable a rule
        #[arg(long, value_name = "RULE", help = "Disable a rule by id (can be used multiple times)")]
        disable: Vec<String>,
    },

    /// List available rules
    Rules {
        /// Show detailed rule information
        #[arg(long, help = "Show detailed information for each rule")]
        detailed: bool,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed version and build information")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Configuration file format
        #[arg(long, default_value = "toml", help = "Configuration file format")]
        format: ConfigFormat,

        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Show the effective configuration
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConfigFormat {
    /// TOML configuration format
    Toml,
    /// JSON configuration format
    Json,
}

impl From<ConfigFormat> for arrange_core::ConfigFormat {
    fn from(format: ConfigFormat) -> Self {
        match format {
            ConfigFormat::Toml => arrange_core::ConfigFormat::Toml,
            ConfigFormat::Json => arrange_core::ConfigFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    // Tracing based on verbosity; RUST_LOG still wins when set
    let log_level = match cli.verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    init_tracing(log_level);

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to set thread pool size: {}", e);
        std::process::exit(1);
    }

    match run_command(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("arrange failed: {:#}", e);
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}

/// Run the selected command; `Ok(false)` means exit code 1
fn run_command(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Some(Commands::Fmt {
            paths,
            check,
            write,
            diff,
            diagnostics,
            include,
            exclude,
            enable,
            disable,
        }) => {
            let paths = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };

            commands::fmt_command(commands::FmtOptions {
                paths,
                check,
                write,
                diff,
                diagnostics,
                include,
                exclude,
                enable,
                disable,
                config_path: cli.config,
            })
        }

        Some(Commands::Rules { detailed }) => {
            commands::rules_command(detailed, cli.config)?;
            Ok(true)
        }

        Some(Commands::Config { action }) => {
            match action {
                ConfigAction::Init { format, force } => {
                    commands::config_init_command(format.into(), force)?
                }
                ConfigAction::Show => commands::config_show_command(cli.config)?,
            }
            Ok(true)
        }

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("arrange {}", arrange_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
                println!(
                    "  Rules: {}",
                    arrange_rules::RuleEngine::with_builtin_rules()
                        .rule_ids()
                        .join(", ")
                );
            } else {
                println!("{}", arrange_core::VERSION);
            }
            Ok(true)
        }

        None => {
            // No subcommand provided, show help
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(true)
        }
    }
}

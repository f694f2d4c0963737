//! Command-line front end for the source catalogue.
//!
//! Every subcommand loads the catalogue from a root directory and works on
//! the read-only result. Exit code 0 means success; a failed load or any
//! collected validation finding exits 1.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sourcecat::registration::{BackupOutcome, backup_schemas};
use sourcecat::{
    COMMONS_PATH, CatalogConfig, Catalogue, Scope, format_violations, load_catalogue,
    validate_catalog_root,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sourcecat", version, about = "Source catalogue tooling")]
struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Catalog configuration file (YAML).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print topic names, or one source's derived topics.
    List {
        /// Print only raw input topics.
        #[arg(long, conflicts_with = "cache")]
        raw: bool,

        /// Print only result-cache topics.
        #[arg(long)]
        cache: bool,

        /// Print the derived topics of one source instead.
        #[arg(long, value_name = "NAME")]
        source: Option<String>,

        /// Catalog root directory.
        root: PathBuf,
    },

    /// Run validation rules; exit 1 when any finding is collected.
    Validate {
        /// Restrict schema placement checks to one scope.
        #[arg(short, long)]
        scope: Option<Scope>,

        /// Also check schema files under commons/.
        #[arg(short, long)]
        full: bool,

        /// Catalog root directory.
        root: PathBuf,
    },

    /// Mirror schema files into a registry backup tree.
    Register {
        /// Backup directory to mirror into.
        #[arg(long, value_name = "DIR")]
        backup: PathBuf,

        /// Catalog root directory.
        root: PathBuf,
    },

    /// Serve a read-only HTTP view of the catalogue.
    #[cfg(feature = "service")]
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,

        /// Catalog root directory.
        root: PathBuf,
    },
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => CatalogConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => CatalogConfig::default(),
    };

    match cli.command {
        Command::List {
            raw,
            cache,
            source,
            root,
        } => {
            let catalogue = load_catalogue(&root, &config)
                .with_context(|| format!("loading catalogue from {}", root.display()))?;
            if let Some(name) = source {
                print_source_topics(&catalogue, &name)?;
            } else if raw {
                for topic in catalogue.raw_topics() {
                    println!("{topic}");
                }
            } else if cache {
                for topic in catalogue.result_cache_topics() {
                    println!("{topic}");
                }
            } else {
                for topic in catalogue.all_topic_names() {
                    println!("{topic}");
                }
            }
            Ok(0)
        }

        Command::Validate { scope, full, root } => {
            let violations = validate_catalog_root(&root, &config, full, scope)
                .with_context(|| format!("loading catalogue from {}", root.display()))?;
            if violations.is_empty() {
                println!("catalog is valid");
                Ok(0)
            } else {
                print!("{}", format_violations(&violations));
                eprintln!("{} validation failure(s)", violations.len());
                Ok(1)
            }
        }

        Command::Register { backup, root } => {
            let commons = root.join(COMMONS_PATH);
            let report = backup_schemas(&commons, &backup)
                .with_context(|| format!("backing up schemas from {}", commons.display()))?;
            println!(
                "{} created, {} updated, {} unchanged",
                report.count(BackupOutcome::Created),
                report.count(BackupOutcome::Updated),
                report.count(BackupOutcome::Unchanged),
            );
            Ok(0)
        }

        #[cfg(feature = "service")]
        Command::Serve { addr, root } => {
            let catalogue = load_catalogue(&root, &config)
                .with_context(|| format!("loading catalogue from {}", root.display()))?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("starting async runtime")?;
            runtime
                .block_on(sourcecat::service::serve(addr, std::sync::Arc::new(catalogue)))
                .context("serving catalogue")?;
            Ok(0)
        }
    }
}

/// Print one source's derived topics with their schema pair.
fn print_source_topics(catalogue: &Catalogue, name: &str) -> Result<()> {
    let source = catalogue
        .sources()
        .find(|source| source.name().eq_ignore_ascii_case(name));
    let Some(source) = source else {
        bail!("source '{name}' not found in any scope");
    };

    println!("{} - {}", source.scope(), source.name());
    for topic in source.topics() {
        println!("- {} [{}: {}]", topic.name, topic.key_schema, topic.value_schema);
    }
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

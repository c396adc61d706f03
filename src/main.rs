//! Stache CLI
//!
//! Usage:
//!   stache [OPTIONS] [TEMPLATE]
//!
//! Options:
//!   -c, --config <FILE>    Project config (TOML format)
//!   -r, --root <DIR>       Directory partial patterns are matched against
//!   -p, --partials <GLOB>  Register matching files as partials (repeatable)
//!   -d, --data <FILE>      JSON data to render with
//!   --list                 Print registered partial names and exit
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use stache::{render_with_registry, StacheConfig};

#[derive(Parser)]
#[command(name = "stache")]
#[command(about = "Render text templates with named partials")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    template: Option<PathBuf>,

    /// Project config file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory partial patterns are matched against
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Glob pattern selecting partial files, relative to the root
    #[arg(short, long = "partials", value_name = "GLOB")]
    partials: Vec<String>,

    /// JSON data file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Print registered partial names and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STACHE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Load config, then let flags extend it
    let mut config = match &cli.config {
        Some(path) => match StacheConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => StacheConfig::default(),
    };
    if let Some(root) = cli.root {
        config.root = root;
    }
    config.patterns.extend(cli.partials);

    let registry = match config.build_registry() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return;
    }

    let data = match &cli.data {
        Some(path) => {
            let parsed = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str::<Value>(&s).map_err(|e| e.to_string()));
            match parsed {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("Error reading data '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => Value::Object(Default::default()),
    };

    // Read template
    let (source, filename) = match &cli.template {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    match render_with_registry(&source, &data, &registry, &config.render) {
        Ok(out) => print!("{}", out),
        Err(stache::StacheError::Parse(errors)) => {
            for error in errors {
                eprint!("{}", error.format(&source, &filename));
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

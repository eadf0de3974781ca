//! `purc-ejson-dump`: read an EJSON/JSONEE document, tokenize it, and
//! print the resulting VCM tree.

mod config;
mod vcm_render;

use clap::{Parser, ValueEnum};
use config::FileConfig;
use purc_core::AtomTable;
use purc_ejson::{Tokenizer, TokenizerConfig};
use std::io::Read;
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "purc-ejson-dump")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tokenize an EJSON/JSONEE document and print its VCM tree", long_about = None)]
struct Cli {
    /// Input file; reads stdin when omitted
    input: Option<PathBuf>,

    /// TOML file overriding tokenizer knobs (max_depth, line_cache_capacity)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Debug)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed Rust debug form of the VCM tree
    Debug,
    /// Re-serialize a fully-literal document back to canonical EJSON text
    Stringify,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let source = match read_input(cli.input.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let mut tokenizer_config = TokenizerConfig::default();
    if let Some(config_path) = &cli.config {
        match FileConfig::load(config_path) {
            Ok(overrides) => tokenizer_config = overrides.apply(tokenizer_config),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    }

    info!(max_depth = tokenizer_config.max_depth, "tokenizing input");

    let mut tokenizer = Tokenizer::new(tokenizer_config);
    let mut atoms = AtomTable::new();
    let node = match tokenizer.tokenize(&source, &mut atoms) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("tokenizer error: {e}");
            process::exit(1);
        }
    };

    match cli.format {
        OutputFormat::Debug => println!("{node:#?}"),
        OutputFormat::Stringify => match vcm_render::literal_to_variant(&node) {
            Ok(v) => println!("{}", purc_core::stringify(&v, 0)),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
    }
}

fn read_input(path: Option<&std::path::Path>) -> Result<String, String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("reading stdin: {e}"))?;
            Ok(buf)
        }
    }
}

/// Installs a `tracing_subscriber::fmt` subscriber whose filter defaults
/// to `info`, escalated to `trace` for the `purc_ejson` target when
/// `PURC_ENVV_EJSON_LOG_ENABLE` is set.
fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env().add_directive("purc_cli=info".parse().unwrap());
    if std::env::var_os("PURC_ENVV_EJSON_LOG_ENABLE").is_some() {
        filter = filter.add_directive("purc_ejson=trace".parse().unwrap());
    } else {
        filter = filter.add_directive("purc_ejson=info".parse().unwrap());
    }
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

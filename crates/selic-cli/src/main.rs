//! selic CLI - content-adaptive image compression
//!
//! Runs one pipeline operation on a file and prints the JSON response.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use selic_core::api::{self, ErrorResponse, ImageUpload};
use selic_core::{ConfigError, PipelineConfig, PipelineError, Processor};

const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Analyze an image, pick per-image encoder settings, and compress it.
#[derive(Parser, Debug)]
#[command(name = "selic")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    selic analyze photo.jpg                     Print statistics and planned settings
    selic compress photo.png -o photo.webp      Compress and write the encoded image
    selic --config selic.toml process photo.jpg Compress and suggest a caption
    RUST_LOG=debug selic analyze photo.jpg      Log every pipeline stage")]
struct Cli {
    /// Pipeline config (TOML); defaults apply to missing keys
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode, measure, classify and plan without encoding
    Analyze(InputArgs),
    /// Run the full pipeline and report compression statistics
    Compress(InputArgs),
    /// Compress and add caption and hashtag suggestions
    Process(InputArgs),
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Input image file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// MIME type of the input (sniffed from the file contents when omitted)
    #[arg(long, value_name = "MIME")]
    content_type: Option<String>,

    /// Write the encoded image here (compress and process only)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to serialize response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("--output is not supported by analyze")]
    OutputWithoutEncoding,
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(CliError::Pipeline(err)) => {
            let response = ErrorResponse::from(&err);
            match serde_json::to_string_pretty(&response) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{err}"),
            }
            ExitCode::from(1)
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(2)
        }
    }
}

/// Execute the command and return the JSON to print.
fn run(cli: &Cli) -> Result<String, CliError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    let processor = Processor::new(config)?;

    match &cli.command {
        Command::Analyze(args) => {
            if args.output.is_some() {
                return Err(CliError::OutputWithoutEncoding);
            }
            let upload = read_upload(args)?;
            let response = api::handle_analyze(&processor, &upload)?;
            to_json(&response, args.compact)
        }
        Command::Compress(args) => {
            let upload = read_upload(args)?;
            let (response, encoded) = api::handle_compress(&processor, &upload)?;
            write_encoded(args, &encoded)?;
            to_json(&response, args.compact)
        }
        Command::Process(args) => {
            let upload = read_upload(args)?;
            let (response, encoded) = api::handle_process(&processor, &upload)?;
            write_encoded(args, &encoded)?;
            to_json(&response, args.compact)
        }
    }
}

fn load_config(path: &Path) -> Result<PipelineConfig, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content).map_err(|source| CliError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_config(content: &str) -> Result<PipelineConfig, toml::de::Error> {
    toml::from_str(content)
}

fn read_upload(args: &InputArgs) -> Result<ImageUpload, CliError> {
    let bytes = fs::read(&args.input).map_err(|source| CliError::Read {
        path: args.input.clone(),
        source,
    })?;
    let content_type = args
        .content_type
        .clone()
        .unwrap_or_else(|| sniff_content_type(&bytes).to_string());
    log::debug!(
        "read {} ({} bytes, {})",
        args.input.display(),
        bytes.len(),
        content_type
    );
    Ok(ImageUpload::new(content_type, bytes))
}

/// MIME type from magic bytes.
fn sniff_content_type(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(UNKNOWN_CONTENT_TYPE)
}

fn write_encoded(args: &InputArgs, encoded: &[u8]) -> Result<(), CliError> {
    let Some(path) = &args.output else {
        return Ok(());
    };
    fs::write(path, encoded).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;
    log::info!("wrote {} bytes to {}", encoded.len(), path.display());
    Ok(())
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String, CliError> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

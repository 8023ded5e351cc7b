// ABOUTME: CLI for converting markup with the htmldp data processor.
// ABOUTME: Runs the editable, storage or round-trip transform over a file or stdin and prints the result.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use htmldp_processor::{ConfigFile, Context, DataProcessor, EditableOptions, EnterMode};
use tracing_subscriber::EnvFilter;

/// Convert raw markup to editable markup and editable markup to storage markup.
#[derive(Parser, Debug)]
#[command(name = "htmldp", version)]
#[command(about = "Normalize markup for editing and storage", long_about = None)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured enter mode.
    #[arg(long, value_enum, global = true)]
    enter_mode: Option<EnterModeArg>,

    /// Output file path (default: stdout).
    #[arg(short = 'o', long = "output", global = true)]
    output: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert raw markup into editable markup.
    Editable(EditableArgs),
    /// Convert editable markup into storage markup.
    Storage(InputArgs),
    /// Convert to editable markup and back to storage markup in one session.
    RoundTrip(EditableArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input file. Reads stdin when absent or "-".
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EditableArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Parse the markup as content of this tag instead of the editable tag.
    #[arg(long, conflicts_with = "no_context")]
    context: Option<String>,

    /// Parse the markup without any container.
    #[arg(long)]
    no_context: bool,

    /// Do not wrap bare inline content.
    #[arg(long)]
    no_fix_body: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EnterModeArg {
    P,
    Div,
    Br,
}

impl From<EnterModeArg> for EnterMode {
    fn from(mode: EnterModeArg) -> Self {
        match mode {
            EnterModeArg::P => EnterMode::P,
            EnterModeArg::Div => EnterMode::Div,
            EnterModeArg::Br => EnterMode::Br,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // -v enables DEBUG, otherwise RUST_LOG or WARN.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut processor = build_processor(&cli)?;

    let result = match &cli.command {
        Command::Editable(args) => {
            let data = read_input(&args.input)?;
            processor.to_editable_form(&data, &editable_options(args)?)
        }
        Command::Storage(args) => {
            let html = read_input(args)?;
            processor.to_storage_form(&html)
        }
        Command::RoundTrip(args) => {
            let data = read_input(&args.input)?;
            let editable = processor.to_editable_form(&data, &editable_options(args)?);
            tracing::debug!(editable = %editable, "Intermediate editable form");
            processor.to_storage_form(&editable)
        }
    };

    match &cli.output {
        Some(path) => fs::write(path, &result)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", result),
    }

    Ok(())
}

fn build_processor(cli: &Cli) -> Result<DataProcessor> {
    let mut builder = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ConfigFile::from_json(&json)?.into_builder()
        }
        None => DataProcessor::builder(),
    };
    if let Some(mode) = cli.enter_mode {
        builder = builder.enter_mode(mode.into());
    }
    Ok(builder.build()?)
}

fn editable_options(args: &EditableArgs) -> Result<EditableOptions> {
    let context = if args.no_context {
        Context::None
    } else if let Some(tag) = &args.context {
        Context::element(tag.as_str())?
    } else {
        Context::Editable
    };
    Ok(EditableOptions::default()
        .with_context(context)
        .fix_for_body(!args.no_fix_body))
}

fn read_input(args: &InputArgs) -> Result<String> {
    match &args.input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

//! jdelta command-line interface.
//!
//! Reads two JSON documents from the command line (or, with `--files`, from
//! the files they name), computes the structural delta between them and
//! prints it to stdout.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use jdelta::{
    filter_delta, format_delta, parse_document, parse_file, DiffConfig, DiffEngine,
    FilterConfig, JdeltaError, Node, OutputFormat, OutputOptions,
};
use std::path::Path;
use std::process;

/// Exit status when the documents differ and `--exit-code` is set.
const EXIT_DIFFERENT: i32 = 1;
/// Exit status for usage, parse and output errors.
const EXIT_ERROR: i32 = 2;

/// jdelta - structural diff for JSON documents
///
/// Prints the delta turning LEFT into RIGHT in jsondiffpatch format, or `{}`
/// when they are equal.
#[derive(Parser)]
#[command(name = "jdelta")]
#[command(version)]
#[command(about = "Structural diff for JSON documents", long_about = None)]
struct Cli {
    /// The two JSON documents to compare: LEFT RIGHT
    #[arg(value_name = "JSON", num_args = 0.., allow_negative_numbers = true)]
    documents: Vec<String>,

    /// Treat arguments as file paths (JSON, YAML or TOML)
    #[arg(long)]
    files: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "json")]
    format: OutputFormatArg,

    /// Report moved array items as a removal plus an addition
    #[arg(long)]
    no_moves: bool,

    /// Include the moved value in move entries
    #[arg(long)]
    include_value_on_move: bool,

    /// Object field that identifies array items (e.g. "id")
    #[arg(long, value_name = "FIELD")]
    object_hash: Option<String>,

    /// Do not pair containers at the same array index
    #[arg(long)]
    no_position_match: bool,

    /// Ignore whitespace differences in strings
    #[arg(long)]
    ignore_whitespace: bool,

    /// Treat null values as missing keys
    #[arg(long)]
    null_as_missing: bool,

    /// Drop changes under this path pattern (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    ignore_patterns: Vec<String>,

    /// Keep only changes under this path pattern (repeatable)
    #[arg(long = "only", value_name = "PATTERN")]
    only_patterns: Vec<String>,

    /// Show full values instead of previews
    #[arg(long)]
    show_values: bool,

    /// Maximum length for displayed values
    #[arg(long, default_value = "80")]
    max_value_length: usize,

    /// Exit with status 1 when the documents differ
    #[arg(long)]
    exit_code: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress the summary line)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// Pretty-printed delta JSON
    Json,
    /// Single-line delta JSON
    Compact,
    /// Colored change listing
    Terminal,
    /// Change listing without colors
    Plain,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Compact => OutputFormat::Compact,
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Plain => OutputFormat::Plain,
        }
    }
}

impl Cli {
    fn diff_config(&self) -> DiffConfig {
        DiffConfig {
            detect_moves: !self.no_moves,
            include_value_on_move: self.include_value_on_move,
            match_by_position: !self.no_position_match,
            object_hash: self.object_hash.clone(),
            ignore_whitespace: self.ignore_whitespace,
            treat_null_as_missing: self.null_as_missing,
        }
    }

    fn filter_config(&self) -> FilterConfig {
        let config = self
            .ignore_patterns
            .iter()
            .fold(FilterConfig::new(), |config, pattern| config.ignore(pattern));
        self.only_patterns
            .iter()
            .fold(config, |config, pattern| config.only(pattern))
    }

    fn output_options(&self) -> OutputOptions {
        OutputOptions {
            show_values: self.show_values,
            max_value_length: self.max_value_length,
            show_summary: !self.quiet,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(EXIT_ERROR);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let (left, right) = match cli.documents.as_slice() {
        [left, right] => (left, right),
        other => {
            return Err(JdeltaError::ArgumentCount {
                expected: 2,
                found: other.len(),
            }
            .into())
        }
    };

    let old = load(left, "left", cli.files).context("Failed to parse first document")?;
    let new = load(right, "right", cli.files).context("Failed to parse second document")?;

    log::debug!("computing delta ({} vs {})", old.type_name(), new.type_name());
    let engine = DiffEngine::new(cli.diff_config());
    let delta = filter_delta(engine.diff(&old, &new), &cli.filter_config());

    let output = format_delta(delta.as_ref(), cli.format.into(), &cli.output_options())
        .context("Failed to format delta")?;
    println!("{}", output);

    if cli.exit_code && delta.is_some() {
        Ok(EXIT_DIFFERENT)
    } else {
        Ok(0)
    }
}

fn load(argument: &str, side: &str, from_file: bool) -> Result<Node, JdeltaError> {
    if from_file {
        log::debug!("reading {} document from {}", side, argument);
        Ok(parse_file(Path::new(argument))?)
    } else {
        Ok(parse_document(argument, &format!("{} document", side))?)
    }
}

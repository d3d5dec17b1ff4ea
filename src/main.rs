/*!
Main binary for jsonsift.
*/

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::generate;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use memmap2::Mmap;
use std::io::{self, IsTerminal, Read, Write, stdout};
use std::ops::Deref;
use std::{fs::File, path::PathBuf};

use jsonsift::reader::{DEFAULT_MAX_DEPTH, JsonError, Limits};
use jsonsift::{Extractor, ExtractorCache, ScalarProjection, utils};

/// Extract values from JSON documents with a JSONPath expression.
#[derive(Parser)]
#[command(name = "jsift", version, about, arg_required_else_help = true, long_about = None, disable_help_subcommand = true)]
struct Args {
    /// Optional subcommands
    #[command(subcommand)]
    command: Option<Commands>,
    /// Path expression (e.g., "$.store.book[*].price")
    path: Option<String>,
    #[arg(value_name = "FILE")]
    /// Optional path to JSON file. If omitted, reads from STDIN
    input: Option<PathBuf>,
    /// Do not pretty-print the JSON output, instead use compact
    #[arg(long, action = ArgAction::SetTrue)]
    compact: bool,
    /// Display count of number of matches
    #[arg(long, action = ArgAction::SetTrue)]
    count: bool,
    /// Print a single scalar per document: strings unescaped, nothing for
    /// null, containers or multiple matches
    #[arg(short, long, action = ArgAction::SetTrue)]
    scalar: bool,
    /// Treat the input as newline-delimited JSON, one document per line.
    /// Malformed lines are reported on STDERR and skipped
    #[arg(short, long, action = ArgAction::SetTrue)]
    lines: bool,
    /// Print the compiled path as JSON and exit
    #[arg(long, action = ArgAction::SetTrue)]
    explain: bool,
    /// Reject documents nested deeper than this
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Do not display matched JSON values
    #[arg(short, long, action = ArgAction::SetTrue)]
    no_display: bool,
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

/// Available subcommands for `jsift`
#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions for the given shell to stdout.
    Completions { shell: clap_complete::Shell },
}

/// Input bytes, memory-mapped for files and buffered for STDIN.
enum Input {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl Deref for Input {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mapped(map) => map,
            Self::Buffered(buf) => buf,
        }
    }
}

/// Entry point for main binary.
///
/// This compiles the path and runs it over the input. If the input is piped
/// in, it reads from STDIN. Matches are printed to STDOUT, with formatting
/// determined by the command line arguments.
fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    if let Some(Commands::Completions { shell }) = args.command {
        let mut cmd = Args::command();
        generate(shell, &mut cmd, "jsift", &mut stdout().lock());
        return Ok(());
    }

    let path = args.path.as_deref().ok_or_else(|| {
        anyhow::anyhow!("Path expression required unless using subcommand")
    })?;

    let cache = ExtractorCache::with_capacity(1)
        .with_limits(Limits { max_depth: args.max_depth });
    let extractor =
        cache.get_extractor(path).with_context(|| "Failed to parse path")?;

    if args.explain {
        println!("{}", serde_json::to_string_pretty(extractor.program())?);
        return Ok(());
    }

    let input = match read_input(args.input.as_ref())? {
        Some(input) => input,
        None => {
            // No piped input and no file specified
            let mut cmd = Args::command();
            return Ok(cmd.print_help()?);
        }
    };

    if args.lines {
        run_lines(&args, &extractor, &input)
    } else {
        let matches = run_document(&args, &extractor, &input)
            .with_context(|| "Failed to read JSON")?;
        if args.count {
            println!("Found matches: {matches}");
        }
        Ok(())
    }
}

/// Reads the input file or STDIN. Returns `None` when STDIN is a terminal.
fn read_input(path: Option<&PathBuf>) -> Result<Option<Input>> {
    if let Some(path) = path {
        let file = File::open(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;
        let len = file.metadata()?.len();
        if len == 0 {
            // Zero-length mappings are rejected on some platforms
            return Ok(Some(Input::Buffered(Vec::new())));
        }
        // SAFETY: the mapping is only read, and only for the duration of
        // this process; concurrent truncation of the file by another
        // process is outside what this tool guards against.
        let map = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to map file {}", path.display()))?;
        return Ok(Some(Input::Mapped(map)));
    }

    if io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;
    Ok(Some(Input::Buffered(buffer)))
}

/// Runs the extractor over one document, printing as it goes. Returns the
/// number of matches.
fn run_document(args: &Args, extractor: &Extractor, document: &[u8]) -> Result<usize> {
    let mut out = stdout().lock();

    if args.scalar {
        let mut projection = ScalarProjection::default();
        let summary = extractor.extract(document, |node| projection.accept(node))?;
        if !args.no_display
            && let Some(value) = projection.into_value()
        {
            utils::write_line(&mut out, &value)?;
        }
        return Ok(summary.matches);
    }

    let summary = extractor.extract(document, |node| {
        if args.no_display {
            return Ok(());
        }
        utils::write_colored_match(&mut out, node, !args.compact)
    })?;
    out.flush()?;
    Ok(summary.matches)
}

/// Runs the extractor over every non-blank line. Malformed lines are
/// reported and skipped.
fn run_lines(args: &Args, extractor: &Extractor, input: &[u8]) -> Result<()> {
    let mut out = stdout().lock();
    let mut matches = 0;
    let mut rejected = 0;

    for (number, line) in input.split(|b| *b == b'\n').enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let result = if args.scalar {
            extractor.extract_scalar(line).map(|value| {
                (usize::from(value.is_some()), value.into_iter().collect::<Vec<_>>())
            })
        } else {
            extractor
                .extract_all(line)
                .map(|values| (values.len(), values))
        };

        match result {
            Ok((count, values)) => {
                matches += count;
                if !args.no_display {
                    for value in values {
                        utils::write_line(&mut out, &value)?;
                    }
                }
            }
            Err(err) => {
                rejected += 1;
                log_rejected(number + 1, &err);
            }
        }
    }

    if args.count {
        utils::write_line(&mut out, &format!("Found matches: {matches}"))?;
    }
    if rejected > 0 {
        log::info!("skipped {rejected} malformed line(s)");
    }
    Ok(())
}

fn log_rejected(line: usize, err: &JsonError) {
    eprintln!("jsift: line {line}: {err}");
}

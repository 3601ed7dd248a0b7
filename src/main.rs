//! clip2md - convert clipboard HTML to Pandoc-flavoured Markdown
//!
//! Reads a saved clipboard payload (raw HTML, a Windows `CF_HTML` dump or
//! plain text) from a file or stdin and writes Markdown to stdout or a file.
//!
//! ```text
//! clip2md paste.html
//! pbpaste -Prefer html | clip2md -o notes.md
//! clip2md --charset windows-1252 --no-tables legacy.htm
//! ```

use clap::{ArgAction, Parser};
use clipboard_markdown_converter::charset::{decode_clipboard_bytes, decode_with_label};
use clipboard_markdown_converter::clipboard::extract_fragment;
use clipboard_markdown_converter::{ConversionError, ConversionOptions, MarkdownConverter};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Convert clipboard HTML or plain text to Markdown
#[derive(Parser, Debug)]
#[command(name = "clip2md", author, version, about)]
struct Cli {
    /// Input file; `-` or no argument reads stdin
    input: Option<PathBuf>,

    /// Write Markdown to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Decode input with this encoding instead of detecting it
    #[arg(long, value_name = "LABEL")]
    charset: Option<String>,

    /// Keep office-suite markup instead of cleaning it
    #[arg(long = "no-clean", action = ArgAction::SetTrue)]
    no_clean: bool,

    /// Render HTML tables as plain paragraphs
    #[arg(long = "no-tables", action = ArgAction::SetTrue)]
    no_tables: bool,

    /// Skip the text-level table repair pass
    #[arg(long = "no-table-repair", action = ArgAction::SetTrue)]
    no_table_repair: bool,

    /// Leave Markdown syntax characters in text unescaped
    #[arg(long = "no-escape", action = ArgAction::SetTrue)]
    no_escape: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> ConversionOptions {
        ConversionOptions {
            clean_source: !self.no_clean,
            tables: !self.no_tables,
            repair_tables: !self.no_table_repair,
            escape_markdown: !self.no_escape,
        }
    }

    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("clip2md: {err}");
            ExitCode::from(err.code())
        }
    }
}

/// `RUST_LOG` wins over `-v` when set
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("clipboard_markdown_converter={default_level},clip2md={default_level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), ConversionError> {
    let bytes = read_input(cli.input.as_ref())?;
    tracing::debug!(bytes = bytes.len(), "read clipboard payload");

    let text = match &cli.charset {
        Some(label) => decode_with_label(&bytes, label)?,
        None => decode_clipboard_bytes(&bytes),
    };

    let converter = MarkdownConverter::with_options(cli.options());
    let mut markdown = converter.convert(extract_fragment(&text));
    markdown.push('\n');

    match &cli.output {
        Some(path) => fs::write(path, markdown)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(markdown.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn read_input(input: Option<&PathBuf>) -> Result<Vec<u8>, ConversionError> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read(path).map_err(|err| {
            ConversionError::Io(io::Error::new(
                err.kind(),
                format!("{}: {err}", path.display()),
            ))
        }),
        _ => {
            let mut bytes = Vec::new();
            io::stdin().lock().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
    }
}

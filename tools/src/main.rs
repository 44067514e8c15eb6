use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use srcz_tools::{
    compress_text, format_report_pretty, inspect_container, read_container, InspectReport,
};

#[derive(Parser)]
#[command(
    name = "srcz-tools",
    version,
    about = "srcz compressed-source inspection and conversion tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a UTF-8 source file into a container.
    Compress {
        /// Path to the source text.
        input: PathBuf,
        /// Path for the container output.
        output: PathBuf,
    },
    /// Inspect container structure and sizes.
    Inspect {
        /// Container file, or a directory of containers.
        path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = ReportFormat::Pretty)]
        format: ReportFormat,
    },
    /// Decompress a character range to stdout as UTF-8.
    Dump {
        /// Container file.
        path: PathBuf,
        /// First character of the range, in UTF-16 code units.
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Range length; the rest of the source when omitted.
        #[arg(long)]
        length: Option<usize>,
    },
    /// Report the line number of a character position.
    Line {
        /// Container file.
        path: PathBuf,
        /// Character position, in UTF-16 code units.
        #[arg(long)]
        pos: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Pretty,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Compress { input, output } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("read source {}", input.display()))?;
            let container = compress_text(&text);
            fs::write(&output, &container)
                .with_context(|| format!("write container {}", output.display()))?;
            println!(
                "{} chars -> {} bytes ({})",
                text.encode_utf16().count(),
                container.len(),
                output.display()
            );
        }
        Command::Inspect { path, glob, format } => {
            if path.is_dir() {
                let entries = collect_container_entries(&path, glob.as_deref())?;
                if entries.is_empty() {
                    bail!("no containers found under {}", path.display());
                }
                for entry in entries {
                    let report = load_report(&entry)?;
                    println!("== {} ==", entry.display());
                    print_report(&report, format)?;
                }
            } else {
                let report = load_report(&path)?;
                print_report(&report, format)?;
            }
        }
        Command::Dump { path, start, length } => {
            let bytes =
                fs::read(&path).with_context(|| format!("read container {}", path.display()))?;
            let source = read_container(&bytes)
                .with_context(|| format!("parse container {}", path.display()))?;
            let length = length.unwrap_or_else(|| source.char_length().saturating_sub(start));
            if start + length > source.char_length() {
                bail!(
                    "range {}+{} exceeds source length {}",
                    start,
                    length,
                    source.char_length()
                );
            }
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            source.dump(&mut out, start, length).context("write range")?;
            out.flush().context("flush stdout")?;
        }
        Command::Line { path, pos } => {
            let bytes =
                fs::read(&path).with_context(|| format!("read container {}", path.display()))?;
            let source = read_container(&bytes)
                .with_context(|| format!("parse container {}", path.display()))?;
            println!("{}", source.line_number_slow(pos));
        }
    }
    Ok(())
}

fn load_report(path: &Path) -> Result<InspectReport> {
    let bytes = fs::read(path).with_context(|| format!("read container {}", path.display()))?;
    inspect_container(&bytes).with_context(|| format!("parse container {}", path.display()))
}

fn print_report(report: &InspectReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Pretty => print!("{}", format_report_pretty(report)),
        ReportFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).context("serialize report")?
            );
        }
    }
    Ok(())
}

fn collect_container_entries(dir: &Path, filter: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = filter
        .map(Pattern::new)
        .transpose()
        .context("parse glob filter")?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))? {
        let entry = entry.context("read directory entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !pattern.matches(&name) {
                continue;
            }
        }
        entries.push(path);
    }
    entries.sort();
    Ok(entries)
}

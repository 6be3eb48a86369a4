#![allow(missing_docs)]
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use slicespec_core::merge::{MergeError, SourceDocument, merge};
use slicespec_core::{Criteria, Document, ToYaml, slice};
use tracing::{Level, error, info};

mod args;
use self::args::{AppArgs, Command, Format, HELP, MergeArgs, SliceArgs};

fn main() -> Result<ExitCode> {
    let AppArgs { verbose, command } = AppArgs::parse().context("parsing arguments")?;

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    match command {
        Command::Help => {
            io::stdout().write_all(HELP.as_bytes())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Slice(args) => run_slice(args),
        Command::Merge(args) => run_merge(args),
    }
}

fn run_slice(args: SliceArgs) -> Result<ExitCode> {
    let SliceArgs {
        input,
        mut criteria,
        criteria_file,
        output,
        format,
    } = args;

    let (mut document, input_format) = read_document(&input)?;
    if let Some(criteria_file) = criteria_file {
        let text = fs::read_to_string(&criteria_file)
            .with_context(|| format!("reading {}", criteria_file.display()))?;
        let from_file = Criteria::from_yaml(&text)
            .with_context(|| format!("parsing criteria {}", criteria_file.display()))?;
        criteria.extend(from_file);
    }

    let report = slice(&mut document, &criteria)
        .with_context(|| format!("slicing {}", input.display()))?;
    if report.is_empty_result() {
        info!(%criteria, "no operation matched");
    }

    let format = output_format(format, output.as_deref(), input_format);
    write_document(&document, format, output.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

fn run_merge(args: MergeArgs) -> Result<ExitCode> {
    let MergeArgs {
        inputs,
        output,
        format,
    } = args;

    let mut loaded = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let (document, input_format) = read_document(input)?;
        loaded.push((input.display().to_string(), document, input_format));
    }
    let sources: Vec<_> = loaded
        .iter()
        .map(|(origin, document, _)| SourceDocument::new(origin, document))
        .collect();

    let merged = match merge(&sources) {
        Ok(merged) => merged,
        Err(MergeError::Conflicts { conflicts }) => {
            let mut stderr = io::stderr().lock();
            for conflict in &conflicts {
                writeln!(stderr, "{conflict}")?;
            }
            error!(count = conflicts.len(), "merge aborted");
            return Ok(ExitCode::FAILURE);
        }
        Err(error) => return Err(error).context("merging documents"),
    };

    let input_format = loaded
        .first()
        .map_or(Format::Json, |(_, _, input_format)| *input_format);
    let format = output_format(format, output.as_deref(), input_format);
    write_document(&merged, format, output.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

fn read_document(path: &Path) -> Result<(Document, Format)> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let format = Format::from_path(path).unwrap_or(Format::Json);
    let document = match format {
        Format::Json => Document::from_json(&text),
        Format::Yaml => Document::from_yaml(&text),
    }
    .with_context(|| format!("parsing {}", path.display()))?;
    Ok((document, format))
}

fn output_format(requested: Option<Format>, output: Option<&Path>, input: Format) -> Format {
    requested
        .or_else(|| output.and_then(Format::from_path))
        .unwrap_or(input)
}

fn write_document(document: &Document, format: Format, output: Option<&Path>) -> Result<()> {
    let mut text = match format {
        Format::Json => document.to_json_pretty()?,
        Format::Yaml => document.to_yaml()?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "document written");
        }
        None => io::stdout().lock().write_all(text.as_bytes())?,
    }
    Ok(())
}

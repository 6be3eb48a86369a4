use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use slicespec_core::Criteria;

pub(crate) const HELP: &str = "\
slicespec - slice and merge OpenAPI specifications

USAGE:
  slicespec slice <INPUT> [OPTIONS]
  slicespec merge <INPUT>... [OPTIONS]

SLICE OPTIONS:
  --operation-id <ID>     Keep the operation with this id (repeatable)
  --tag <TAG>             Keep the operations listing this tag (repeatable)
  --path <PATTERN>        Keep the operations of this path, placeholder names ignored (repeatable)
  --criteria <FILE>       Read more criteria from a JSON or YAML file

COMMON OPTIONS:
  -o, --output <FILE>     Write the result to FILE instead of stdout
  --format <json|yaml>    Output format, defaults to the output extension or the input format
  -v, --verbose           Log every decision
  -h, --help              Print this help
";

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Guesses the format from a file extension.
    pub(crate) fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(OsStr::to_str)?;
        if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml") {
            Some(Self::Yaml)
        } else {
            None
        }
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(UnknownFormat(format.to_string())),
        }
    }
}

#[derive(Debug)]
pub(crate) struct UnknownFormat(String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown format '{}', expected 'json' or 'yaml'", self.0)
    }
}

#[derive(Debug, PartialEq)]
pub(crate) struct SliceArgs {
    pub(crate) input: PathBuf,
    pub(crate) criteria: Criteria,
    pub(crate) criteria_file: Option<PathBuf>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) format: Option<Format>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct MergeArgs {
    pub(crate) inputs: Vec<PathBuf>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) format: Option<Format>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Command {
    Slice(SliceArgs),
    Merge(MergeArgs),
    Help,
}

#[derive(Debug)]
pub(crate) struct AppArgs {
    pub(crate) verbose: bool,
    pub(crate) command: Command,
}

impl AppArgs {
    pub(crate) fn parse() -> Result<Self> {
        Self::parse_from(pico_args::Arguments::from_env())
    }

    fn parse_from(mut pargs: pico_args::Arguments) -> Result<Self> {
        // Global flags may come before the subcommand
        let help = pargs.contains(["-h", "--help"]);
        let verbose = pargs.contains(["-v", "--verbose"]);
        let subcommand = pargs.subcommand().context("parsing subcommand")?;

        let command = match subcommand.as_deref() {
            _ if help => Command::Help,
            Some("help") => Command::Help,
            None => {
                if let Some(first) = pargs.finish().first() {
                    bail!(
                        "unexpected argument {} before the subcommand",
                        first.to_string_lossy()
                    );
                }
                Command::Help
            }
            Some("slice") => Command::Slice(parse_slice(pargs)?),
            Some("merge") => Command::Merge(parse_merge(pargs)?),
            Some(other) => bail!("unknown subcommand '{other}', expected 'slice' or 'merge'"),
        };

        Ok(Self { verbose, command })
    }
}

fn parse_slice(mut pargs: pico_args::Arguments) -> Result<SliceArgs> {
    let mut criteria = Criteria::new();
    for operation_id in pargs
        .values_from_str::<_, String>("--operation-id")
        .context("parsing operation id argument")?
    {
        criteria = criteria.with_operation_id(operation_id);
    }
    for tag in pargs
        .values_from_str::<_, String>("--tag")
        .context("parsing tag argument")?
    {
        criteria = criteria.with_tag(tag);
    }
    for path in pargs
        .values_from_str::<_, String>("--path")
        .context("parsing path argument")?
    {
        criteria = criteria.with_path(path);
    }
    let criteria_file = pargs
        .opt_value_from_os_str("--criteria", to_path)
        .context("parsing criteria argument")?;
    let output = pargs
        .opt_value_from_os_str(["-o", "--output"], to_path)
        .context("parsing output argument")?;
    let format = pargs
        .opt_value_from_str("--format")
        .context("parsing format argument")?;

    let mut inputs = free_paths(pargs)?;
    let Some(input) = inputs.pop() else {
        bail!("missing input file");
    };
    if !inputs.is_empty() {
        bail!("expected a single input file, got {}", inputs.len() + 1);
    }

    Ok(SliceArgs {
        input,
        criteria,
        criteria_file,
        output,
        format,
    })
}

fn parse_merge(mut pargs: pico_args::Arguments) -> Result<MergeArgs> {
    let output = pargs
        .opt_value_from_os_str(["-o", "--output"], to_path)
        .context("parsing output argument")?;
    let format = pargs
        .opt_value_from_str("--format")
        .context("parsing format argument")?;

    let inputs = free_paths(pargs)?;
    if inputs.is_empty() {
        bail!("missing input files");
    }

    Ok(MergeArgs {
        inputs,
        output,
        format,
    })
}

fn to_path(value: &OsStr) -> Result<PathBuf, std::convert::Infallible> {
    Ok(PathBuf::from(value))
}

fn free_paths(pargs: pico_args::Arguments) -> Result<Vec<PathBuf>> {
    let remaining: Vec<OsString> = pargs.finish();
    let mut paths = Vec::with_capacity(remaining.len());
    for argument in remaining {
        if argument.to_str().is_some_and(|text| text.starts_with('-')) {
            bail!("unknown option {}", argument.to_string_lossy());
        }
        paths.push(PathBuf::from(argument));
    }
    Ok(paths)
}

use std::path::PathBuf;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use strum::IntoEnumIterator;
use stridebuf::{make_view, AnyView, ElementKind, RawBuffer, Value, ViewDescriptor};

pub fn start_logger(level: log::LevelFilter) {
    let logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply();
    match logger {
        Ok(_) => log::info!("Logging initialized."),
        Err(error) => eprintln!("Error initializing logging: {:?}", error),
    }
}

type SliceRange = (Option<isize>, Option<isize>);

/// Parses `START:END`, where either side may be empty or negative.
fn parse_slice(s: &str) -> Result<SliceRange, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("Expected START:END, got {:?}", s))?;
    let bound = |part: &str| -> Result<Option<isize>, String> {
        match part.trim() {
            "" => Ok(None),
            n => n
                .parse::<isize>()
                .map(Some)
                .map_err(|e| format!("Invalid slice bound {:?}: {}", n, e)),
        }
    };
    Ok((bound(start)?, bound(end)?))
}

#[derive(Debug, Serialize)]
struct Report {
    file: PathBuf,
    kind: ElementKind,
    width: usize,
    buffer_length: usize,
    descriptor: ViewDescriptor,
    len: usize,
    byte_length: usize,
    values: Vec<Value>,
}

impl Report {
    fn new(file: PathBuf, view: &AnyView) -> Self {
        let kind = view.kind();
        Self {
            file,
            kind,
            width: kind.size_of(),
            buffer_length: view.buffer().byte_length(),
            descriptor: view.descriptor(),
            len: view.len(),
            byte_length: view.byte_length(),
            values: view.to_vec(),
        }
    }

    fn print_text(&self) {
        println!("file:          {}", self.file.display());
        println!("kind:          {} ({} bytes)", self.kind, self.width);
        println!("buffer length: {}", self.buffer_length);
        println!("byte offset:   {}", self.descriptor.byte_offset());
        println!("stride:        {}", self.descriptor.stride());
        println!("length:        {}", self.len);
        println!("byte length:   {}", self.byte_length);
        let values = self
            .values
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("values:        [{}]", values);
    }
}

fn handle_inspect(matches: &ArgMatches) -> anyhow::Result<()> {
    let file = matches
        .get_one::<PathBuf>("file")
        .context("No input file given")?
        .clone();
    let kind = *matches
        .get_one::<ElementKind>("kind")
        .context("No element kind given")?;
    let byte_offset = matches.get_one::<usize>("offset").copied().unwrap_or(0);
    let count = matches.get_one::<usize>("count").copied();
    let stride = matches.get_one::<usize>("stride").copied();

    let bytes = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    log::info!("Read {} bytes from {}", bytes.len(), file.display());
    let buffer = RawBuffer::from(bytes);

    let mut view = make_view(kind, buffer, byte_offset, count, stride)?;
    if let Some(&(start, end)) = matches.get_one::<SliceRange>("slice") {
        view = view.slice(start, end);
    }

    let report = Report::new(file, &view);
    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_text();
    }
    Ok(())
}

fn domain(kind: ElementKind) -> &'static str {
    if kind.is_float() {
        "float"
    } else if kind.is_bigint() {
        "bigint"
    } else {
        "integer"
    }
}

fn handle_kinds() {
    for kind in ElementKind::iter() {
        println!("{:<14}{:<3}{}", kind.to_string(), kind.size_of(), domain(kind));
    }
}

fn main() -> anyhow::Result<()> {
    let matches = Command::new("stridebuf")
        .about("Strided views over raw binary files")
        .version("0.1.0")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity, repeat for more."),
        )
        .subcommand(
            Command::new("inspect")
                .long_about("Reads a file as a raw buffer and prints a typed, optionally strided view of it.")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the input file"),
                )
                .arg(
                    Arg::new("kind")
                        .short('k')
                        .long("kind")
                        .required(true)
                        .value_parser(|s: &str| s.parse::<ElementKind>())
                        .help("Element kind, e.g. float32 or bigint64."),
                )
                .arg(
                    Arg::new("offset")
                        .short('o')
                        .long("offset")
                        .default_value("0")
                        .value_parser(value_parser!(usize))
                        .help("Byte offset of the first element."),
                )
                .arg(
                    Arg::new("count")
                        .short('c')
                        .long("count")
                        .value_parser(value_parser!(usize))
                        .help("Element count. Only bounds dense views."),
                )
                .arg(
                    Arg::new("stride")
                        .short('s')
                        .long("stride")
                        .value_parser(value_parser!(usize))
                        .help("Distance between elements, in elements."),
                )
                .arg(
                    Arg::new("slice")
                        .long("slice")
                        .value_parser(parse_slice)
                        .allow_hyphen_values(true)
                        .help("Copy out START:END of the view, negative bounds count from the end."),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON."),
                ),
        )
        .subcommand(
            Command::new("kinds").about("List every element kind with its width in bytes and value domain."),
        )
        .get_matches();

    let level = match matches.get_count("verbose") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    start_logger(level);

    if let Some(matches) = matches.subcommand_matches("inspect") {
        handle_inspect(matches)?;
    } else if matches.subcommand_matches("kinds").is_some() {
        handle_kinds();
    }
    Ok(())
}

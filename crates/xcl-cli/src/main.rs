//! xcl CLI - streaming CSV and XLSX conversion with column expressions

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::PathBuf;
use xcl::prelude::*;
use xcl::LineTerminator;

#[derive(Parser)]
#[command(name = "xcl")]
#[command(
    author,
    version,
    about = "Stream cells between CSV and XLSX, rewriting columns with expressions"
)]
struct Cli {
    /// Log more (repeat for more detail; RUST_LOG overrides)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Without a subcommand, `read` runs with these arguments
    #[command(flatten)]
    read: ReadArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a sheet from an XLSX workbook and write it as CSV (default)
    Read(ReadArgs),

    /// Read CSV and write it as a single-sheet XLSX workbook
    Create {
        /// Name of the written sheet
        #[arg(short, long, default_value = "tab1")]
        tab: String,

        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        input: CsvInputArgs,

        /// Output columns as expressions over the input ($0, $1, ...)
        columns: Vec<String>,
    },

    /// Convert between any two formats, chosen by file extension
    Convert {
        /// Sheet to read and to write (default: first sheet / tab1)
        #[arg(short, long)]
        tab: Option<String>,

        #[command(flatten)]
        io: IoArgs,

        /// Input format, required when reading stdin
        #[arg(long, value_enum)]
        from: Option<FormatArg>,

        /// Output format, required when writing stdout
        #[arg(long, value_enum)]
        to: Option<FormatArg>,

        #[command(flatten)]
        window: WindowArgs,

        /// Field delimiter for CSV on either side
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// End CSV output records with LF instead of CRLF
        #[arg(long)]
        lf: bool,

        /// Detect numbers and booleans in CSV input
        #[arg(long)]
        infer_types: bool,

        /// Output columns as expressions over the input ($0, $1, ...)
        columns: Vec<String>,
    },
}

#[derive(Args)]
struct ReadArgs {
    /// Sheet to read
    #[arg(short, long, default_value = "tab1")]
    tab: String,

    #[command(flatten)]
    io: IoArgs,

    #[command(flatten)]
    window: WindowArgs,

    #[command(flatten)]
    output: CsvOutputArgs,

    /// Output columns as expressions over the input ($0, $1, ...)
    columns: Vec<String>,
}

#[derive(Args)]
struct IoArgs {
    /// Input file (default: stdin)
    #[arg(short = 'i', long = "in")]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "out")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct WindowArgs {
    /// First cell to read, as A1 or R1C1
    #[arg(long)]
    start: Option<String>,

    /// Last cell to read, as A1 or R1C1
    #[arg(long)]
    end: Option<String>,

    /// Drop the first row of the window
    #[arg(long)]
    no_header: bool,
}

impl WindowArgs {
    fn window(&self) -> Window {
        Window::from_literals(
            self.start.as_deref().unwrap_or(""),
            self.end.as_deref().unwrap_or(""),
            self.no_header,
        )
    }
}

#[derive(Args)]
struct CsvOutputArgs {
    /// Field delimiter
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// End records with CRLF (default)
    #[arg(long, conflicts_with = "lf")]
    crlf: bool,

    /// End records with LF
    #[arg(long)]
    lf: bool,
}

impl CsvOutputArgs {
    fn options(&self) -> Result<CsvWriteOptions> {
        Ok(CsvWriteOptions {
            delimiter: ascii(self.delimiter, "delimiter")?,
            line_terminator: terminator(self.lf),
            ..CsvWriteOptions::default()
        })
    }
}

#[derive(Args)]
struct CsvInputArgs {
    /// Field delimiter
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// Quote character
    #[arg(long, default_value = "\"")]
    quote: char,

    /// Escape character inside quoted fields (default: doubled quotes)
    #[arg(long)]
    escape: Option<char>,

    /// Skip lines starting with this character
    #[arg(long)]
    comment: Option<char>,

    /// Detect numbers and booleans instead of reading text
    #[arg(long)]
    infer_types: bool,
}

impl CsvInputArgs {
    fn options(&self) -> Result<CsvReadOptions> {
        Ok(CsvReadOptions {
            delimiter: ascii(self.delimiter, "delimiter")?,
            quote: Some(ascii(self.quote, "quote")?),
            escape: self.escape.map(|c| ascii(c, "escape")).transpose()?,
            comment: self.comment.map(|c| ascii(c, "comment")).transpose()?,
            infer_types: self.infer_types,
            ..CsvReadOptions::default()
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Xlsx,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Format::Csv,
            FormatArg::Xlsx => Format::Xlsx,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.unwrap_or(Commands::Read(cli.read)) {
        Commands::Read(ReadArgs {
            tab,
            io,
            window,
            output,
            columns,
        }) => {
            let mut source = Source::new(Location::from_arg(io.input), Format::Xlsx);
            source.window = window.window();
            source.xlsx = XlsxReadOptions::sheet(tab.as_str());

            let mut sink = Sink::new(Location::from_arg(io.output), Format::Csv);
            sink.csv = output.options()?;

            info!("tab: {}", tab);
            run_conversion(&source, &sink, &columns)
        }

        Commands::Create {
            tab,
            io,
            window,
            input,
            columns,
        } => {
            let mut source = Source::new(Location::from_arg(io.input), Format::Csv);
            source.window = window.window();
            source.csv = input.options()?;

            let mut sink = Sink::new(Location::from_arg(io.output), Format::Xlsx);
            sink.xlsx = XlsxWriteOptions::sheet(tab.as_str());

            info!("tab: {}", tab);
            run_conversion(&source, &sink, &columns)
        }

        Commands::Convert {
            tab,
            io,
            from,
            to,
            window,
            delimiter,
            lf,
            infer_types,
            columns,
        } => {
            let input = Location::from_arg(io.input);
            let output = Location::from_arg(io.output);
            let delimiter = ascii(delimiter, "delimiter")?;

            let mut source = Source::new(input.clone(), format_for(&input, from, "--from")?);
            source.window = window.window();
            source.csv.delimiter = delimiter;
            source.csv.infer_types = infer_types;
            source.xlsx.sheet = tab.clone();

            let mut sink = Sink::new(output.clone(), format_for(&output, to, "--to")?);
            sink.csv.delimiter = delimiter;
            sink.csv.line_terminator = terminator(lf);
            if let Some(tab) = tab {
                sink.xlsx = XlsxWriteOptions::sheet(tab);
            }

            run_conversion(&source, &sink, &columns)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run_conversion(source: &Source, sink: &Sink, columns: &[String]) -> Result<()> {
    info!("in: {}", source.location);
    info!("out: {}", sink.location);

    let stats = convert(source, sink, columns)
        .with_context(|| format!("Failed to convert {} into {}", source.location, sink.location))?;

    if let Some(message) = missing_source_warning(source, &stats) {
        warn!("{}", message);
    }
    info!(
        "{} cells read, {} cells in {} rows written",
        stats.cells_read, stats.cells_written, stats.rows_written
    );
    Ok(())
}

fn missing_source_warning(source: &Source, stats: &RunStats) -> Option<String> {
    stats
        .source_missing
        .as_ref()
        .map(|sheet| format!("{}: no sheet named '{}', output is empty", source.location, sheet))
}

fn format_for(location: &Location, explicit: Option<FormatArg>, flag: &str) -> Result<Format> {
    match (explicit, location) {
        (Some(format), _) => Ok(format.into()),
        (None, Location::Path(path)) => Ok(Format::from_path(path)?),
        (None, Location::Stdio) => bail!("{} is required when using standard streams", flag),
    }
}

fn terminator(lf: bool) -> LineTerminator {
    if lf {
        LineTerminator::LF
    } else {
        LineTerminator::CRLF
    }
}

fn ascii(c: char, what: &str) -> Result<u8> {
    if !c.is_ascii() {
        bail!("{} must be a single ASCII character, got '{}'", what, c);
    }
    Ok(c as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_read_arguments() {
        let cli = Cli::try_parse_from([
            "xcl", "-vv", "read", "-t", "data", "-i", "in.xlsx", "--start", "B2", "--no-header",
            "--lf", "$1", "$0 * 2",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Read(ReadArgs {
                tab,
                io,
                window,
                output,
                columns,
            })) => {
                assert_eq!(tab, "data");
                assert_eq!(io.input, Some(PathBuf::from("in.xlsx")));
                assert_eq!(io.output, None);
                assert!(window.no_header);
                assert_eq!(window.window().start, Address::new(1, 1));
                assert_eq!(output.options().unwrap().line_terminator, LineTerminator::LF);
                assert_eq!(columns, vec!["$1", "$0 * 2"]);
            }
            _ => panic!("expected read"),
        }
    }

    #[test]
    fn test_read_is_the_default_command() {
        let cli = Cli::try_parse_from(["xcl", "-t", "data", "--lf", "$1", "$0"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.read.tab, "data");
        assert_eq!(cli.read.io.input, None);
        assert_eq!(cli.read.output.options().unwrap().line_terminator, LineTerminator::LF);
        assert_eq!(cli.read.columns, vec!["$1", "$0"]);

        let bare = Cli::try_parse_from(["xcl"]).unwrap();
        assert!(bare.command.is_none());
        assert_eq!(bare.read.tab, "tab1");
        assert!(bare.read.columns.is_empty());
    }

    #[test]
    fn test_missing_sheet_warning() {
        let source = Source::new(Location::Path("book.xlsx".into()), Format::Xlsx);
        let mut stats = RunStats::default();
        assert_eq!(missing_source_warning(&source, &stats), None);

        stats.source_missing = Some("tab1".into());
        assert_eq!(
            missing_source_warning(&source, &stats).as_deref(),
            Some("book.xlsx: no sheet named 'tab1', output is empty")
        );
    }

    #[test]
    fn test_crlf_conflicts_with_lf() {
        assert!(Cli::try_parse_from(["xcl", "read", "--crlf", "--lf"]).is_err());
    }

    #[test]
    fn test_create_csv_options() {
        let cli = Cli::try_parse_from([
            "xcl", "create", "-d", ";", "--escape", "\\", "--comment", "#", "--infer-types",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Create { tab, input, .. }) => {
                assert_eq!(tab, "tab1");
                let options = input.options().unwrap();
                assert_eq!(options.delimiter, b';');
                assert_eq!(options.escape, Some(b'\\'));
                assert_eq!(options.comment, Some(b'#'));
                assert!(options.infer_types);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        assert!(ascii('§', "delimiter").is_err());
        assert_eq!(ascii('\t', "delimiter").unwrap(), b'\t');
    }

    #[test]
    fn test_format_for_stdio_needs_flag() {
        assert!(format_for(&Location::Stdio, None, "--from").is_err());
        assert_eq!(
            format_for(&Location::Stdio, Some(FormatArg::Xlsx), "--from").unwrap(),
            Format::Xlsx
        );
        assert_eq!(
            format_for(&Location::Path("a.csv".into()), None, "--to").unwrap(),
            Format::Csv
        );
    }
}

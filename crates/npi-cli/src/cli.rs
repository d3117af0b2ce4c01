//! CLI argument definitions for `npi-comp`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use npi_model::OutlierMethod;

use crate::pipeline::RunOverrides;

#[derive(Parser)]
#[command(
    name = "npi-comp",
    version,
    about = "NPI release comparability - label and compare sales orders of two releases",
    long_about = "Import sales-order extracts, aggregate them, label first orders,\n\
                  align the releases on a common year-week axis, flag outliers and\n\
                  write the comparability table read by the dashboard."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import, clean, shape and write the comparability table.
    Run(RunArgs),

    /// List the available outlier detection methods.
    Methods,
}

#[derive(Parser)]
pub struct RunArgs {
    /// TOML configuration file; relative paths inside it resolve against its folder.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Folder holding the order extracts.
    #[arg(long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Only import files whose name starts with this prefix.
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Import a single extract instead of scanning a folder.
    #[arg(long = "file", value_name = "FILE", conflicts_with_all = ["input_dir", "prefix"])]
    pub file: Option<PathBuf>,

    /// Output file; the extension selects xlsx, csv or parquet.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Area lookup table joined on dedalo_area.
    #[arg(long = "area-lookup", value_name = "FILE")]
    pub area_lookup: Option<PathBuf>,

    /// Worksheet of the area lookup workbook.
    #[arg(long = "lookup-sheet", value_name = "NAME", requires = "area_lookup")]
    pub lookup_sheet: Option<String>,

    /// Outlier detection method.
    #[arg(long = "method", value_enum)]
    pub method: Option<MethodArg>,

    /// Weeks after the first order that still count as first order.
    #[arg(long = "week-inside-first", value_name = "N")]
    pub week_inside_first: Option<u32>,

    /// Reference date for the till-today flag (default: the local date).
    #[arg(long = "today", value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Write the per-release summary as JSON.
    #[arg(long = "summary-json", value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// List the files that would be imported and stop.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl RunArgs {
    /// Values that take precedence over the configuration file.
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            input_dir: self.input_dir.clone(),
            prefix: self.prefix.clone(),
            file: self.file.clone(),
            output: self.output.clone(),
            area_lookup: self.area_lookup.clone(),
            lookup_sheet: self.lookup_sheet.clone(),
            method: self.method.map(OutlierMethod::from),
            week_inside_first: self.week_inside_first,
            today: self.today,
        }
    }
}

/// CLI outlier method choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Iqr,
    Mad,
    Iso,
    Svm,
}

impl From<MethodArg> for OutlierMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Iqr => OutlierMethod::Iqr,
            MethodArg::Mad => OutlierMethod::Mad,
            MethodArg::Iso => OutlierMethod::IsolationForest,
            MethodArg::Svm => OutlierMethod::OneClassSvm,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("npi-comp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_become_overrides() {
        let cli = parse(&[
            "run",
            "--config",
            "npi.toml",
            "--input-dir",
            "extracts",
            "--method",
            "iso",
            "--week-inside-first",
            "3",
            "--today",
            "2024-06-05",
            "-o",
            "out/df_comp.parquet",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, Some(PathBuf::from("npi.toml")));

        let overrides = args.overrides();
        assert_eq!(overrides.input_dir, Some(PathBuf::from("extracts")));
        assert_eq!(overrides.method, Some(OutlierMethod::IsolationForest));
        assert_eq!(overrides.week_inside_first, Some(3));
        assert_eq!(overrides.today, NaiveDate::from_ymd_opt(2024, 6, 5));
        assert_eq!(
            overrides.output,
            Some(PathBuf::from("out/df_comp.parquet"))
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["run", "--dry-run", "--log-format", "json", "-v"]);
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert!(cli.verbosity.is_present());
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.dry_run);
    }

    #[test]
    fn rejects_unknown_method_and_bad_date() {
        let base = ["npi-comp", "run", "--method", "zscore"];
        assert!(Cli::try_parse_from(base).is_err());
        let base = ["npi-comp", "run", "--today", "05/06/2024"];
        assert!(Cli::try_parse_from(base).is_err());
    }

    #[test]
    fn single_file_conflicts_with_folder_scan() {
        let args = ["npi-comp", "run", "--file", "a.csv", "--prefix", "Comp"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn folder_runs_always_combine_files() {
        let args = ["npi-comp", "run", "--no-aggregate"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn lookup_sheet_requires_lookup() {
        let args = ["npi-comp", "run", "--lookup-sheet", "AREAS"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn methods_subcommand() {
        assert!(matches!(parse(&["methods"]).command, Command::Methods));
    }
}

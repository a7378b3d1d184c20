use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dct",
    about = "Dictionary tools: flatten, filter, rename and merge JSON mappings",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TableFormat {
    Text,
    Csv,
}

#[derive(Subcommand)]
pub enum Command {
    /// Flatten a mapping (or an array of mappings) into compound keys
    Normalize(NormalizeArgs),
    /// Rebuild nested mappings from compound keys
    Unflatten(UnflattenArgs),
    /// Print the nesting depth of a mapping
    Depth(InputArgs),
    /// Keep only entries whose key contains a pattern
    Filter(FilterArgs),
    /// Find and replace text in keys
    Rename(RenameArgs),
    /// Swap top level and second level keys
    Swap(InputArgs),
    /// Merge mappings, later inputs win
    Merge(MergeArgs),
    /// Lay a mapping out as key/value column pairs
    Table(TableArgs),
    /// Convert CSV rows into JSON records
    Import(ImportArgs),
    /// Write JSON records as CSV, flattening nested values
    Export(ExportArgs),
}

/// A JSON input file; `-` reads stdin.
#[derive(Args)]
pub struct InputArgs {
    pub input: PathBuf,
}

#[derive(Args)]
pub struct NormalizeArgs {
    pub input: PathBuf,
    #[arg(short, long)]
    pub separator: Option<String>,
    #[arg(long)]
    pub drop_none: bool,
    /// TOML file with `separator` and `drop_none`
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct UnflattenArgs {
    pub input: PathBuf,
    #[arg(short, long, default_value = ".")]
    pub separator: String,
}

#[derive(Args)]
pub struct FilterArgs {
    pub input: PathBuf,
    #[arg(short, long)]
    pub pattern: String,
    #[arg(short = 'x', long = "except")]
    pub exceptions: Vec<String>,
}

#[derive(Args)]
pub struct RenameArgs {
    pub input: PathBuf,
    #[arg(short, long)]
    pub find: String,
    #[arg(short, long, default_value = "")]
    pub replace: String,
    #[arg(short = 'x', long = "except")]
    pub exceptions: Vec<String>,
}

#[derive(Args)]
pub struct MergeArgs {
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Merge depth-one nested mappings per top-level key
    #[arg(long)]
    pub nested: bool,
}

#[derive(Args)]
pub struct TableArgs {
    pub input: PathBuf,
    #[arg(short, long, default_value = "1")]
    pub columns: usize,
    /// JSON value for empty cells
    #[arg(long, default_value = "null")]
    pub fill: String,
    #[arg(long, default_value = "text")]
    pub format: TableFormat,
}

#[derive(Args)]
pub struct ImportArgs {
    pub csv: PathBuf,
    /// Split compound column names back into nested mappings
    #[arg(long)]
    pub unflatten: bool,
    #[arg(short, long, default_value = ".")]
    pub separator: String,
}

#[derive(Args)]
pub struct ExportArgs {
    pub input: PathBuf,
    pub csv: PathBuf,
    #[arg(short, long, default_value = ".")]
    pub separator: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_normalize_flags() {
        let cli = Cli::try_parse_from([
            "dct", "normalize", "in.json", "--separator", "__", "--drop-none",
        ])
        .unwrap();
        match cli.command {
            Command::Normalize(args) => {
                assert_eq!(args.input, PathBuf::from("in.json"));
                assert_eq!(args.separator.as_deref(), Some("__"));
                assert!(args.drop_none);
                assert!(args.config.is_none());
            }
            _ => panic!("expected normalize"),
        }
    }

    #[test]
    fn parses_repeated_exceptions() {
        let cli = Cli::try_parse_from([
            "dct", "filter", "-", "-p", "tweak_", "-x", "a", "--except", "b",
        ])
        .unwrap();
        match cli.command {
            Command::Filter(args) => assert_eq!(args.exceptions, vec!["a", "b"]),
            _ => panic!("expected filter"),
        }
    }

    #[test]
    fn table_defaults() {
        let cli = Cli::try_parse_from(["dct", "-v", "table", "m.json"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Table(args) => {
                assert_eq!(args.columns, 1);
                assert_eq!(args.fill, "null");
                assert_eq!(args.format, TableFormat::Text);
            }
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn merge_requires_inputs() {
        assert!(Cli::try_parse_from(["dct", "merge"]).is_err());
    }
}

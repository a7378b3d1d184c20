use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use dct_core::{
    depth, filter_keys, flat_aggregate, nested_aggregate, normalize, normalize_records,
    replace_keys, swap_keys, unflatten, value_kind, DctError, Mapping, NormalizeConfig,
};
use dct_table::{read_records_from_path, to_table, write_nested_records};
use serde_json::Value;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Normalize(args) => cmd_normalize(args),
        Command::Unflatten(args) => cmd_unflatten(args),
        Command::Depth(args) => cmd_depth(args),
        Command::Filter(args) => cmd_filter(args),
        Command::Rename(args) => cmd_rename(args),
        Command::Swap(args) => cmd_swap(args),
        Command::Merge(args) => cmd_merge(args),
        Command::Table(args) => cmd_table(args),
        Command::Import(args) => cmd_import(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    if path == Path::new("-") {
        return serde_json::from_reader(io::stdin().lock()).context("failed to parse JSON from stdin");
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse JSON in {}", path.display()))
}

fn into_mapping(value: Value, at: String) -> Result<Mapping, DctError> {
    match value {
        Value::Object(mapping) => Ok(mapping),
        other => Err(DctError::NotAMapping {
            at,
            found: value_kind(&other),
        }),
    }
}

fn read_mapping(path: &Path) -> anyhow::Result<Mapping> {
    Ok(into_mapping(read_json(path)?, path.display().to_string())?)
}

/// A single mapping or an array of mappings, remembering which it was.
struct Batch {
    mappings: Vec<Mapping>,
    is_array: bool,
}

impl Batch {
    fn read(path: &Path) -> anyhow::Result<Self> {
        match read_json(path)? {
            Value::Array(items) => {
                let mappings = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| into_mapping(item, format!("{}[{i}]", path.display())))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self {
                    mappings,
                    is_array: true,
                })
            }
            other => Ok(Self {
                mappings: vec![into_mapping(other, path.display().to_string())?],
                is_array: false,
            }),
        }
    }

    fn emit(self, mappings: Vec<Mapping>) -> anyhow::Result<()> {
        if self.is_array {
            print_json(&Value::Array(mappings.into_iter().map(Value::Object).collect()))
        } else {
            let mapping = mappings.into_iter().next().unwrap_or_default();
            print_json(&Value::Object(mapping))
        }
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => NormalizeConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => NormalizeConfig::default(),
    };
    if let Some(separator) = args.separator {
        config.separator = separator;
    }
    if args.drop_none {
        config.drop_none = true;
    }
    config.validate()?;

    match read_json(&args.input)? {
        Value::Array(items) => {
            let records = normalize_records(&items, &config)?;
            print_json(&Value::Array(records.into_iter().map(Value::Object).collect()))
        }
        other => print_json(&Value::Object(normalize(&other, &config)?)),
    }
}

fn cmd_unflatten(args: UnflattenArgs) -> anyhow::Result<()> {
    let batch = Batch::read(&args.input)?;
    let nested = batch
        .mappings
        .iter()
        .map(|m| unflatten(m, &args.separator))
        .collect::<Result<Vec<_>, _>>()?;
    batch.emit(nested)
}

fn cmd_depth(args: InputArgs) -> anyhow::Result<()> {
    let value = read_json(&args.input)?;
    println!("{}", depth(&value)?);
    Ok(())
}

fn cmd_filter(args: FilterArgs) -> anyhow::Result<()> {
    let batch = Batch::read(&args.input)?;
    let exceptions: Vec<&str> = args.exceptions.iter().map(String::as_str).collect();
    let filtered = filter_keys(&batch.mappings, &args.pattern, &exceptions);
    batch.emit(filtered)
}

fn cmd_rename(args: RenameArgs) -> anyhow::Result<()> {
    let batch = Batch::read(&args.input)?;
    let exceptions: Vec<&str> = args.exceptions.iter().map(String::as_str).collect();
    let renamed = replace_keys(&batch.mappings, &args.find, &args.replace, &exceptions);
    batch.emit(renamed)
}

fn cmd_swap(args: InputArgs) -> anyhow::Result<()> {
    let mapping = read_mapping(&args.input)?;
    print_json(&Value::Object(swap_keys(&mapping)))
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let mappings = args
        .inputs
        .iter()
        .map(|path| read_mapping(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let merged = if args.nested {
        nested_aggregate(&mappings)?
    } else {
        flat_aggregate(&mappings)
    };
    eprintln!("{} Merged {} mappings", "✓".green(), mappings.len().to_string().bold());
    print_json(&Value::Object(merged))
}

fn cmd_table(args: TableArgs) -> anyhow::Result<()> {
    let mapping = read_mapping(&args.input)?;
    let fill = serde_json::from_str(&args.fill).unwrap_or(Value::String(args.fill));
    let table = to_table(&mapping, args.columns, fill, None)?;
    match args.format {
        TableFormat::Text => print!("{table}"),
        TableFormat::Csv => table.to_csv(io::stdout().lock())?,
    }
    Ok(())
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<()> {
    let mut records = read_records_from_path(&args.csv)
        .with_context(|| format!("failed to import {}", args.csv.display()))?;
    if args.unflatten {
        records = records
            .iter()
            .map(|record| unflatten(record, &args.separator))
            .collect::<Result<Vec<_>, _>>()?;
    }
    eprintln!("{} Imported {} records", "✓".green(), records.len().to_string().bold());
    print_json(&Value::Array(records.into_iter().map(Value::Object).collect()))
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let batch = Batch::read(&args.input)?;
    let config = NormalizeConfig::with_separator(args.separator);
    let mut buf = Vec::new();
    write_nested_records(&batch.mappings, &config, &mut buf)?;
    std::fs::write(&args.csv, buf)
        .with_context(|| format!("failed to write {}", args.csv.display()))?;
    eprintln!(
        "{} Wrote {} records to {}",
        "✓".green().bold(),
        batch.mappings.len(),
        args.csv.display().to_string().bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn batch_reads_single_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "one.json", r#"{"a": {"b": 1}}"#);
        let batch = Batch::read(&path).unwrap();
        assert!(!batch.is_array);
        assert_eq!(batch.mappings.len(), 1);
    }

    #[test]
    fn batch_reads_array_of_mappings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "many.json", r#"[{"a": 1}, {"b": 2}]"#);
        let batch = Batch::read(&path).unwrap();
        assert!(batch.is_array);
        assert_eq!(batch.mappings.len(), 2);
    }

    #[test]
    fn batch_rejects_scalar_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.json", r#"[{"a": 1}, 3]"#);
        let err = Batch::read(&path).err().expect("scalar item must fail");
        let dct = err.downcast_ref::<DctError>().expect("typed error");
        assert!(matches!(dct, DctError::NotAMapping { found: "number", .. }));
    }

    #[test]
    fn malformed_json_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.json", "{not json");
        let err = read_json(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse JSON"));
    }

    #[test]
    fn export_writes_flattened_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(&dir, "records.json", r#"[{"a": {"b": 1}}, {"a": {"b": 2}}]"#);
        let csv = dir.path().join("out.csv");
        cmd_export(ExportArgs {
            input,
            csv: csv.clone(),
            separator: "_".into(),
        })
        .unwrap();
        assert_eq!(std::fs::read_to_string(csv).unwrap(), "a_b\n1\n2\n");
    }

    #[test]
    fn failed_export_keeps_existing_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(&dir, "clash.json", r#"{"a.b": 1, "a": {"b": 2}}"#);
        let csv = write_file(&dir, "out.csv", "keep,me\n1,2\n");
        let err = cmd_export(ExportArgs {
            input,
            csv: csv.clone(),
            separator: ".".into(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("key collision"));
        assert_eq!(std::fs::read_to_string(csv).unwrap(), "keep,me\n1,2\n");
    }

    #[test]
    fn normalize_rejects_empty_separator() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(&dir, "m.json", r#"{"a": 1}"#);
        let err = cmd_normalize(NormalizeArgs {
            input,
            separator: Some(String::new()),
            drop_none: false,
            config: None,
        })
        .unwrap_err();
        assert!(err.downcast_ref::<DctError>().is_some());
    }
}

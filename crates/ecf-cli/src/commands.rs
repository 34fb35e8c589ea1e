//! Batch commands: read rows from CSV, build documents, write NDJSON.
//!
//! Rows are isolated: a failed row is reported with its 1-based number and
//! the batch continues with its siblings.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use tracing::{debug, error, info};

use ecf_builder::{build_acecf, build_ecf, ecf_to_rfce, is_consumer_summary};
use ecf_model::Row;

use crate::cli::{ApproveArgs, BuildArgs};

/// Outcome of one batch run.
pub struct BatchResult {
    pub rows: usize,
    pub built: usize,
    pub failures: Vec<RowFailure>,
}

impl BatchResult {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// One row that did not produce a document.
pub struct RowFailure {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub message: String,
}

pub fn run_build(args: &BuildArgs) -> Result<BatchResult> {
    let rows = read_rows(&args.cases)?;
    let mut writer = open_output(args.output.as_deref())?;

    let mut result = BatchResult {
        rows: rows.len(),
        built: 0,
        failures: Vec::new(),
    };
    for (index, row) in rows.iter().enumerate() {
        let number = index + 1;
        match build_ecf(row) {
            Ok(document) => {
                let document = if args.route_summary && is_consumer_summary(&document) {
                    debug!(row = number, "routing through the RFCE summary derivation");
                    ecf_to_rfce(&document)
                } else {
                    document
                };
                write_document(&mut writer, &document)?;
                result.built += 1;
            }
            Err(build_error) => {
                error!(row = number, error = %build_error, "row failed to build");
                result.failures.push(RowFailure {
                    row: number,
                    message: build_error.to_string(),
                });
            }
        }
    }
    writer.flush().context("flush output")?;
    info!(
        rows = result.rows,
        built = result.built,
        failed = result.failures.len(),
        "batch complete"
    );
    Ok(result)
}

pub fn run_approve(args: &ApproveArgs) -> Result<BatchResult> {
    let rows = read_rows(&args.cases)?;
    let mut writer = open_output(args.output.as_deref())?;

    let mut result = BatchResult {
        rows: rows.len(),
        built: 0,
        failures: Vec::new(),
    };
    for (index, row) in rows.iter().enumerate() {
        let number = index + 1;
        if row.is_empty() {
            result.failures.push(RowFailure {
                row: number,
                message: "empty row".to_string(),
            });
            continue;
        }
        write_document(&mut writer, &build_acecf(row))?;
        result.built += 1;
    }
    writer.flush().context("flush output")?;
    info!(
        rows = result.rows,
        built = result.built,
        failed = result.failures.len(),
        "approval batch complete"
    );
    Ok(result)
}

/// Read every record of the CSV into a [`Row`]. Cells ingest as trimmed
/// text; the sentinel handling in the row accessor takes it from there.
fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open cases file {}", path.display()))?;
    let headers = reader.headers().context("read headers")?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("read record")?;
        rows.push(record_to_row(&headers, &record));
    }
    Ok(rows)
}

fn record_to_row(headers: &StringRecord, record: &StringRecord) -> Row {
    let mut row = Row::new();
    for (header, value) in headers.iter().zip(record.iter()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        row.insert(header, value);
    }
    row
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn write_document(writer: &mut Box<dyn Write>, document: &serde_json::Value) -> Result<()> {
    let line = serde_json::to_string(document).context("serialize document")?;
    writeln!(writer, "{line}").context("write document")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use crate::cli::BuildArgs;

    #[test]
    fn record_to_row_skips_blank_cells() {
        let headers = StringRecord::from(vec!["TipoeCF", "eNCF", "MontoTotal"]);
        let record = StringRecord::from(vec!["32", "  E320000000001 ", ""]);
        let row = record_to_row(&headers, &record);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_str("eNCF").as_deref(), Some("E320000000001"));
        assert_eq!(row.get("MontoTotal"), None);
    }

    #[test]
    fn failed_rows_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cases = dir.path().join("cases.csv");
        std::fs::write(
            &cases,
            "TipoeCF,eNCF,NumeroLinea[1],IndicadorFacturacion[1]\n\
             32,E320000000001,1,1\n\
             32,E320000000002,1,abc\n\
             31,E310000000001,1,4\n",
        )
        .expect("write cases");
        let output = dir.path().join("out.ndjson");

        let args = BuildArgs {
            cases,
            output: Some(output.clone()),
            route_summary: false,
        };
        let result = run_build(&args).expect("run batch");
        assert_eq!(result.rows, 3);
        assert_eq!(result.built, 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].row, 2);

        let mut contents = String::new();
        File::open(&output)
            .expect("open output")
            .read_to_string(&mut contents)
            .expect("read output");
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn summary_routing_converts_eligible_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cases = dir.path().join("cases.csv");
        std::fs::write(
            &cases,
            "TipoeCF,eNCF,MontoTotal\n\
             32,E320000000001,500.00\n\
             31,E310000000001,500.00\n",
        )
        .expect("write cases");
        let output = dir.path().join("out.ndjson");

        let args = BuildArgs {
            cases,
            output: Some(output.clone()),
            route_summary: true,
        };
        run_build(&args).expect("run batch");

        let contents = std::fs::read_to_string(&output).expect("read output");
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].starts_with("{\"RFCE\""));
        assert!(lines[1].starts_with("{\"ECF\""));
    }
}

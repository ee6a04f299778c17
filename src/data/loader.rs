use std::collections::BTreeSet;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value as JsonValue;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular file into a [`Dataset`]. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – delimiter-separated, first record is the header row
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet only, first row is
///   the header
/// * `.json` – records-oriented array of flat objects
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Display name for a loaded file: the file stem, or a placeholder.
fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("dataset")
        .to_string()
}

// ---------------------------------------------------------------------------
// Fingerprint – cache key for "same pair of inputs"
// ---------------------------------------------------------------------------

/// Cheap identity of a source file, used to key the comparison cache: a new
/// fingerprint for either input evicts the cached result. Path plus size plus
/// mtime is enough to notice both re-picking a different file and the same
/// file being rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    path: String,
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    pub fn for_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("reading metadata for {}", path.display()))?;
        Ok(Fingerprint {
            path: path.to_string_lossy().into_owned(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    // flexible: ragged rows are padded/truncated to the header width below
    // rather than rejecting the whole file.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if columns.is_empty() {
        bail!("CSV header row is required");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            (0..columns.len())
                .map(|i| record.get(i).unwrap_or("").to_string())
                .collect(),
        );
    }

    Ok(Dataset::new(dataset_name(path), columns, rows))
}

// ---------------------------------------------------------------------------
// Workbook loader (xlsx / xls / ods)
// ---------------------------------------------------------------------------

/// Render a typed workbook cell to the raw string the comparison works on.
/// Numbers keep their shortest display form so they re-parse losslessly.
/// Booleans become `1`/`0` so they join the numeric domain, the way a float
/// cast of a spreadsheet boolean does.
fn workbook_cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => if *v { "1" } else { "0" }.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

fn load_workbook(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;

    // Single-sheet tool: only the first worksheet participates.
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook contains no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet {sheet_name}"))?;

    let mut rows_iter = range.rows();
    let columns: Vec<String> = rows_iter
        .next()
        .context("worksheet is empty (no header row)")?
        .iter()
        .map(workbook_cell_to_string)
        .collect();

    if columns.is_empty() {
        bail!("worksheet header row is empty");
    }

    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(workbook_cell_to_string).collect())
        .collect();

    Ok(Dataset::new(dataset_name(path), columns, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "item": "widget", "price": 9.99 },
///   { "item": "gadget", "price": 12.5, "qty": 3 }
/// ]
/// ```
///
/// Columns are the sorted union of all keys; objects missing a key get a
/// blank cell there.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut column_set: BTreeSet<String> = BTreeSet::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        column_set.extend(obj.keys().cloned());
        objects.push(obj);
    }
    let columns: Vec<String> = column_set.into_iter().collect();

    if columns.is_empty() {
        bail!("JSON records carry no fields");
    }

    let mut rows = Vec::with_capacity(objects.len());
    for obj in objects {
        rows.push(
            columns
                .iter()
                .map(|col| obj.get(col).map(json_cell_to_string).unwrap_or_default())
                .collect(),
        );
    }

    Ok(Dataset::new(dataset_name(path), columns, rows))
}

fn json_cell_to_string(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_loads_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "inv.csv", "item,price\nwidget,9.99\ngadget,12.5\n");
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.name, "inv");
        assert_eq!(ds.columns, vec!["item", "price"]);
        assert_eq!(ds.rows, vec![vec!["widget", "9.99"], vec!["gadget", "12.5"]]);
    }

    #[test]
    fn csv_pads_and_truncates_ragged_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "pad.csv", "a,b,c\n1\n1,2,3,4\n");
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.rows, vec![vec!["1", "", ""], vec!["1", "2", "3"]]);
    }

    #[test]
    fn json_records_become_sorted_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "recs.json",
            r#"[{"b": 1, "a": "x"}, {"a": "y", "c": null}]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns, vec!["a", "b", "c"]);
        assert_eq!(ds.rows, vec![vec!["x", "1", ""], vec!["y", "", ""]]);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "data.parquet", "");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn workbook_loads_headers_and_typed_cells() {
        use crate::data::compare::{AnnotatedCell, AnnotatedDataset};
        use crate::export::xlsx::XlsxRenderer;

        let cell = |value: &str, flagged| AnnotatedCell {
            value: value.to_string(),
            flagged,
        };
        let annotated = AnnotatedDataset {
            name: "book".into(),
            columns: vec!["item".into(), "amount".into()],
            rows: vec![
                vec![cell("widget", false), cell("9.99", false)],
                vec![cell("gadget", true), cell("3", false)],
            ],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        XlsxRenderer::write_file(&annotated, &path).unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.name, "book");
        assert_eq!(ds.columns, vec!["item", "amount"]);
        assert_eq!(ds.rows, vec![vec!["widget", "9.99"], vec!["gadget", "3"]]);
    }

    #[test]
    fn workbook_booleans_become_numeric_strings() {
        assert_eq!(workbook_cell_to_string(&Data::Bool(true)), "1");
        assert_eq!(workbook_cell_to_string(&Data::Bool(false)), "0");
        assert_eq!(crate::data::model::parse_numeric("1"), Some(1.0));
    }

    #[test]
    fn corrupt_workbook_is_a_fatal_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "broken.xlsx", "this is not a zip archive");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn fingerprint_changes_when_contents_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.csv", "x\n1\n");
        let before = Fingerprint::for_path(&path).unwrap();
        assert_eq!(before, Fingerprint::for_path(&path).unwrap());

        std::fs::write(&path, "x\n1\n2\n").unwrap();
        let after = Fingerprint::for_path(&path).unwrap();
        assert_ne!(before, after);
    }
}

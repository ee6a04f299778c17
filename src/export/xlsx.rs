use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use thiserror::Error;

use crate::data::compare::AnnotatedDataset;
use crate::data::model::parse_numeric;

/// Result type for XLSX rendering.
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while writing the highlighted workbook.
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// ARGB fill applied to flagged cells (light red, as in the original tool).
pub const HIGHLIGHT_ARGB: &str = "FFFF9999";

// Index into the cellXfs table below.
const XF_HIGHLIGHT: u32 = 1;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Serializes one annotated dataset into a minimal single-sheet `.xlsx`:
/// column headers as the first row, then the data rows, with flagged cells
/// carrying a solid highlight fill and every other cell rendered plainly.
pub struct XlsxRenderer;

impl XlsxRenderer {
    /// Render to a file path.
    pub fn write_file<P: AsRef<Path>>(annotated: &AnnotatedDataset, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(annotated, file)
    }

    /// Render to an in-memory byte buffer (for delivery without touching disk
    /// twice).
    pub fn to_bytes(annotated: &AnnotatedDataset) -> XlsxResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        Self::write(annotated, &mut buf)?;
        Ok(buf.into_inner())
    }

    /// Render to any seekable writer.
    pub fn write<W: Write + Seek>(annotated: &AnnotatedDataset, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, annotated)?;
        Self::write_workbook_rels(&mut zip)?;
        Self::write_styles_xml(&mut zip)?;
        Self::write_worksheet(&mut zip, annotated)?;

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        annotated: &AnnotatedDataset,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
            escape_xml(&sheet_name(&annotated.name)),
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_styles_xml<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;

        // Excel requires the first two fills to be none and gray125; the
        // highlight fill sits at index 2 and cellXfs[1] applies it.
        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
    <fills count="3">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
        <fill><patternFill patternType="solid"><fgColor rgb="{HIGHLIGHT_ARGB}"/><bgColor indexed="64"/></patternFill></fill>
    </fills>
    <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
    <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
    <cellXfs count="2">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
        <xf numFmtId="0" fontId="0" fillId="2" borderId="0" xfId="0" applyFill="1"/>
    </cellXfs>
</styleSheet>"#
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        annotated: &AnnotatedDataset,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/worksheets/sheet1.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>"#,
        );

        // Row 1: column headers, always plain inline strings.
        content.push_str("\n        <row r=\"1\">");
        for (col, header) in annotated.columns.iter().enumerate() {
            content.push_str(&format!(
                "\n            <c r=\"{}1\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                column_letters(col),
                escape_xml(header)
            ));
        }
        content.push_str("\n        </row>");

        // Data rows start at r=2.
        for (row_idx, row) in annotated.rows.iter().enumerate() {
            let row_ref = row_idx + 2;
            content.push_str(&format!("\n        <row r=\"{row_ref}\">"));
            for (col_idx, cell) in row.iter().enumerate() {
                let cell_ref = format!("{}{}", column_letters(col_idx), row_ref);
                let style_attr = if cell.flagged {
                    format!(" s=\"{XF_HIGHLIGHT}\"")
                } else {
                    String::new()
                };

                let trimmed = cell.value.trim();
                if trimmed.is_empty() {
                    // Blank cells carry no flag and need no element.
                    continue;
                }

                match parse_numeric(trimmed) {
                    Some(n) if n.is_finite() => {
                        // Number cell: the original text is the stored value,
                        // so "2.50" stays "2.50" in the file.
                        content.push_str(&format!(
                            "\n            <c r=\"{cell_ref}\"{style_attr}><v>{trimmed}</v></c>"
                        ));
                    }
                    _ => {
                        content.push_str(&format!(
                            "\n            <c r=\"{cell_ref}\"{style_attr} t=\"inlineStr\"><is><t>{}</t></is></c>",
                            escape_xml(&cell.value)
                        ));
                    }
                }
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Excel sheet names are capped at 31 chars and reject a handful of symbols.
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// 0-based column index → A1-style letters (0 → A, 26 → AA).
fn column_letters(mut col: usize) -> String {
    let mut letters = String::new();
    loop {
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::compare::{compare, CompareOptions};
    use crate::data::model::Dataset;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Read as _;

    fn sample_comparison() -> crate::data::compare::Comparison {
        let a = Dataset::new(
            "first",
            vec!["item".into(), "amount".into()],
            vec![
                vec!["widget".into(), "9.99".into()],
                vec!["<gadget>".into(), "12.5".into()],
                vec!["".into(), "note".into()],
            ],
        );
        let b = Dataset::new(
            "second",
            vec!["amount".into()],
            vec![vec!["9.99".into()]],
        );
        compare(&a, &b, CompareOptions::default())
    }

    fn zip_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn values_round_trip_through_a_reader() {
        let comparison = sample_comparison();
        let bytes = XlsxRenderer::to_bytes(&comparison.first).unwrap();

        let mut workbook = Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("first").unwrap();
        let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();

        assert_eq!(rows[0][0], Data::String("item".into()));
        assert_eq!(rows[0][1], Data::String("amount".into()));
        assert_eq!(rows[1][0], Data::String("widget".into()));
        assert_eq!(rows[1][1], Data::Float(9.99));
        assert_eq!(rows[2][0], Data::String("<gadget>".into()));
        assert_eq!(rows[2][1], Data::Float(12.5));
        assert_eq!(rows[3][1], Data::String("note".into()));
    }

    #[test]
    fn only_flagged_cells_carry_the_highlight_style() {
        let comparison = sample_comparison();
        // first: 9.99 matches, 12.5 is an orphan → exactly one styled cell.
        let bytes = XlsxRenderer::to_bytes(&comparison.first).unwrap();
        let sheet = zip_entry(&bytes, "xl/worksheets/sheet1.xml");

        assert_eq!(sheet.matches("s=\"1\"").count(), 1);
        assert!(sheet.contains("<c r=\"B3\" s=\"1\"><v>12.5</v></c>"));
        assert!(sheet.contains("<c r=\"B2\"><v>9.99</v></c>"));
    }

    #[test]
    fn styles_table_defines_the_highlight_fill() {
        let comparison = sample_comparison();
        let bytes = XlsxRenderer::to_bytes(&comparison.first).unwrap();
        let styles = zip_entry(&bytes, "xl/styles.xml");
        assert!(styles.contains(HIGHLIGHT_ARGB));
        assert!(styles.contains("patternType=\"solid\""));
    }

    #[test]
    fn write_file_produces_a_readable_workbook() {
        let comparison = sample_comparison();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("second_highlighted.xlsx");
        XlsxRenderer::write_file(&comparison.second, &path).unwrap();

        let mut workbook = calamine::open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range("second").unwrap();
        assert_eq!(range.rows().count(), 2);
    }

    #[test]
    fn sheet_names_are_sanitized_and_capped() {
        assert_eq!(sheet_name("report[Q1/Q2]"), "reportQ1Q2");
        assert_eq!(sheet_name(""), "Sheet1");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
    }

    #[test]
    fn column_letters_wrap_past_z() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(51), "AZ");
        assert_eq!(column_letters(52), "BA");
    }
}

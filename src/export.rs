//! Spreadsheet export.
//!
//! Serializes the extracted table to an OOXML `.xlsx` workbook: a zip
//! container holding the workbook parts, with every cell written as an
//! inline string so no shared-string table is needed. The file at the
//! target path is overwritten on every run and left on disk afterwards;
//! its raw bytes are returned for download.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::Path;

use chrono::Utc;
use quick_xml::escape::escape;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::pipeline::ExtractedTable;

/// Fixed artifact name offered at the download boundary.
pub const EXPORT_FILE_NAME: &str = "pdf_extracted_data.xlsx";

/// MIME type of the exported workbook.
pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Write the table to an `.xlsx` workbook at `path`, overwriting any
/// existing file, then read the file back and return its raw bytes.
pub fn export(table: &ExtractedTable, path: &Path) -> Result<Vec<u8>> {
    let file = File::create(path)?;
    let mut archive = ZipWriter::new(file);
    let options = FileOptions::default();

    archive.start_file("[Content_Types].xml", options)?;
    archive.write_all(CONTENT_TYPES_XML.as_bytes())?;

    archive.start_file("_rels/.rels", options)?;
    archive.write_all(ROOT_RELS_XML.as_bytes())?;

    archive.start_file("docProps/core.xml", options)?;
    archive.write_all(core_props_xml().as_bytes())?;

    archive.start_file("xl/workbook.xml", options)?;
    archive.write_all(WORKBOOK_XML.as_bytes())?;

    archive.start_file("xl/_rels/workbook.xml.rels", options)?;
    archive.write_all(WORKBOOK_RELS_XML.as_bytes())?;

    archive.start_file("xl/worksheets/sheet1.xml", options)?;
    archive.write_all(worksheet_xml(table).as_bytes())?;

    archive.finish()?;

    Ok(fs::read(path)?)
}

fn core_props_xml() -> String {
    let created = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:creator>pdfinsight</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created></cp:coreProperties>"#
    )
}

/// Render the worksheet: a header row (`filename`, `text`) followed by one
/// row per record, in table order. All cells are inline strings with
/// whitespace preserved, so extracted text round-trips exactly.
fn worksheet_xml(table: &ExtractedTable) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    push_row(&mut xml, 1, &["filename", "text"]);
    for (i, record) in table.records().iter().enumerate() {
        push_row(&mut xml, i + 2, &[&record.filename, &record.text]);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_row(xml: &mut String, row: usize, cells: &[&str]) {
    let _ = write!(xml, r#"<row r="{row}">"#);
    for (col, value) in cells.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            cell_ref(col, row),
            escape(*value)
        );
    }
    xml.push_str("</row>");
}

/// Build a cell reference like `A1` or `AB3` from a 0-based column index
/// and a 1-based row number.
fn cell_ref(col: usize, row: usize) -> String {
    let mut letters = String::new();
    let mut n = col + 1; // 1-based for the base-26 conversion
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.insert(0, (b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    format!("{letters}{row}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ExtractedRecord;

    #[test]
    fn cell_ref_single_letters() {
        assert_eq!(cell_ref(0, 1), "A1");
        assert_eq!(cell_ref(1, 5), "B5");
        assert_eq!(cell_ref(25, 3), "Z3");
    }

    #[test]
    fn cell_ref_double_letters() {
        assert_eq!(cell_ref(26, 1), "AA1");
        assert_eq!(cell_ref(51, 2), "AZ2");
        assert_eq!(cell_ref(52, 2), "BA2");
    }

    #[test]
    fn worksheet_has_header_row() {
        let xml = worksheet_xml(&ExtractedTable::default());
        assert!(xml.contains(r#"<row r="1">"#));
        assert!(xml.contains(">filename</t>"));
        assert!(xml.contains(">text</t>"));
        assert!(!xml.contains(r#"<row r="2">"#));
    }

    #[test]
    fn worksheet_escapes_markup_in_text() {
        let table: ExtractedTable = [ExtractedRecord {
            filename: "odd<&>.pdf".into(),
            text: "a < b && c > d\n".into(),
        }]
        .into_iter()
        .collect();

        let xml = worksheet_xml(&table);
        assert!(xml.contains("odd&lt;&amp;&gt;.pdf"));
        assert!(xml.contains("a &lt; b &amp;&amp; c &gt; d\n"));
        assert!(!xml.contains("a < b"));
    }

    #[test]
    fn worksheet_rows_follow_table_order() {
        let table: ExtractedTable = [
            ExtractedRecord {
                filename: "first.pdf".into(),
                text: "1\n".into(),
            },
            ExtractedRecord {
                filename: "second.pdf".into(),
                text: "2\n".into(),
            },
        ]
        .into_iter()
        .collect();

        let xml = worksheet_xml(&table);
        let first = xml.find("first.pdf").expect("first row present");
        let second = xml.find("second.pdf").expect("second row present");
        assert!(first < second);
    }
}

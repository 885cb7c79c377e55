//! Single-sheet xlsx export

use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::ScraperError;
use crate::listing::ProductRecord;

pub const SHEET_NAME: &str = "Productos";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Six record fields plus a blank spacer column
pub const COLUMN_COUNT: usize = 7;

pub const HEADERS: [&str; COLUMN_COUNT] = [
    "Título",
    "Precio Original",
    "Precio Final",
    "Descuento",
    "Imagen",
    "Enlace",
    " ",
];

const FALLBACK_STEM: &str = "productos";

/// Stem limit in bytes, below the usual 255-byte file name limit
pub const MAX_STEM_BYTES: usize = 200;

/// File name for a query's export.
///
/// Spaces become underscores; separators, control and reserved characters
/// are dropped so the name cannot leave the output directory.
pub fn export_file_name(query: &str) -> String {
    let stem: String = query
        .chars()
        .filter_map(|ch| match ch {
            ' ' => Some('_'),
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    let stem = truncate_on_char_boundary(stem.trim_start_matches('.'), MAX_STEM_BYTES);

    if stem.is_empty() {
        format!("{}.xlsx", FALLBACK_STEM)
    } else {
        format!("{}.xlsx", stem)
    }
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Header row followed by one row per record
pub fn sheet_rows(records: &[ProductRecord]) -> Vec<[&str; COLUMN_COUNT]> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(HEADERS);
    rows.extend(records.iter().map(|r| {
        [
            r.title.as_str(),
            r.original_price.as_str(),
            r.final_price.as_str(),
            r.discount.as_str(),
            r.image.as_str(),
            r.link.as_str(),
            "",
        ]
    }));
    rows
}

/// Write `records` to an xlsx file at `path`, creating its directory.
pub fn write_workbook(records: &[ProductRecord], path: &Path) -> Result<(), ScraperError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (row, cells) in sheet_rows(records).iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            worksheet.write_string(row as u32, col as u16, *value)?;
        }
    }

    workbook.save(path)?;
    info!("Exported {} records to {:?}", records.len(), path);
    Ok(())
}
